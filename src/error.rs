use thiserror::Error;

use crate::sections::SectionType;

#[derive(Error, Debug)]
pub enum CodeDropError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CodeDrop file not found: {0}")]
    NotFound(String),

    #[error("No CodeDrop sections found in {0}")]
    NoSections(String),

    #[error("No CodeDrops added to the composer")]
    NoDrops,

    #[error("Missing mandatory section: {0}")]
    MissingSection(SectionType),

    #[error("Unknown language '{name}', expected one of: {supported}")]
    UnknownLanguage { name: String, supported: String },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for CodeDropError {
    fn from(err: serde_yaml::Error) -> Self {
        CodeDropError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for CodeDropError {
    fn from(err: serde_json::Error) -> Self {
        CodeDropError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CodeDropError>;
