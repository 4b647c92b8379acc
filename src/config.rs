//! Optional `codedrops.toml` configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::header::TIMESTAMP_FORMAT;
use crate::sections::SectionType;

pub const CONFIG_FILENAME: &str = "codedrops.toml";

/// Default glob for directory batches
pub const DEFAULT_PATTERN: &str = "*.md";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob matched against file names when adding a directory of drops
    pub pattern: String,
    /// chrono format string for the `Generated on` stamp
    pub timestamp_format: String,
    pub construct: ConstructConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructConfig {
    pub strict: bool,
    /// Sections required in strict mode
    pub mandatory: Vec<SectionType>,
    pub order: Vec<SectionType>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
            construct: ConstructConfig::default(),
        }
    }
}

impl Default for ConstructConfig {
    fn default() -> Self {
        Self {
            strict: false,
            mandatory: vec![
                SectionType::Requirements,
                SectionType::Design,
                SectionType::Implementation,
            ],
            order: SectionType::CANONICAL_ORDER.to_vec(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads `codedrops.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
