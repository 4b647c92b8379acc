pub mod composer;
pub mod config;
pub mod constructor;
pub mod error;
pub mod extractor;
pub mod header;
pub mod languages;
pub mod sections;

pub use composer::{BatchReport, Composer, CompositeArtifact};
pub use config::{Config, ConstructConfig};
pub use constructor::{Constructor, MarkerStyle};
pub use error::{CodeDropError, Result};
pub use extractor::{Extractor, SaveOptions};
pub use header::ArtifactHeader;
pub use languages::{LanguageHeuristic, LanguageRegistry};
pub use sections::{CodeDrop, MarkupParser, Section, SectionParser, SectionType, Sections};
