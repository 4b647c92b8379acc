//! CodeDrop composition
//!
//! Collects drops in insertion order and merges like-typed sections across
//! all of them into one composite artifact per section type.

pub mod merge;

pub use merge::CompositeArtifact;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use rayon::prelude::*;

use crate::config::Config;
use crate::error::{CodeDropError, Result};
use crate::extractor::Extractor;
use crate::sections::{CodeDrop, SectionType};

use merge::{merge_code, merge_prose, Contribution};

/// Outcome of adding a directory of drops
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Names of the drops added, in insertion order
    pub added: Vec<String>,
    /// Files that could not be extracted, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

pub struct Composer {
    extractor: Extractor,
    drops: Vec<CodeDrop>,
    pattern: String,
    timestamp_format: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            extractor: Extractor::new(),
            drops: Vec::new(),
            pattern: config.pattern.clone(),
            timestamp_format: config.timestamp_format.clone(),
        }
    }

    /// Drops added so far, in insertion order
    pub fn drops(&self) -> &[CodeDrop] {
        &self.drops
    }

    /// Extracts one file and appends it as a drop
    pub fn add_drop(&mut self, path: &Path) -> Result<&CodeDrop> {
        let drop = self.extractor.extract_drop(path)?;
        tracing::debug!("Added CodeDrop {} ({} sections)", drop.name, drop.sections.len());
        Ok(self.push_drop(drop))
    }

    /// Appends an already extracted drop
    pub fn push_drop(&mut self, drop: CodeDrop) -> &CodeDrop {
        self.drops.push(drop);
        &self.drops[self.drops.len() - 1]
    }

    /// Adds every file in `dir` whose name matches `pattern` (the configured
    /// pattern when `None`), in file name order.
    ///
    /// Files are extracted in parallel but appended in name order. Files that
    /// fail extraction are skipped and reported, never fatal.
    pub fn add_drops_from_directory(&mut self, dir: &Path, pattern: Option<&str>) -> Result<BatchReport> {
        if !dir.is_dir() {
            return Err(CodeDropError::NotFound(dir.display().to_string()));
        }

        let pattern = pattern.unwrap_or(&self.pattern);
        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            pattern
        );

        let mut report = BatchReport::default();
        let mut paths = Vec::new();
        for entry in glob::glob(&full_pattern)? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", e.path().display(), e.error());
                    report.skipped.push((e.path().to_path_buf(), e.error().to_string()));
                }
            }
        }
        paths.sort();

        let extracted: Vec<(PathBuf, Result<CodeDrop>)> = paths
            .into_par_iter()
            .map(|path| {
                let drop = self.extractor.extract_drop(&path);
                (path, drop)
            })
            .collect();

        for (path, result) in extracted {
            match result {
                Ok(drop) => {
                    report.added.push(drop.name.clone());
                    self.push_drop(drop);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    report.skipped.push((path, e.to_string()));
                }
            }
        }

        tracing::info!(
            "Added {} CodeDrops from {} ({} skipped)",
            report.added.len(),
            dir.display(),
            report.skipped.len()
        );

        Ok(report)
    }

    /// Builds the composite artifacts without touching the filesystem.
    ///
    /// One artifact per section type that at least one drop contributes to,
    /// in canonical order. Unknown sections never contribute.
    pub fn render(&self, composite_name: &str, generated_at: NaiveDateTime) -> Result<Vec<CompositeArtifact>> {
        if self.drops.is_empty() {
            return Err(CodeDropError::NoDrops);
        }

        let generated_on = generated_at.format(&self.timestamp_format).to_string();
        let mut artifacts = Vec::new();

        for section_type in SectionType::CANONICAL_ORDER {
            let contributions: Vec<Contribution> = self
                .drops
                .iter()
                .filter_map(|drop| {
                    drop.sections
                        .get(section_type)
                        .filter(|section| !section.content.trim().is_empty())
                        .map(|section| Contribution { drop, section })
                })
                .collect();

            if contributions.is_empty() {
                continue;
            }

            let artifact = if section_type.is_code() {
                merge_code(
                    composite_name,
                    section_type,
                    &contributions,
                    self.extractor.registry(),
                    &generated_on,
                )
            } else {
                merge_prose(composite_name, section_type, &contributions, &generated_on)?
            };
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }

    /// Composes all drops and writes one file per section type into
    /// `output_dir`, stamped with the current local time.
    pub fn compose(&self, composite_name: &str, output_dir: &Path) -> Result<BTreeMap<SectionType, PathBuf>> {
        self.compose_at(composite_name, output_dir, Local::now().naive_local())
    }

    /// [`Composer::compose`] with a fixed generation time
    pub fn compose_at(
        &self,
        composite_name: &str,
        output_dir: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<BTreeMap<SectionType, PathBuf>> {
        let artifacts = self.render(composite_name, generated_at)?;
        fs::create_dir_all(output_dir)?;

        let mut written = BTreeMap::new();
        for artifact in artifacts {
            let path = output_dir.join(artifact.file_name(composite_name));
            fs::write(&path, &artifact.text)?;
            tracing::info!(
                "Wrote composite {} from {} drops to {}",
                artifact.section_type,
                artifact.drops.len(),
                path.display()
            );
            written.insert(artifact.section_type, path);
        }

        Ok(written)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 29)
            .unwrap()
            .and_hms_opt(11, 58, 3)
            .unwrap()
    }

    fn drop_text(body: &str) -> String {
        format!(
            "# Requirements\n- {body}\n\n# Implementation\n```python\nimport os\n\ndef {body}():\n    return os.sep\n```\n\n# Testing\n```python\nassert {body}() == '/'\n```\n"
        )
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_compose_without_drops_fails() {
        let temp_dir = TempDir::new().unwrap();
        let composer = Composer::new();

        let result = composer.compose("empty", temp_dir.path());
        assert!(matches!(result, Err(CodeDropError::NoDrops)));
    }

    #[test]
    fn test_add_drop_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut composer = Composer::new();

        let result = composer.add_drop(&temp_dir.path().join("nope.md"));
        assert!(matches!(result, Err(CodeDropError::NotFound(_))));
        assert!(composer.drops().is_empty());
    }

    #[test]
    fn test_compose_writes_one_file_per_type() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_file(temp_dir.path(), "alpha.md", &drop_text("alpha"));
        let b = write_file(temp_dir.path(), "beta.md", &drop_text("beta"));

        let mut composer = Composer::new();
        composer.add_drop(&a).unwrap();
        composer.add_drop(&b).unwrap();

        let out = temp_dir.path().join("out");
        let written = composer.compose_at("suite", &out, timestamp()).unwrap();

        assert_eq!(
            written.keys().copied().collect::<Vec<_>>(),
            vec![
                SectionType::Requirements,
                SectionType::Implementation,
                SectionType::Testing,
            ]
        );
        assert_eq!(written[&SectionType::Implementation], out.join("suite_implementation.py"));
        assert_eq!(written[&SectionType::Requirements], out.join("suite_requirements.md"));

        let implementation = fs::read_to_string(&written[&SectionType::Implementation]).unwrap();
        assert_eq!(implementation.matches("import os").count(), 1);
        assert!(implementation.contains("Generated on: 2025-04-29 11:58:03"));
    }

    #[test]
    fn test_compose_is_deterministic_and_stateless() {
        let temp_dir = TempDir::new().unwrap();
        let mut composer = Composer::new();
        composer.add_drop(&write_file(temp_dir.path(), "one.md", &drop_text("one"))).unwrap();
        composer.add_drop(&write_file(temp_dir.path(), "two.md", &drop_text("two"))).unwrap();

        let first = composer.compose_at("x", &temp_dir.path().join("first"), timestamp()).unwrap();
        let second = composer.compose_at("x", &temp_dir.path().join("second"), timestamp()).unwrap();

        assert_eq!(composer.drops().len(), 2);
        for (section_type, path) in &first {
            let other = &second[section_type];
            assert_eq!(fs::read(path).unwrap(), fs::read(other).unwrap());
        }
    }

    #[test]
    fn test_unknown_and_blank_sections_not_composed() {
        let extractor = Extractor::new();
        let mut composer = Composer::new();
        composer.push_drop(extractor.drop_from_string("d", "# Notes\nkeep me\n# Design\n\n"));

        let artifacts = composer.render("c", timestamp()).unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_add_drops_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "b_second.md", &drop_text("second"));
        write_file(temp_dir.path(), "a_first.md", &drop_text("first"));
        write_file(temp_dir.path(), "ignored.txt", &drop_text("ignored"));
        fs::write(temp_dir.path().join("c_latin.md"), b"# Design\ncaf\xe9\n").unwrap();
        fs::create_dir(temp_dir.path().join("broken.md")).unwrap();

        let mut composer = Composer::new();
        let report = composer.add_drops_from_directory(temp_dir.path(), None).unwrap();

        assert_eq!(report.added, vec!["a_first", "b_second", "c_latin"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("broken.md"));

        let names: Vec<&str> = composer.drops().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a_first", "b_second", "c_latin"]);
    }

    #[test]
    fn test_add_drops_from_directory_custom_pattern() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "page.html", "<div id=\"design\">Layered</div>");
        write_file(temp_dir.path(), "other.md", &drop_text("other"));

        let mut composer = Composer::new();
        let report = composer
            .add_drops_from_directory(temp_dir.path(), Some("*.html"))
            .unwrap();

        assert_eq!(report.added, vec!["page"]);
        assert_eq!(composer.drops()[0].sections.content(SectionType::Design), Some("Layered"));
    }

    #[test]
    fn test_add_drops_from_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut composer = Composer::new();

        let result = composer.add_drops_from_directory(&temp_dir.path().join("nope"), None);
        assert!(matches!(result, Err(CodeDropError::NotFound(_))));
    }

    #[test]
    fn test_custom_timestamp_format() {
        let config = Config {
            timestamp_format: "%Y/%m/%d".to_string(),
            ..Config::default()
        };
        let mut composer = Composer::with_config(&config);
        composer.push_drop(Extractor::new().drop_from_string("d", "# Design\nlayers"));

        let artifacts = composer.render("c", timestamp()).unwrap();
        assert!(artifacts[0].text.contains("2025/04/29"));
    }
}
