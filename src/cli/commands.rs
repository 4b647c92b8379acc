use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::error::{CodeDropError, Result};
use codedrops::{
    CodeDrop, Composer, Config, Constructor, Extractor, MarkerStyle, SaveOptions, SectionType,
};

#[derive(Parser)]
#[command(name = "codedrops")]
#[command(about = "Extract, compose and construct CodeDrop documents")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Split one CodeDrop into per-section files
    codedrops extract drops/fibonacci.md -o out/

    # Print only the implementation code
    codedrops extract drops/fibonacci.md -s implementation

    # Compose every markdown drop in a directory
    codedrops compose drops/ -n toolkit -o build/

    # Rebuild a drop in canonical order, requiring a testing section
    codedrops construct drops/fibonacci.md --strict --mandatory testing
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a codedrops.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug information
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Combine sections from several CodeDrops into composite files
    Compose {
        /// CodeDrop files or directories of CodeDrops
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Name of the composite, used as the output file prefix
        #[arg(short, long)]
        name: String,

        /// Output directory (created if absent)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// File name glob for directory inputs
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Extract the sections of one CodeDrop
    Extract(ExtractArgs),

    /// Reassemble one CodeDrop from its sections
    Construct(ConstructArgs),
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Path to the CodeDrop file
    pub file: PathBuf,

    /// Output directory for extracted sections (default: next to the file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base name for output files (default: derived from the input file)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Create a subdirectory per section type
    #[arg(long)]
    pub subdirs: bool,

    /// Force markup parsing even for non-HTML files
    #[arg(long)]
    pub html: bool,

    /// Language of the code sections, by name or extension (default: inferred)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Print only this section
    #[arg(short, long)]
    pub section: Option<SectionType>,

    /// Print all sections instead of writing files (text or json)
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct ConstructArgs {
    /// Path to the CodeDrop file
    pub file: PathBuf,

    /// Section order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<SectionType>,

    /// Only emit these sections
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<SectionType>,

    /// Never emit these sections
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<SectionType>,

    /// Fail when a mandatory section is missing
    #[arg(long)]
    pub strict: bool,

    /// Mandatory sections for --strict
    #[arg(long, value_delimiter = ',')]
    pub mandatory: Vec<SectionType>,

    /// Write markup section elements instead of headings
    #[arg(long)]
    pub markup: bool,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(Path::new(".")),
    }
}

/// Returns whether at least one composite file was written
pub fn compose(
    config: &Config,
    inputs: &[PathBuf],
    name: &str,
    output: &Path,
    pattern: Option<&str>,
) -> Result<bool> {
    let mut composer = Composer::with_config(config);

    for input in inputs {
        if input.is_dir() {
            let report = composer.add_drops_from_directory(input, pattern)?;
            for (path, reason) in &report.skipped {
                eprintln!("Skipped {}: {}", path.display(), reason);
            }
        } else if let Err(e) = composer.add_drop(input) {
            eprintln!("Skipped {}: {}", input.display(), e);
        }
    }

    let written = match composer.compose(name, output) {
        Ok(written) => written,
        Err(CodeDropError::NoDrops) => {
            eprintln!("No CodeDrops could be read from the given inputs");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    println!(
        "Composed {} CodeDrops into {} files",
        composer.drops().len(),
        written.len()
    );
    for (section_type, path) in &written {
        println!("  - {}: {}", section_type, path.display());
    }

    Ok(!written.is_empty())
}

pub fn extract(config: &Config, args: &ExtractArgs) -> Result<bool> {
    let extractor = Extractor::new();

    let drop = if args.html {
        let content = fs::read_to_string(&args.file)
            .map_err(|_| CodeDropError::NotFound(args.file.display().to_string()))?;
        CodeDrop::new(
            CodeDrop::name_from_path(&args.file),
            extractor.extract_from_markup(&content),
            args.file.display().to_string(),
        )
    } else {
        extractor.extract_drop(&args.file)?
    };

    for section in &drop.sections {
        tracing::debug!(
            "--- {} ({} bytes) ---\n{}",
            section.section_type,
            section.content.len(),
            section.content
        );
    }

    if let Some(section_type) = args.section {
        return Ok(match drop.sections.get(section_type) {
            Some(section) => {
                println!("{}", section.unwrapped());
                true
            }
            None => {
                eprintln!("Section '{}' not found in {}", section_type, args.file.display());
                false
            }
        });
    }

    if drop.sections.is_empty() {
        eprintln!("{}", CodeDropError::NoSections(args.file.display().to_string()));
        return Ok(false);
    }

    match args.format.as_deref() {
        Some("json") => {
            println!("{}", serde_json::to_string_pretty(&drop)?);
            return Ok(true);
        }
        Some(_) => {
            for section in &drop.sections {
                println!("--- {} ---\n{}\n", section.section_type, section.content);
            }
            return Ok(true);
        }
        None => {}
    }

    let output = match &args.output {
        Some(output) => output.clone(),
        None => args
            .file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let options = SaveOptions {
        base_name: args.name.clone(),
        subdirs: args.subdirs,
        language: args.language.clone(),
        generated_on: Local::now().format(&config.timestamp_format).to_string(),
    };
    let written = extractor.save_sections(&drop, &output, &options)?;

    println!("Extracted {} sections from {}", drop.sections.len(), args.file.display());
    for (section_type, path) in &written {
        println!("  - {}: {}", section_type, path.display());
    }

    Ok(true)
}

pub fn construct(config: &Config, args: &ConstructArgs) -> Result<bool> {
    let sections = Extractor::new().extract_from_file(&args.file)?;

    let order = if args.order.is_empty() {
        config.construct.order.clone()
    } else {
        args.order.clone()
    };

    let mut constructor = Constructor::new().order(order);
    if !args.include.is_empty() {
        constructor = constructor.include(args.include.iter().copied());
    }
    if !args.exclude.is_empty() {
        constructor = constructor.exclude(args.exclude.iter().copied());
    }
    if args.strict || config.construct.strict {
        let mandatory = if args.mandatory.is_empty() {
            config.construct.mandatory.clone()
        } else {
            args.mandatory.clone()
        };
        constructor = constructor.strict(mandatory);
    }
    if args.markup {
        constructor = constructor.style(MarkerStyle::Markup);
    }

    let document = constructor.construct(&sections)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, document)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", document),
    }

    Ok(true)
}
