//! bibtidy - tidy a BibTeX library in one pass
//!
//! The binary is a thin wrapper around [`run`]: read the input, parse it
//! strictly, run the [`Pipeline`], then write the result atomically next to
//! the input (or wherever `--output` points).

mod error;

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bibtidy_bibtex::{format_entries, parse_strict};
use bibtidy_core::{Pipeline, TidyConfig, TidyOptions, TidyReport};
use clap::Parser;
use tempfile::NamedTempFile;

pub use error::AppError;

/// Normalize venues, strip clutter fields and drop duplicate BibTeX entries
#[derive(Parser, Debug, Clone)]
#[command(name = "bibtidy", version, about, long_about = None)]
pub struct Cli {
    /// BibTeX file to tidy
    pub input: PathBuf,

    /// Output path (default: cleaned_<input name> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace citation keys with surname-year-word keys
    #[arg(long)]
    pub reset_keys: bool,

    /// Keep volume, pages, DOI and similar metadata
    #[arg(long)]
    pub keep_metadata: bool,

    /// Sort entries by first author, year and title
    #[arg(long)]
    pub sort: bool,

    /// TOML file overriding the built-in venue tables, field lists or stop words
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log every per-entry decision
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn options(&self) -> TidyOptions {
        TidyOptions {
            reset_keys: self.reset_keys,
            keep_metadata: self.keep_metadata,
            sort: self.sort,
        }
    }

    /// Filter directive for the tracing subscriber
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Where the result was written; `None` for a dry run
    pub output: Option<PathBuf>,
    pub report: TidyReport,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.report;
        match &self.output {
            Some(path) => writeln!(f, "Cleaned file: {}", path.display())?,
            None => writeln!(f, "Dry run, nothing written")?,
        }
        writeln!(
            f,
            " • Entries: {} in, {} out",
            report.records_in, report.records_out
        )?;
        writeln!(f, " • Venues normalized: {}", report.venues_rewritten)?;
        writeln!(f, " • Fields removed: {}", report.fields_pruned)?;

        write!(f, " • Duplicates removed: {}", report.duplicates.len())?;
        if !report.duplicates.is_empty() {
            let keys: Vec<&str> = report
                .duplicates
                .iter()
                .map(|d| d.cite_key.as_str())
                .collect();
            write!(f, " ({})", keys.join(", "))?;
        }
        writeln!(f)?;

        writeln!(f, " • Keys regenerated: {}", report.keys_regenerated)?;

        write!(f, " • Warnings: {}", report.warnings.len())?;
        if !report.warnings.is_empty() {
            // Each affected entry once, in first-warning order
            let mut keys: Vec<&str> = Vec::new();
            for key in report.warnings.iter().map(|w| w.cite_key()) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            write!(f, " ({})", keys.join(", "))?;
        }
        Ok(())
    }
}

/// `cleaned_<name>` in the input's directory
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "library.bib".to_string());
    input.with_file_name(format!("cleaned_{}", name))
}

/// Run the whole tidy pass for one input file
pub fn run(cli: &Cli) -> Result<RunSummary, AppError> {
    let config = TidyConfig::load(cli.config.as_deref())?;
    let pipeline = Pipeline::new(&config, &cli.options())?;

    let text = fs::read_to_string(&cli.input).map_err(|source| AppError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let entries = parse_strict(&text).map_err(|source| AppError::Parse {
        path: cli.input.clone(),
        source,
    })?;
    tracing::info!("Parsed {} entries from {}", entries.len(), cli.input.display());

    let tidied = pipeline.run(entries);

    if cli.dry_run {
        return Ok(RunSummary {
            output: None,
            report: tidied.report,
        });
    }

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    write_atomically(&path, &format_entries(&tidied.entries))?;
    tracing::info!("Wrote {} entries to {}", tidied.entries.len(), path.display());

    Ok(RunSummary {
        output: Some(path),
        report: tidied.report,
    })
}

/// Write through a temporary file in the target directory, then rename it
/// over the target
fn write_atomically(path: &Path, contents: &str) -> Result<(), AppError> {
    let write_error = |source| AppError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
