//! Pipeline orchestration
//!
//! Stages run in a fixed order over the in-memory batch:
//! venue normalization, field pruning, deduplication, optional sorting and
//! optional key regeneration. No stage fails; per-record problems
//! are collected as warnings in the report.

use std::fmt;

use bibtidy_bibtex::BibTeXEntry;

use crate::cite_key::{KeyPart, KeyRegenerator};
use crate::config::{ConfigError, TidyConfig};
use crate::dedup::{deduplicate, RemovedDuplicate};
use crate::prune::FieldPruner;
use crate::sort::sort_entries;
use crate::venue::{VenueNormalizer, VenueOutcome};

/// User-facing switches for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TidyOptions {
    /// Replace cite keys with `surname-year-word` keys
    pub reset_keys: bool,
    /// Keep the extended clutter fields (volume, pages, doi, ...)
    pub keep_metadata: bool,
    /// Sort the output by first author, year and title
    pub sort: bool,
}

/// A recoverable per-record problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TidyWarning {
    /// A conference or journal entry has no venue field
    MissingVenue {
        cite_key: String,
        field: &'static str,
    },
    /// A key could not be regenerated and was left as is
    KeySkipped {
        cite_key: String,
        missing: Vec<KeyPart>,
    },
}

impl TidyWarning {
    pub fn cite_key(&self) -> &str {
        match self {
            TidyWarning::MissingVenue { cite_key, .. } => cite_key,
            TidyWarning::KeySkipped { cite_key, .. } => cite_key,
        }
    }
}

impl fmt::Display for TidyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TidyWarning::MissingVenue { cite_key, field } => {
                write!(f, "{}: no {} field, venue left as is", cite_key, field)
            }
            TidyWarning::KeySkipped { cite_key, missing } => {
                let parts: Vec<String> = missing.iter().map(ToString::to_string).collect();
                write!(f, "{}: key kept, missing {}", cite_key, parts.join(", "))
            }
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TidyReport {
    pub records_in: usize,
    pub records_out: usize,
    pub venues_rewritten: usize,
    pub fields_pruned: usize,
    pub duplicates: Vec<RemovedDuplicate>,
    pub keys_regenerated: usize,
    pub warnings: Vec<TidyWarning>,
}

/// Tidied entries plus the run report
#[derive(Debug, Clone)]
pub struct TidyOutput {
    pub entries: Vec<BibTeXEntry>,
    pub report: TidyReport,
}

/// The configured stage sequence
#[derive(Debug, Clone)]
pub struct Pipeline {
    venues: VenueNormalizer,
    pruner: FieldPruner,
    rekeyer: Option<KeyRegenerator>,
    sort: bool,
}

impl Pipeline {
    pub fn new(config: &TidyConfig, options: &TidyOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            venues: VenueNormalizer::from_config(config)?,
            pruner: FieldPruner::new(&config.pruning, options.keep_metadata),
            rekeyer: options
                .reset_keys
                .then(|| KeyRegenerator::new(&config.keys)),
            sort: options.sort,
        })
    }

    /// Run every stage over the batch
    pub fn run(&self, mut entries: Vec<BibTeXEntry>) -> TidyOutput {
        let mut report = TidyReport {
            records_in: entries.len(),
            ..Default::default()
        };

        for entry in entries.iter_mut() {
            match self.venues.normalize(entry) {
                VenueOutcome::Rewritten { from, to } => {
                    tracing::debug!("{}: venue {:?} -> {:?}", entry.cite_key, from, to);
                    report.venues_rewritten += 1;
                }
                VenueOutcome::MissingField(field) => {
                    report.warnings.push(TidyWarning::MissingVenue {
                        cite_key: entry.cite_key.clone(),
                        field,
                    });
                }
                VenueOutcome::Unchanged | VenueOutcome::NotApplicable => {}
            }
        }
        tracing::info!("Normalized {} venue names", report.venues_rewritten);

        report.fields_pruned = self.pruner.prune_all(&mut entries);
        tracing::info!("Pruned {} clutter fields", report.fields_pruned);

        let (mut entries, duplicates) = deduplicate(entries);
        tracing::info!("Removed {} duplicate entries", duplicates.len());
        report.duplicates = duplicates;

        // Before re-keying, so collision suffixes follow the final order
        if self.sort {
            sort_entries(&mut entries);
        }

        if let Some(rekeyer) = &self.rekeyer {
            let outcome = rekeyer.regenerate(&mut entries);
            tracing::info!("Regenerated {} citation keys", outcome.regenerated);
            report.keys_regenerated = outcome.regenerated;
            report
                .warnings
                .extend(outcome.skipped.into_iter().map(|skip| TidyWarning::KeySkipped {
                    cite_key: skip.cite_key,
                    missing: skip.missing,
                }));
        }

        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }

        report.records_out = entries.len();
        TidyOutput { entries, report }
    }
}
