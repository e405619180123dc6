//! BibTeX library tidying
//!
//! Normalizes venue names, strips clutter fields, removes duplicate entries
//! by title and optionally regenerates citation keys. All stages operate on
//! one in-memory batch of [`bibtidy_bibtex::BibTeXEntry`] values; see
//! [`Pipeline`] for the stage order.

pub mod cite_key;
pub mod config;
pub mod dedup;
pub mod pipeline;
pub mod prune;
pub mod sort;
pub mod venue;

pub use cite_key::{KeyPart, KeyRegenerator, RekeyOutcome, SkippedKey};
pub use config::{ConfigError, KeyConfig, PruningConfig, TidyConfig, VenueRuleConfig};
pub use dedup::{deduplicate, normalize_title, RemovedDuplicate};
pub use pipeline::{Pipeline, TidyOptions, TidyOutput, TidyReport, TidyWarning};
pub use prune::{FieldPruner, PROTECTED_FIELDS};
pub use sort::sort_entries;
pub use venue::{canonicalize_venue, VenueKind, VenueNormalizer, VenueOutcome, VenueRule};
