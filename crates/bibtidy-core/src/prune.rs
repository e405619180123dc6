//! Clutter-field removal

use std::collections::BTreeSet;

use bibtidy_bibtex::BibTeXEntry;

use crate::config::PruningConfig;

/// Fields later stages depend on; never pruned whatever the configuration says
pub const PROTECTED_FIELDS: [&str; 5] = ["title", "author", "year", "booktitle", "journal"];

/// Removes a fixed set of clutter fields from entries
#[derive(Debug, Clone)]
pub struct FieldPruner {
    fields: BTreeSet<String>,
}

impl FieldPruner {
    /// Build the pruning set: `always`, plus `extended` unless metadata is kept
    pub fn new(config: &PruningConfig, keep_metadata: bool) -> Self {
        let extended: &[String] = if keep_metadata { &[] } else { &config.extended };

        let mut fields = BTreeSet::new();
        for name in config.always.iter().chain(extended) {
            let name = name.trim().to_lowercase();
            if PROTECTED_FIELDS.contains(&name.as_str()) {
                tracing::warn!("Ignoring protected field {:?} in pruning configuration", name);
                continue;
            }
            if !name.is_empty() {
                fields.insert(name);
            }
        }

        Self { fields }
    }

    /// Field names this pruner removes, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Remove clutter fields from one entry, returning how many were removed
    pub fn prune(&self, entry: &mut BibTeXEntry) -> usize {
        entry.fields.retain(|f| !self.fields.contains(&f.key))
    }

    /// Remove clutter fields from every entry
    pub fn prune_all(&self, entries: &mut [BibTeXEntry]) -> usize {
        entries.iter_mut().map(|entry| self.prune(entry)).sum()
    }
}
