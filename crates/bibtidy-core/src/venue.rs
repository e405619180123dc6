//! Venue name normalization
//!
//! Rewrites `booktitle` (conference-like entries) and `journal`
//! (journal-like entries) to a canonical short form using an ordered rule
//! table. Matching works on canonicalized text so that
//! "Proc. of the IEEE Conf. on ..." and "IEEE Conference on ..." compare
//! equal.

use bibtidy_bibtex::BibTeXEntry;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{ConfigError, TidyConfig, VenueRuleConfig};

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();
    static ref ORDINAL: Regex = Regex::new(r"^\d+(st|nd|rd|th)$").unwrap();
    static ref YEAR: Regex = Regex::new(r"^(1[89]|20)\d{2}$").unwrap();
}

/// Abbreviations commonly found in venue names, expanded before matching
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("acad", "academy"),
    ("adv", "advances"),
    ("anal", "analysis"),
    ("ann", "annual"),
    ("assoc", "association"),
    ("commun", "communications"),
    ("comput", "computer"),
    ("conf", "conference"),
    ("inf", "information"),
    ("int", "international"),
    ("intell", "intelligence"),
    ("internat", "international"),
    ("intl", "international"),
    ("j", "journal"),
    ("jour", "journal"),
    ("lang", "language"),
    ("learn", "learning"),
    ("mach", "machine"),
    ("natl", "national"),
    ("proc", "proceedings"),
    ("process", "processing"),
    ("recognit", "recognition"),
    ("res", "research"),
    ("sci", "sciences"),
    ("symp", "symposium"),
    ("syst", "systems"),
    ("trans", "transactions"),
    ("vis", "vision"),
];

/// Which table a venue field is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueKind {
    Conference,
    Journal,
}

impl VenueKind {
    fn for_field(field: &str) -> Option<Self> {
        match field {
            "booktitle" => Some(Self::Conference),
            "journal" => Some(Self::Journal),
            _ => None,
        }
    }
}

/// What happened to one entry's venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueOutcome {
    /// The venue field was replaced by a canonical name
    Rewritten { from: String, to: String },
    /// The venue matched nothing or was already canonical
    Unchanged,
    /// The entry type carries no venue
    NotApplicable,
    /// A venue-bearing entry lacks its venue field
    MissingField(&'static str),
}

/// Canonicalize venue text for matching.
///
/// Braces are dropped, text is lowercased and split on anything that is not
/// a letter or digit, ordinals ("34th") and years are removed, and known
/// abbreviations are expanded. Tokens are joined by single spaces.
pub fn canonicalize_venue(text: &str) -> String {
    let lowered = text.replace(['{', '}'], "").to_lowercase();
    SEPARATORS
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .filter(|token| !ORDINAL.is_match(token) && !YEAR.is_match(token))
        .map(expand_abbreviation)
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_abbreviation(token: &str) -> &str {
    ABBREVIATIONS
        .iter()
        .find(|(abbrev, _)| *abbrev == token)
        .map(|(_, full)| *full)
        .unwrap_or(token)
}

/// A compiled venue rule
#[derive(Debug, Clone)]
pub struct VenueRule {
    canonical: String,
    /// Canonicalized aliases, padded with spaces for whole-word matching
    matchers: Vec<String>,
}

impl VenueRule {
    pub fn new(config: &VenueRuleConfig) -> Result<Self, ConfigError> {
        let mut matchers = Vec::with_capacity(config.aliases.len());
        for alias in &config.aliases {
            let canonical = canonicalize_venue(alias);
            if canonical.is_empty() {
                return Err(ConfigError::InvalidRule(format!(
                    "alias {:?} of {} is empty after canonicalization",
                    alias, config.canonical
                )));
            }
            matchers.push(format!(" {} ", canonical));
        }

        Ok(Self {
            canonical: config.canonical.clone(),
            matchers,
        })
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Whether any alias appears as a whole-word run in `padded`
    fn matches(&self, padded: &str) -> bool {
        self.matchers.iter().any(|m| padded.contains(m.as_str()))
    }
}

/// Ordered rule tables for conference and journal venues
#[derive(Debug, Clone)]
pub struct VenueNormalizer {
    conferences: Vec<VenueRule>,
    journals: Vec<VenueRule>,
}

impl VenueNormalizer {
    pub fn from_config(config: &TidyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            conferences: compile_rules(&config.conference)?,
            journals: compile_rules(&config.journal)?,
        })
    }

    /// Canonical name for `value`, or `None` when no rule matches.
    /// Rules are tried in table order and the first match wins.
    pub fn lookup(&self, kind: VenueKind, value: &str) -> Option<&str> {
        let rules = match kind {
            VenueKind::Conference => &self.conferences,
            VenueKind::Journal => &self.journals,
        };

        let padded = format!(" {} ", canonicalize_venue(value));
        rules
            .iter()
            .find(|rule| rule.matches(&padded))
            .map(VenueRule::canonical)
    }

    /// Normalize the venue field of one entry in place
    pub fn normalize(&self, entry: &mut BibTeXEntry) -> VenueOutcome {
        let Some(field) = entry.entry_type.venue_field() else {
            return VenueOutcome::NotApplicable;
        };
        let Some(kind) = VenueKind::for_field(field) else {
            return VenueOutcome::NotApplicable;
        };
        let Some(current) = entry.get_field(field) else {
            return VenueOutcome::MissingField(field);
        };

        match self.lookup(kind, current) {
            Some(canonical) if canonical != current => {
                let outcome = VenueOutcome::Rewritten {
                    from: current.to_string(),
                    to: canonical.to_string(),
                };
                entry.set_field(field, canonical);
                outcome
            }
            _ => VenueOutcome::Unchanged,
        }
    }
}

fn compile_rules(configs: &[VenueRuleConfig]) -> Result<Vec<VenueRule>, ConfigError> {
    configs.iter().map(VenueRule::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibtidy_bibtex::BibTeXEntryType;

    fn normalizer() -> VenueNormalizer {
        VenueNormalizer::from_config(&TidyConfig::builtin().unwrap()).unwrap()
    }

    fn conference(booktitle: &str) -> BibTeXEntry {
        let mut entry = BibTeXEntry::new("k".to_string(), BibTeXEntryType::InProceedings);
        entry.set_field("title", "Some Paper");
        entry.set_field("booktitle", booktitle);
        entry
    }

    #[test]
    fn test_canonicalize_venue() {
        assert_eq!(
            canonicalize_venue("Proc. of the IEEE Conf. on Computer Vision"),
            "proceedings of the ieee conference on computer vision"
        );
        assert_eq!(
            canonicalize_venue("Proceedings of the 34th {Conference} 2020"),
            "proceedings of the conference"
        );
        assert_eq!(canonicalize_venue("  --  "), "");
    }

    #[test]
    fn test_neurips_long_form() {
        let mut entry = conference(
            "Proceedings of the 34th Conference on Neural Information Processing Systems",
        );
        let outcome = normalizer().normalize(&mut entry);
        assert!(matches!(outcome, VenueOutcome::Rewritten { .. }));
        assert_eq!(entry.booktitle(), Some("NeurIPS"));
        assert_eq!(entry.title(), Some("Some Paper"));
    }

    #[test]
    fn test_abbreviated_and_spelled_out_forms_agree() {
        let venues = normalizer();
        assert_eq!(
            venues.lookup(
                VenueKind::Conference,
                "Proc. of the IEEE Conf. on Computer Vision and Pattern Recognition"
            ),
            Some("CVPR")
        );
        assert_eq!(
            venues.lookup(
                VenueKind::Conference,
                "IEEE Conference on Computer Vision and Pattern Recognition"
            ),
            Some("CVPR")
        );
        assert_eq!(
            venues.lookup(
                VenueKind::Journal,
                "IEEE Trans. Pattern Anal. Mach. Intell."
            ),
            Some("IEEE Transactions on Pattern Analysis and Machine Intelligence")
        );
        assert_eq!(
            venues.lookup(VenueKind::Journal, "J. Mach. Learn. Res."),
            Some("Journal of Machine Learning Research")
        );
    }

    #[test]
    fn test_acronym_matches_whole_words_only() {
        let venues = normalizer();
        assert_eq!(
            venues.lookup(VenueKind::Conference, "Proc. ICML 2019"),
            Some("ICML")
        );
        // "acl" inside "eacl" is not a word of its own
        assert_eq!(venues.lookup(VenueKind::Conference, "Proc. of EACL"), None);
        assert_eq!(
            venues.lookup(VenueKind::Conference, "NAACL-HLT"),
            Some("NAACL")
        );
    }

    #[test]
    fn test_naacl_is_not_acl() {
        let mut entry = conference(
            "Proceedings of the 2019 Conference of the North American Chapter of the \
             Association for Computational Linguistics: Human Language Technologies",
        );
        normalizer().normalize(&mut entry);
        assert_eq!(entry.booktitle(), Some("NAACL"));

        assert_eq!(
            normalizer().lookup(
                VenueKind::Conference,
                "Annual Meeting of the Association for Computational Linguistics"
            ),
            Some("ACL")
        );
    }

    #[test]
    fn test_first_match_wins() {
        let venues = normalizer();
        assert_eq!(
            venues.lookup(
                VenueKind::Conference,
                "Conference on Empirical Methods in Natural Language Processing, Association for Computational Linguistics"
            ),
            Some("EMNLP")
        );
    }

    #[test]
    fn test_unmatched_venue_is_untouched() {
        let mut entry = conference("Workshop on Obscure Things");
        assert_eq!(normalizer().normalize(&mut entry), VenueOutcome::Unchanged);
        assert_eq!(entry.booktitle(), Some("Workshop on Obscure Things"));
    }

    #[test]
    fn test_tables_are_kind_specific() {
        // A journal field never picks up a conference rule
        let mut entry = BibTeXEntry::new("k".to_string(), BibTeXEntryType::Article);
        entry.set_field("journal", "Advances in Neural Information Processing Systems");
        assert_eq!(normalizer().normalize(&mut entry), VenueOutcome::Unchanged);
    }

    #[test]
    fn test_missing_and_not_applicable() {
        let venues = normalizer();
        let mut article = BibTeXEntry::new("a".to_string(), BibTeXEntryType::Article);
        assert_eq!(
            venues.normalize(&mut article),
            VenueOutcome::MissingField("journal")
        );

        let mut book = BibTeXEntry::new("b".to_string(), BibTeXEntryType::Book);
        book.set_field("booktitle", "NIPS");
        assert_eq!(venues.normalize(&mut book), VenueOutcome::NotApplicable);
        assert_eq!(book.booktitle(), Some("NIPS"));
    }

    #[test]
    fn test_canonical_names_are_fixed_points() {
        let config = TidyConfig::builtin().unwrap();
        let venues = VenueNormalizer::from_config(&config).unwrap();

        for (kind, rules) in [
            (VenueKind::Conference, &config.conference),
            (VenueKind::Journal, &config.journal),
        ] {
            for rule in rules {
                let result = venues.lookup(kind, &rule.canonical);
                assert!(
                    result.is_none() || result == Some(rule.canonical.as_str()),
                    "{} normalizes to {:?}",
                    rule.canonical,
                    result
                );
            }
        }
    }
}
