//! BibTeX entry data structures

/// BibTeX entry type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BibTeXEntryType {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    PhdThesis,
    Proceedings,
    TechReport,
    Unpublished,
    Online,
    Software,
    Dataset,
    /// Any type not listed above, kept lowercase so it survives formatting
    Other(String),
}

impl BibTeXEntryType {
    /// Parse an entry type from a string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "booklet" => Self::Booklet,
            "inbook" => Self::InBook,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::MastersThesis,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "proceedings" => Self::Proceedings,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            "online" | "electronic" | "www" => Self::Online,
            "software" => Self::Software,
            "dataset" => Self::Dataset,
            other => Self::Other(other.to_string()),
        }
    }

    /// Convert entry type to canonical string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Booklet => "booklet",
            Self::InBook => "inbook",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::MastersThesis => "mastersthesis",
            Self::Misc => "misc",
            Self::PhdThesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Unpublished => "unpublished",
            Self::Online => "online",
            Self::Software => "software",
            Self::Dataset => "dataset",
            Self::Other(name) => name,
        }
    }

    /// Name of the field holding the venue for conference-like and
    /// journal-like types, `None` for everything else.
    pub fn venue_field(&self) -> Option<&'static str> {
        match self {
            Self::InProceedings | Self::Proceedings => Some("booktitle"),
            Self::Article => Some("journal"),
            _ => None,
        }
    }
}

impl std::fmt::Display for BibTeXEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single BibTeX field (key-value pair)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXField {
    pub key: String,
    pub value: String,
}

/// Ordered field storage for one entry.
///
/// Keys are stored lowercase and are unique; setting an existing key
/// replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    items: Vec<BibTeXField>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a field value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        let key_lower = key.to_lowercase();
        self.items
            .iter()
            .find(|f| f.key == key_lower)
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite a field, keeping its original position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_lowercase();
        let value = value.into();
        match self.items.iter_mut().find(|f| f.key == key) {
            Some(existing) => existing.value = value,
            None => self.items.push(BibTeXField { key, value }),
        }
    }

    /// Remove a field, returning its value if it was present
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key_lower = key.to_lowercase();
        let pos = self.items.iter().position(|f| f.key == key_lower)?;
        Some(self.items.remove(pos).value)
    }

    /// Keep only the fields matching the predicate, returning how many were dropped
    pub fn retain<F>(&mut self, f: F) -> usize
    where
        F: FnMut(&BibTeXField) -> bool,
    {
        let before = self.items.len();
        self.items.retain(f);
        before - self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BibTeXField> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|f| f.key.as_str())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a BibTeXField;
    type IntoIter = std::slice::Iter<'a, BibTeXField>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A parsed BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXEntry {
    pub cite_key: String,
    pub entry_type: BibTeXEntryType,
    pub fields: Fields,
}

impl BibTeXEntry {
    /// Create a new BibTeX entry
    pub fn new(cite_key: String, entry_type: BibTeXEntryType) -> Self {
        Self {
            cite_key,
            entry_type,
            fields: Fields::new(),
        }
    }

    /// Set a field on the entry; a repeated key overwrites the earlier value
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.set(key, value);
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key)
    }

    /// Get the title field
    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    /// Get the author field
    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    /// Get the year field
    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }

    /// Get the journal field
    pub fn journal(&self) -> Option<&str> {
        self.get_field("journal")
    }

    /// Get the booktitle field
    pub fn booktitle(&self) -> Option<&str> {
        self.get_field("booktitle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_parsing() {
        assert_eq!(
            BibTeXEntryType::from_str("article"),
            BibTeXEntryType::Article
        );
        assert_eq!(
            BibTeXEntryType::from_str("ARTICLE"),
            BibTeXEntryType::Article
        );
        assert_eq!(
            BibTeXEntryType::from_str("conference"),
            BibTeXEntryType::InProceedings
        );
        assert_eq!(
            BibTeXEntryType::from_str("Patent"),
            BibTeXEntryType::Other("patent".to_string())
        );
        assert_eq!(BibTeXEntryType::from_str("Patent").as_str(), "patent");
    }

    #[test]
    fn test_venue_field() {
        assert_eq!(BibTeXEntryType::Article.venue_field(), Some("journal"));
        assert_eq!(
            BibTeXEntryType::InProceedings.venue_field(),
            Some("booktitle")
        );
        assert_eq!(BibTeXEntryType::Book.venue_field(), None);
    }

    #[test]
    fn test_entry_field_access() {
        let mut entry = BibTeXEntry::new("Smith2024".to_string(), BibTeXEntryType::Article);
        entry.set_field("title", "A Great Paper");
        entry.set_field("Author", "John Smith");
        entry.set_field("YEAR", "2024");

        assert_eq!(entry.title(), Some("A Great Paper"));
        assert_eq!(entry.author(), Some("John Smith"));
        assert_eq!(entry.year(), Some("2024"));
        assert_eq!(entry.journal(), None);
        assert_eq!(entry.fields.keys().collect::<Vec<_>>(), ["title", "author", "year"]);
    }

    #[test]
    fn test_set_field_last_write_wins_in_place() {
        let mut fields = Fields::new();
        fields.set("title", "First");
        fields.set("year", "2020");
        fields.set("TITLE", "Second");

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("title"), Some("Second"));
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["title", "year"]);
    }

    #[test]
    fn test_remove_and_retain() {
        let mut fields = Fields::new();
        fields.set("title", "T");
        fields.set("url", "http://example.org");
        fields.set("doi", "10.1/x");

        assert_eq!(fields.remove("URL"), Some("http://example.org".to_string()));
        assert_eq!(fields.remove("url"), None);
        assert_eq!(fields.retain(|f| f.key != "doi"), 1);
        assert_eq!(fields.retain(|f| f.key != "doi"), 0);
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["title"]);
    }
}
