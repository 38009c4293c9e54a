//! Domain models shared by the record store, the SQLite layer, and the TUI.
//! They stay plain data holders; ordering and identity live in `store`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A catalog entry. Every field is optional because a freshly added book
/// starts out blank and the user fills it in later.
pub struct Book {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    /// Free-form note shown below the table, never sorted on.
    pub note: Option<String>,
}

impl Book {
    /// Build a book from borrowed text, treating blank values as missing.
    pub fn new(title: &str, author: &str, year: &str) -> Self {
        Self {
            title: normalize_field(title),
            author: normalize_field(author),
            year: normalize_field(year),
            note: None,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = normalize_field(note);
        self
    }

    /// Value of a sortable column.
    pub fn sort_value(&self, key: SortKey) -> Option<&str> {
        match key {
            SortKey::Title => self.title.as_deref(),
            SortKey::Author => self.author.as_deref(),
            SortKey::Year => self.year.as_deref(),
        }
    }

    /// Case-insensitive substring match over all four fields. `needle` must
    /// already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.author, &self.year, &self.note]
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(needle))
    }

    /// Title as shown in messages, falling back to a placeholder for blank
    /// records.
    pub fn display_title(&self) -> String {
        match (&self.title, &self.author) {
            (Some(title), Some(author)) => format!("{title} - {author}"),
            (Some(title), None) => title.clone(),
            (None, _) => "Untitled".to_string(),
        }
    }
}

/// Trim user input and map blank text to `None`.
pub fn normalize_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Columns a catalog can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Title,
    Author,
    Year,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Title, SortKey::Author, SortKey::Year];

    /// Attribute name as typed into the sort prompt.
    pub fn attribute(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Year => "year",
        }
    }

    /// Column header text.
    pub fn heading(self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Year => "Year",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("invalid sort attribute `{0}`; expected title, author or year")]
    UnknownAttribute(String),
}

impl FromStr for SortKey {
    type Err = SortError;

    /// Case-insensitive. Surrounding whitespace is ignored as well, so a
    /// padded entry such as `" title "` still names a column.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            "year" => Ok(SortKey::Year),
            _ => Err(SortError::UnknownAttribute(s.trim().to_string())),
        }
    }
}
