//! Paper records and their attributes
//!
//! A paper is keyed by its ADS bibcode. Catalog-sourced metadata lives in
//! [`PaperMetadata`]; the stored row, with the user's own state layered on
//! top, is a [`PaperRecord`]. Individual columns are addressed by name through
//! [`Field`] and carry [`AttributeValue`]s.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Volume and page value meaning "not yet published".
pub const UNPUBLISHED: i64 = -1;

/// Stored in `arxiv_id` when a paper has no arXiv identifier.
pub const NO_ARXIV_ID: &str = "none";

/// Joins author names in the `authors` column.
pub const AUTHOR_SEPARATOR: &str = "&&&&";

/// Page of a paper: a plain number, or text for unusual pagination
/// (`L12`, `e1234`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    Number(i64),
    Text(String),
}

impl Page {
    /// The unpublished sentinel.
    pub fn unpublished() -> Self {
        Page::Number(UNPUBLISHED)
    }

    /// Interpret stored page text, coercing numeric text to a number.
    pub fn from_stored(text: &str) -> Self {
        match text.trim().parse::<i64>() {
            Ok(number) => Page::Number(number),
            Err(_) => Page::Text(text.to_string()),
        }
    }

    pub fn to_stored(&self) -> String {
        self.to_string()
    }

    pub fn is_unpublished(&self) -> bool {
        *self == Page::Number(UNPUBLISHED)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Number(n) => write!(f, "{}", n),
            Page::Text(s) => f.write_str(s),
        }
    }
}

/// Bibliographic metadata as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub bibcode: String,
    pub title: String,
    /// "Last, First" names in author order
    pub authors: Vec<String>,
    /// Year-first publication date, e.g. `2018-09-00`
    pub pubdate: String,
    pub journal: String,
    pub volume: i64,
    pub page: Page,
    pub abstract_text: String,
    /// Citation export text exactly as the catalog formats it
    pub bibtex: String,
    pub arxiv_id: Option<String>,
}

/// A stored paper: catalog metadata plus local user state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub bibcode: String,
    pub title: String,
    pub authors: Vec<String>,
    pub pubdate: String,
    pub journal: String,
    pub volume: i64,
    pub page: Page,
    pub abstract_text: String,
    /// Raw export text; its opening key is not rewritten
    pub bibtex: String,
    pub arxiv_id: Option<String>,
    pub citation_keyword: String,
    pub update_time: DateTime<Utc>,
    pub local_file: Option<PathBuf>,
    pub user_notes: Option<String>,
    /// Tags this paper belongs to, sorted case-insensitively
    pub tags: Vec<String>,
}

impl PaperRecord {
    /// The first four characters of the publication date.
    pub fn year(&self) -> &str {
        let end = self
            .pubdate
            .char_indices()
            .nth(4)
            .map(|(i, _)| i)
            .unwrap_or(self.pubdate.len());
        &self.pubdate[..end]
    }

    pub fn is_unpublished(&self) -> bool {
        self.page.is_unpublished()
    }
}

/// The fixed attributes every paper has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Bibcode,
    Title,
    Authors,
    Pubdate,
    Journal,
    Volume,
    Page,
    Abstract,
    Bibtex,
    ArxivId,
    CitationKeyword,
    UpdateTime,
    LocalFile,
    UserNotes,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Bibcode,
        Field::Title,
        Field::Authors,
        Field::Pubdate,
        Field::Journal,
        Field::Volume,
        Field::Page,
        Field::Abstract,
        Field::Bibtex,
        Field::ArxivId,
        Field::CitationKeyword,
        Field::UpdateTime,
        Field::LocalFile,
        Field::UserNotes,
    ];

    /// Attribute name, which is also the column name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Bibcode => "bibcode",
            Field::Title => "title",
            Field::Authors => "authors",
            Field::Pubdate => "pubdate",
            Field::Journal => "journal",
            Field::Volume => "volume",
            Field::Page => "page",
            Field::Abstract => "abstract",
            Field::Bibtex => "bibtex",
            Field::ArxivId => "arxiv_id",
            Field::CitationKeyword => "citation_keyword",
            Field::UpdateTime => "update_time",
            Field::LocalFile => "local_file",
            Field::UserNotes => "user_notes",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Whether `name` collides with an attribute name, ignoring case.
    pub fn is_reserved(name: &str) -> bool {
        Field::ALL
            .iter()
            .any(|field| field.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a single paper attribute or tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
    Timestamp(DateTime<Utc>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "boolean",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Text(_) => "text",
            AttributeValue::List(_) => "list",
            AttributeValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Integer(n)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(items: Vec<String>) -> Self {
        AttributeValue::List(items)
    }
}

impl From<Page> for AttributeValue {
    fn from(page: Page) -> Self {
        match page {
            Page::Number(n) => AttributeValue::Integer(n),
            Page::Text(s) => AttributeValue::Text(s),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("null"),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Integer(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::List(items) => f.write_str(&items.join("; ")),
            AttributeValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}
