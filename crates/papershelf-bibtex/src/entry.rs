//! Citation entry data structures

use std::collections::BTreeMap;

/// One entry as it appeared in the source, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// The entry text, comment lines removed, trailing blank lines trimmed
    pub text: String,
    /// 1-based line number of the opening `@` line
    pub first_line: usize,
    /// First line that was not valid UTF-8; `text` holds it lossily decoded
    pub undecodable_line: Option<usize>,
}

impl RawEntry {
    pub fn new(text: impl Into<String>, first_line: usize) -> Self {
        Self {
            text: text.into(),
            first_line,
            undecodable_line: None,
        }
    }
}

/// A parsed citation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationEntry {
    /// Entry type, lowercased (`article`, `misc`, ...)
    pub entry_type: String,
    /// The cite key declared on the opening line
    pub cite_key: String,
    /// Field name (lowercased) to cleaned value
    pub fields: BTreeMap<String, String>,
}

impl CitationEntry {
    pub fn new(entry_type: &str, cite_key: &str) -> Self {
        Self {
            entry_type: entry_type.to_lowercase(),
            cite_key: cite_key.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Get a field value by name (case-insensitive). Empty values count as absent.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_lowercase())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Whether this is a bibliographic record rather than a `@comment`,
    /// `@string` or `@preamble` block.
    pub fn is_record(&self) -> bool {
        !matches!(self.entry_type.as_str(), "comment" | "string" | "preamble")
    }
}
