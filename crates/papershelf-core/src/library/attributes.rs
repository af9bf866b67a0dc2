//! Attribute access by name
//!
//! An attribute name is either one of the fixed paper [`Field`]s or a
//! registered tag. Fields win when both would match, which cannot happen in
//! practice because tags named like a field are refused at creation.

use rusqlite::types::Value;
use rusqlite::params;

use papershelf_bibtex::replace_cite_key;

use super::{constraint_violation, Library};
use crate::error::{LibraryError, Result};
use crate::paper::{AttributeValue, Field, Page, AUTHOR_SEPARATOR};

impl Library {
    /// Read one attribute of a paper.
    ///
    /// `authors` comes back as a list, `page` as an integer when the stored
    /// text is numeric, and `bibtex` with its opening key replaced by the
    /// paper's current citation keyword.
    pub fn get_attribute(&self, bibcode: &str, name: &str) -> Result<AttributeValue> {
        if let Some(field) = Field::from_name(name) {
            let record = self.record(bibcode)?;
            let value = match field {
                Field::Bibcode => AttributeValue::Text(record.bibcode),
                Field::Title => AttributeValue::Text(record.title),
                Field::Authors => AttributeValue::List(record.authors),
                Field::Pubdate => AttributeValue::Text(record.pubdate),
                Field::Journal => AttributeValue::Text(record.journal),
                Field::Volume => AttributeValue::Integer(record.volume),
                Field::Page => record.page.into(),
                Field::Abstract => AttributeValue::Text(record.abstract_text),
                Field::Bibtex => AttributeValue::Text(replace_cite_key(
                    &record.bibtex,
                    &record.citation_keyword,
                )),
                Field::ArxivId => AttributeValue::Text(
                    record
                        .arxiv_id
                        .unwrap_or_else(|| crate::paper::NO_ARXIV_ID.to_string()),
                ),
                Field::CitationKeyword => AttributeValue::Text(record.citation_keyword),
                Field::UpdateTime => AttributeValue::Timestamp(record.update_time),
                Field::LocalFile => match record.local_file {
                    Some(path) => AttributeValue::Text(path.to_string_lossy().into_owned()),
                    None => AttributeValue::Null,
                },
                Field::UserNotes => match record.user_notes {
                    Some(notes) => AttributeValue::Text(notes),
                    None => AttributeValue::Null,
                },
            };
            return Ok(value);
        }

        if self.tag_id(name)?.is_some() {
            self.require(bibcode)?;
            return Ok(AttributeValue::Bool(self.membership(bibcode, name)?));
        }

        Err(LibraryError::UnknownAttribute(name.to_string()))
    }

    /// Write one attribute of a paper.
    ///
    /// Values are checked against the attribute's shape before anything is
    /// written; see [`AttributeValue`] for the variants each attribute takes.
    pub fn set_attribute(&self, bibcode: &str, name: &str, value: AttributeValue) -> Result<()> {
        if let Some(field) = Field::from_name(name) {
            let stored = to_column_value(field, value)?;
            return self.update_column(bibcode, field, stored);
        }

        if self.tag_id(name)?.is_some() {
            return match value {
                AttributeValue::Bool(true) => self.tag_paper(bibcode, name),
                AttributeValue::Bool(false) => self.untag_paper(bibcode, name),
                other => Err(invalid(name, "a boolean", &other)),
            };
        }

        Err(LibraryError::UnknownAttribute(name.to_string()))
    }

    fn update_column(&self, bibcode: &str, field: Field, stored: Value) -> Result<()> {
        // Column names come from Field, never from user input
        let sql = format!("UPDATE papers SET {} = ?1 WHERE bibcode = ?2", field.name());
        let rows = self
            .conn()
            .execute(&sql, params![stored, bibcode])
            .map_err(|e| {
                if constraint_violation(&e).is_some() {
                    return LibraryError::DuplicateValue {
                        attribute: field.name().to_string(),
                        value: match &stored {
                            Value::Text(s) => s.clone(),
                            other => format!("{:?}", other),
                        },
                    };
                }
                LibraryError::Storage(format!("update {}: {}", field, e))
            })?;
        if rows == 0 {
            return Err(LibraryError::RecordNotFound(bibcode.to_string()));
        }
        Ok(())
    }
}

fn invalid(name: &str, expected: &str, got: &AttributeValue) -> LibraryError {
    LibraryError::InvalidValue(format!(
        "{} takes {}, not {} value",
        name,
        expected,
        article(got.kind())
    ))
}

fn article(kind: &str) -> String {
    match kind.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {}", kind),
        _ => format!("a {}", kind),
    }
}

fn non_empty_text(field: Field, value: AttributeValue) -> Result<String> {
    match value {
        AttributeValue::Text(text) if !text.trim().is_empty() => Ok(text),
        AttributeValue::Text(_) => Err(LibraryError::InvalidValue(format!(
            "{} cannot be empty",
            field
        ))),
        other => Err(invalid(field.name(), "text", &other)),
    }
}

/// Validate `value` for `field` and convert it to its stored form.
fn to_column_value(field: Field, value: AttributeValue) -> Result<Value> {
    let stored = match field {
        Field::Bibcode => Value::Text(non_empty_text(field, value)?),
        Field::CitationKeyword => {
            let keyword = non_empty_text(field, value)?;
            if keyword.chars().any(char::is_whitespace) {
                return Err(LibraryError::InvalidValue(format!(
                    "citation keyword '{}' contains whitespace",
                    keyword
                )));
            }
            Value::Text(keyword)
        }
        Field::Title
        | Field::Pubdate
        | Field::Journal
        | Field::Abstract
        | Field::Bibtex
        | Field::ArxivId => match value {
            AttributeValue::Text(text) => Value::Text(text),
            other => return Err(invalid(field.name(), "text", &other)),
        },
        Field::Authors => match value {
            AttributeValue::List(authors) => {
                if let Some(bad) = authors
                    .iter()
                    .find(|a| a.trim().is_empty() || a.contains(AUTHOR_SEPARATOR))
                {
                    return Err(LibraryError::InvalidValue(format!(
                        "author name '{}' is empty or contains '{}'",
                        bad, AUTHOR_SEPARATOR
                    )));
                }
                Value::Text(authors.join(AUTHOR_SEPARATOR))
            }
            other => return Err(invalid(field.name(), "a list", &other)),
        },
        Field::Volume => match value {
            AttributeValue::Integer(n) => Value::Integer(n),
            other => return Err(invalid(field.name(), "an integer", &other)),
        },
        Field::Page => match value {
            AttributeValue::Integer(n) => Value::Text(Page::Number(n).to_stored()),
            AttributeValue::Text(text) if !text.trim().is_empty() => Value::Text(text),
            other => return Err(invalid(field.name(), "an integer or non-empty text", &other)),
        },
        Field::UpdateTime => match value {
            AttributeValue::Timestamp(t) => Value::Integer(t.timestamp_millis()),
            other => return Err(invalid(field.name(), "a timestamp", &other)),
        },
        Field::LocalFile => match value {
            AttributeValue::Null => Value::Null,
            AttributeValue::Text(path) => {
                if !std::path::Path::new(&path).is_file() {
                    return Err(LibraryError::InvalidValue(format!(
                        "local file '{}' does not exist",
                        path
                    )));
                }
                Value::Text(path)
            }
            other => return Err(invalid(field.name(), "a path or null", &other)),
        },
        Field::UserNotes => match value {
            AttributeValue::Null => Value::Null,
            AttributeValue::Text(notes) => Value::Text(notes),
            other => return Err(invalid(field.name(), "text or null", &other)),
        },
    };
    Ok(stored)
}
