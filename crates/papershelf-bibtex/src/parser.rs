//! Entry parser using nom
//!
//! Entries are parsed line by line, the way citation managers and ADS write
//! them:
//!
//! ```text
//! @ARTICLE{2018ApJ...864...94B,
//!        author = {{Brown}, Gillen and {Gnedin}, Oleg Y. and {Li}, Hui},
//!         title = "{Nuclear Star Clusters in Cosmological Simulations}",
//!          year = 2018,
//! }
//! ```
//!
//! A line that is not `name = value` continues the previous field's value.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    IResult,
};

use crate::entry::{CitationEntry, RawEntry};

/// Errors from parsing a single entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryParseError {
    #[error("line {line}: expected an entry header like @article{{key,")]
    MalformedHeader { line: usize },
    #[error("line {line}: text outside of any field")]
    StrayText { line: usize },
    #[error("line {line}: not valid UTF-8 text")]
    InvalidEncoding { line: usize },
    #[error("empty entry")]
    Empty,
}

/// Parse a raw entry into its type, cite key and cleaned fields.
pub fn parse_entry(raw: &RawEntry) -> Result<CitationEntry, EntryParseError> {
    if let Some(line) = raw.undecodable_line {
        return Err(EntryParseError::InvalidEncoding { line });
    }
    let mut lines = raw
        .text
        .lines()
        .enumerate()
        .map(|(offset, line)| (raw.first_line + offset, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(EntryParseError::Empty)?;
    let (rest, (entry_type, cite_key)) = parse_header(header)
        .map_err(|_| EntryParseError::MalformedHeader { line: header_line })?;

    let mut entry = CitationEntry::new(entry_type, cite_key);
    if !entry.is_record() {
        return Ok(entry);
    }

    // (name, uncleaned value) pairs; continuation lines extend the last one
    let mut fields: Vec<(String, String)> = Vec::new();
    let trailing = rest.trim();
    if !trailing.is_empty() {
        push_line(&mut fields, trailing, header_line)?;
    }
    for (line_number, line) in lines {
        push_line(&mut fields, line, line_number)?;
    }

    for (name, value) in fields {
        entry.fields.insert(name, clean_value(&value));
    }
    Ok(entry)
}

fn push_line(
    fields: &mut Vec<(String, String)>,
    line: &str,
    line_number: usize,
) -> Result<(), EntryParseError> {
    let trimmed = line.trim();
    if trimmed == "}" {
        return Ok(());
    }
    if let Ok((value, name)) = parse_field_start(trimmed) {
        fields.push((name.to_lowercase(), value.to_string()));
        return Ok(());
    }
    match fields.last_mut() {
        Some((_, value)) => {
            value.push(' ');
            value.push_str(trimmed);
            Ok(())
        }
        None => Err(EntryParseError::StrayText { line: line_number }),
    }
}

/// Parse `@type{key,` and return what follows the comma
fn parse_header(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('@')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('{')(rest)?;

    // @comment{...} and friends carry no key
    if matches!(
        entry_type.to_lowercase().as_str(),
        "comment" | "string" | "preamble"
    ) {
        return Ok(("", (entry_type, "")));
    }

    let (rest, _) = multispace0(rest)?;
    let (rest, cite_key) =
        take_while1(|c: char| c != ',' && c != '}' && !c.is_whitespace())(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;
    Ok((rest, (entry_type, cite_key)))
}

/// Parse `name =` and return the raw value text after it
fn parse_field_start(input: &str) -> IResult<&str, &str> {
    let (rest, name) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    Ok((rest, name))
}

/// Strip braces, double quotes and a trailing comma from a field value
pub fn clean_value(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '"'))
        .collect();
    let trimmed = stripped.trim();
    trimmed
        .strip_suffix(',')
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
