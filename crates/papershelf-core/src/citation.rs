//! Short citation strings
//!
//! `Brown, Gnedin, Li, 2018, ApJ, 864, 94` for published papers,
//! `Forbes et al., 2020, arXiv:2003.14327` for preprints.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::library::Library;
use crate::paper::PaperRecord;

lazy_static! {
    /// Full journal names (as ADS reports them) to their usual abbreviation.
    static ref JOURNAL_ABBREVIATIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("The Astrophysical Journal", "ApJ");
        m.insert("The Astrophysical Journal Supplement Series", "ApJS");
        m.insert("The Astrophysical Journal Letters", "ApJL");
        m.insert("The Astronomical Journal", "AJ");
        m.insert("Monthly Notices of the Royal Astronomical Society", "MNRAS");
        m.insert("Astronomy and Astrophysics", "A&A");
        m.insert("Annual Review of Astronomy and Astrophysics", "ARA&A");
        m.insert("Publications of the Astronomical Society of the Pacific", "PASP");
        m.insert("Space Science Reviews", "SSRv");
        m
    };
    static ref MULTIPLE_UNDERSCORES: Regex = Regex::new(r"_+").unwrap();
}

/// Abbreviate a journal name, passing unknown journals through unchanged.
pub fn abbreviate_journal(journal: &str) -> &str {
    JOURNAL_ABBREVIATIONS
        .get(journal.trim())
        .copied()
        .unwrap_or(journal)
}

/// The last name from a "Last, First" author string.
pub fn last_name(author: &str) -> &str {
    author.split(',').next().unwrap_or(author).trim()
}

/// "A, B, C" for up to three authors, "A et al." beyond that.
pub fn format_authors(authors: &[String]) -> String {
    if authors.len() > 3 {
        return format!("{} et al.", last_name(&authors[0]));
    }
    authors
        .iter()
        .map(|a| last_name(a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Citation string for a stored paper.
pub fn format_citation(record: &PaperRecord) -> String {
    let authors = format_authors(&record.authors);
    let year = record.year();

    if !record.is_unpublished() {
        return format!(
            "{}, {}, {}, {}, {}",
            authors,
            year,
            abbreviate_journal(&record.journal),
            record.volume,
            record.page
        );
    }
    match &record.arxiv_id {
        Some(arxiv_id) => format!("{}, {}, arXiv:{}", authors, year, arxiv_id),
        None => format!("{}, {}", authors, year),
    }
}

/// Make a citation string safe to use as a file name.
pub fn to_filename(citation: &str) -> String {
    let spaced = citation
        .replace("et al", "etal")
        .replace([' ', ':'], "_");
    let kept: String = spaced
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    MULTIPLE_UNDERSCORES
        .replace_all(&kept, "_")
        .trim_matches('_')
        .to_lowercase()
}

impl Library {
    /// Short citation for a paper, e.g. `Brown, Gnedin, Li, 2018, ApJ, 864, 94`.
    pub fn citation_string(&self, bibcode: &str) -> Result<String> {
        Ok(format_citation(&self.record(bibcode)?))
    }

    /// The citation string in file-name form, e.g. `brown_gnedin_li_2018_apj_864_94`.
    pub fn citation_filename(&self, bibcode: &str) -> Result<String> {
        Ok(to_filename(&self.citation_string(bibcode)?))
    }
}
