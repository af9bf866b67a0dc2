//! Identifier extraction from text

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // New-style arXiv id: 4 digit yymm, a dot, then 4 (pre-2015) or 5 digits.
    // Versions (v2) and ".pdf" suffixes are simply left outside the match.
    static ref ARXIV_REGEX: Regex = Regex::new(r"(?P<id>\d{4}\.\d{4,5})").unwrap();

    // DOI regex: 10.XXXX/... pattern
    // DOIs start with 10. followed by registrant code and suffix
    static ref DOI_REGEX: Regex = Regex::new(
        r#"(?i)(?:doi[:\s]*)?(?:https?://(?:dx\.)?doi\.org/)?(?P<doi>10\.\d{4,}/[^\s\]}>\"',;]+)"#
    ).unwrap();
}

/// Find the first arXiv id anywhere in the text.
///
/// Works on bare ids, `arXiv:` prefixed ids, abstract URLs and PDF URLs alike,
/// since the pattern is searched for rather than anchored.
pub fn extract_arxiv_id(text: &str) -> Option<String> {
    ARXIV_REGEX
        .captures(text)
        .and_then(|cap| cap.name("id"))
        .map(|m| m.as_str().to_string())
}

/// Extract DOIs from text
pub fn extract_dois(text: &str) -> Vec<String> {
    DOI_REGEX
        .captures_iter(text)
        .filter_map(|cap| cap.name("doi"))
        .map(|m| clean_doi(m.as_str()))
        .collect()
}

/// Normalize a DOI field value (strip resolver URLs and `doi:` prefixes).
///
/// Returns `None` if the value does not contain anything DOI-shaped.
pub fn normalize_doi(value: &str) -> Option<String> {
    extract_dois(value).into_iter().next()
}

/// Clean a DOI by removing trailing punctuation
fn clean_doi(doi: &str) -> String {
    let mut s = doi.to_string();
    // Remove trailing punctuation that might have been captured
    while let Some(c) = s.chars().last() {
        if c == '.' || c == ',' || c == ';' || c == ')' || c == ']' {
            s.pop();
        } else {
            break;
        }
    }
    s
}
