//! Identifier resolution
//!
//! Classifies user input into an arXiv id or an ADS bibcode. The order of the
//! checks matters: an arXiv-shaped substring wins over URL parsing even when
//! the text also looks like an ADS URL.

use serde::{Deserialize, Serialize};

use crate::extractors::extract_arxiv_id;

/// Host fragment shared by every ADS abstract page URL.
const ADS_HOST: &str = "adsabs.harvard.edu";

/// Path segment that precedes the bibcode in an ADS abstract page URL.
const ADS_ABSTRACT_SEGMENT: &str = "abs";

/// Every ADS bibcode is exactly this long.
pub const BIBCODE_LENGTH: usize = 19;

/// A recognized paper identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identifier {
    /// arXiv preprint id, still to be looked up in the catalog
    Preprint(String),
    /// ADS bibcode, taken as-is
    Bibcode(String),
}

impl Identifier {
    /// The raw identifier value.
    pub fn value(&self) -> &str {
        match self {
            Identifier::Preprint(id) | Identifier::Bibcode(id) => id,
        }
    }
}

/// Errors from identifier recognition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("unrecognized identifier: {0}")]
    Unrecognized(String),
}

/// Classify free text as an arXiv id or an ADS bibcode.
///
/// Recognized, in order of precedence:
/// 1. an arXiv id anywhere in the text (bare id, abstract URL, PDF URL)
/// 2. an ADS abstract URL; the path segment after `abs` is the bibcode
/// 3. a bare bibcode: 19 characters starting with a 4 digit year
///
/// Surrounding whitespace (pasted text, a trailing newline) is ignored
/// before any of these checks, so a padded bibcode still counts as 19
/// characters.
pub fn parse_identifier(text: &str) -> Result<Identifier, IdentifierError> {
    let text = text.trim();

    if let Some(arxiv_id) = extract_arxiv_id(text) {
        return Ok(Identifier::Preprint(arxiv_id));
    }

    if let Some(bibcode) = bibcode_from_ads_url(text) {
        return Ok(Identifier::Bibcode(bibcode));
    }

    if is_bibcode_shaped(text) {
        return Ok(Identifier::Bibcode(text.to_string()));
    }

    Err(IdentifierError::Unrecognized(text.to_string()))
}

/// Pull the bibcode out of an ADS abstract URL.
///
/// The bibcode is whatever segment follows `abs`; it is not validated.
/// Percent-encoded characters (`A%26A` for `A&A`) are decoded.
pub fn bibcode_from_ads_url(url: &str) -> Option<String> {
    if !url.contains(ADS_HOST) {
        return None;
    }
    let mut segments = url.split('/');
    segments.find(|segment| *segment == ADS_ABSTRACT_SEGMENT)?;
    let raw = segments.next().filter(|segment| !segment.is_empty())?;
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}

/// Check whether a string has the shape of a bibcode.
pub fn is_bibcode_shaped(text: &str) -> bool {
    text.chars().count() == BIBCODE_LENGTH && text.chars().take(4).all(|c| c.is_ascii_digit())
}

/// ADS abstract page for a bibcode.
pub fn ads_abstract_url(bibcode: &str) -> String {
    format!(
        "https://ui.adsabs.harvard.edu/abs/{}/abstract",
        urlencoding::encode(bibcode)
    )
}
