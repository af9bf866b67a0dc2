//! ADS API response models

use papershelf_core::paper::UNPUBLISHED;
use papershelf_core::{GatewayError, Page, PaperMetadata};
use serde::Deserialize;

/// Fields requested when fetching a full record
pub(crate) const METADATA_FIELDS: &str =
    "bibcode,title,author,pubdate,year,pub,volume,page,abstract,identifier";

/// ADS search response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    docs: Vec<AdsDocument>,
    #[serde(rename = "numFound")]
    #[allow(dead_code)]
    num_found: Option<u32>,
}

impl SearchResponse {
    pub(crate) fn into_first(self) -> Option<AdsDocument> {
        self.response.docs.into_iter().next()
    }
}

/// Accepts a string or an integer (ADS is not consistent about `year` and `volume`)
fn deserialize_text_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, integer, or null")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(TextValueVisitor).map(Some)
        }
    }

    struct TextValueVisitor;

    impl<'de> Visitor<'de> for TextValueVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_option(TextVisitor)
}

/// Single document from ADS search results
#[derive(Debug, Deserialize)]
pub(crate) struct AdsDocument {
    pub(crate) bibcode: String,
    title: Option<Vec<String>>,
    author: Option<Vec<String>>,
    pubdate: Option<String>,
    #[serde(deserialize_with = "deserialize_text_option", default)]
    year: Option<String>,
    #[serde(rename = "pub")]
    publication: Option<String>,
    #[serde(deserialize_with = "deserialize_text_option", default)]
    volume: Option<String>,
    page: Option<Vec<String>>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    identifier: Option<Vec<String>>,
}

/// ADS BibTeX export response
#[derive(Debug, Deserialize)]
pub(crate) struct ExportResponse {
    pub(crate) export: String,
}

/// Extract arXiv ID from ADS identifier array
fn extract_arxiv_id_from_identifiers(identifiers: &Option<Vec<String>>) -> Option<String> {
    identifiers
        .as_ref()?
        .iter()
        .find_map(|id| id.strip_prefix("arXiv:").map(str::to_string))
}

/// Page of a record; e-print pagination (`arXiv:2003.14327`) counts as unpublished.
fn parse_page(pages: Option<&[String]>) -> Page {
    match pages.and_then(|p| p.first()).map(|p| p.trim()) {
        None | Some("") => Page::unpublished(),
        Some(page) if page.starts_with("arXiv:") => Page::unpublished(),
        Some(page) => Page::from_stored(page),
    }
}

impl AdsDocument {
    /// Combine a search document with its BibTeX export.
    pub(crate) fn into_metadata(self, bibtex: String) -> Result<PaperMetadata, GatewayError> {
        let title = self
            .title
            .and_then(|t| t.into_iter().next())
            .unwrap_or_default();
        if title.is_empty() {
            return Err(GatewayError::NotFound(format!(
                "{} (record has no title)",
                self.bibcode
            )));
        }

        let page = parse_page(self.page.as_deref());
        let volume = if page.is_unpublished() {
            UNPUBLISHED
        } else {
            self.volume
                .as_deref()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(UNPUBLISHED)
        };
        let pubdate = self
            .pubdate
            .or_else(|| self.year.map(|y| format!("{}-00-00", y)))
            .unwrap_or_default();

        Ok(PaperMetadata {
            arxiv_id: extract_arxiv_id_from_identifiers(&self.identifier),
            bibcode: self.bibcode,
            title,
            authors: self.author.unwrap_or_default(),
            pubdate,
            journal: self.publication.unwrap_or_default(),
            volume,
            page,
            abstract_text: self.abstract_text.unwrap_or_default(),
            bibtex,
        })
    }
}
