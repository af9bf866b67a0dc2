//! In-memory catalog
//!
//! Holds a fixed set of papers and answers lookups from them. Clones share the
//! same contents, so a catalog can be changed after it has been handed to a
//! [`MetadataGateway`](super::MetadataGateway).

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::{CatalogClient, CatalogQuery, FieldQuery, GatewayError};
use crate::paper::PaperMetadata;

#[derive(Default)]
struct Inner {
    papers: BTreeMap<String, PaperMetadata>,
    // lowercased DOI -> bibcode
    dois: HashMap<String, String>,
    outage: Option<GatewayError>,
}

/// A [`CatalogClient`] serving papers from memory.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    inner: Rc<RefCell<Inner>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a paper.
    pub fn insert(&self, paper: PaperMetadata) {
        self.inner
            .borrow_mut()
            .papers
            .insert(paper.bibcode.clone(), paper);
    }

    /// Make a DOI resolve to a bibcode.
    pub fn insert_doi(&self, doi: &str, bibcode: &str) {
        self.inner
            .borrow_mut()
            .dois
            .insert(doi.to_lowercase(), bibcode.to_string());
    }

    pub fn remove(&self, bibcode: &str) -> Option<PaperMetadata> {
        self.inner.borrow_mut().papers.remove(bibcode)
    }

    /// While set, every request fails with `error`.
    pub fn set_outage(&self, error: Option<GatewayError>) {
        self.inner.borrow_mut().outage = error;
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_outage(&self) -> Result<(), GatewayError> {
        match &self.inner.borrow().outage {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn matches_fields(paper: &PaperMetadata, query: &FieldQuery) -> bool {
    if !paper.title.eq_ignore_ascii_case(query.title.trim()) {
        return false;
    }
    if let Some(year) = &query.year {
        if !paper.pubdate.starts_with(year.as_str()) {
            return false;
        }
    }
    if let Some(last_name) = &query.first_author {
        let first = paper.authors.first().map(String::as_str).unwrap_or("");
        let paper_last = first.split(',').next().unwrap_or("").trim();
        if !paper_last.eq_ignore_ascii_case(last_name.trim()) {
            return false;
        }
    }
    if let Some(volume) = &query.volume {
        if volume.trim().parse::<i64>().ok() != Some(paper.volume) {
            return false;
        }
    }
    true
}

impl CatalogClient for StaticCatalog {
    fn fetch(&self, bibcode: &str) -> Result<PaperMetadata, GatewayError> {
        self.check_outage()?;
        self.inner
            .borrow()
            .papers
            .get(bibcode)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(bibcode.to_string()))
    }

    fn search(&self, query: &CatalogQuery) -> Result<String, GatewayError> {
        self.check_outage()?;
        let inner = self.inner.borrow();
        let found = match query {
            CatalogQuery::Preprint(arxiv_id) => inner
                .papers
                .values()
                .find(|paper| paper.arxiv_id.as_deref() == Some(arxiv_id.as_str()))
                .map(|paper| paper.bibcode.clone()),
            CatalogQuery::Doi(doi) => inner.dois.get(&doi.to_lowercase()).cloned(),
            CatalogQuery::Fields(fields) => inner
                .papers
                .values()
                .find(|paper| matches_fields(paper, fields))
                .map(|paper| paper.bibcode.clone()),
        };
        found.ok_or_else(|| {
            let what = match query {
                CatalogQuery::Preprint(id) => format!("arXiv:{}", id),
                CatalogQuery::Doi(doi) => format!("doi:{}", doi),
                CatalogQuery::Fields(fields) => format!("title:\"{}\"", fields.title),
            };
            GatewayError::NotFound(what)
        })
    }
}
