//! ADS search syntax for catalog lookups

use papershelf_core::{CatalogQuery, FieldQuery};

/// Strip BibTeX grouping and quotes so the text can sit inside a phrase.
fn phrase(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '"' | '\\'))
        .collect();
    format!("\"{}\"", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn is_plain_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn fields_query(fields: &FieldQuery) -> String {
    let mut terms = Vec::new();
    if let Some(author) = fields.first_author.as_deref().map(str::trim) {
        if !author.is_empty() {
            terms.push(format!("author:\"^{}\"", author));
        }
    }
    terms.push(format!("title:{}", phrase(&fields.title)));
    if let Some(year) = fields.year.as_deref().map(str::trim) {
        if is_plain_number(year) {
            terms.push(format!("year:{}", year));
        }
    }
    // Journal macros like \apj mean nothing to the search engine
    if let Some(journal) = fields.journal.as_deref().map(str::trim) {
        if !journal.is_empty() && !journal.starts_with('\\') {
            terms.push(format!("pub:{}", phrase(journal)));
        }
    }
    if let Some(volume) = fields.volume.as_deref().map(str::trim) {
        if is_plain_number(volume) {
            terms.push(format!("volume:{}", volume));
        }
    }
    if let Some(page) = fields.page.as_deref().map(str::trim) {
        if !page.is_empty() {
            terms.push(format!("page:{}", page));
        }
    }
    terms.join(" ")
}

/// The `q` parameter for a catalog lookup.
pub fn catalog_query_string(query: &CatalogQuery) -> String {
    match query {
        CatalogQuery::Preprint(arxiv_id) => format!("arXiv:{}", arxiv_id),
        CatalogQuery::Doi(doi) => format!("doi:\"{}\"", doi),
        CatalogQuery::Fields(fields) => fields_query(fields),
    }
}

pub(crate) fn bibcode_query(bibcode: &str) -> String {
    format!("bibcode:\"{}\"", bibcode)
}
