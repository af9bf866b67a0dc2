//! Bulk BibTeX import
//!
//! Each entry of a citation file is looked up in the catalog and added to the
//! library. The lookup tries, in order:
//!
//! 1. the `adsurl` field, which names the bibcode directly
//! 2. the `doi` field
//! 3. the `eprint` field (an arXiv id)
//! 4. the bibliographic fields themselves (needs at least a `title`)
//!
//! A strategy whose field is missing is skipped; one that fails hands over to
//! the next. Every paper touched by an import run gets a tag named after the
//! file, so the run can be found again. Entries that could not be imported
//! are written, with the reason, to a failure report in the same format.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use papershelf_bibtex::{parse_entry, CitationEntry, EntryReader, RawEntry};
use papershelf_identifiers::{bibcode_from_ads_url, extract_arxiv_id, normalize_doi};
use tracing::{debug, info, warn};

use crate::citation::last_name;
use crate::error::{LibraryError, Result};
use crate::gateway::{FieldQuery, GatewayError};
use crate::library::{Library, RESERVED_TAG_CHARS, UNREAD};
use crate::paper::{AttributeValue, Field};

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// Failure report, kept only when something failed
    pub failure_report: Option<PathBuf>,
    /// Tag applied to every imported or already present paper
    pub tag: String,
}

/// Why an entry could not be imported, in words for the user.
fn explain(error: &LibraryError) -> String {
    match error {
        LibraryError::Gateway(GatewayError::RateLimited) => {
            "the catalog's rate limit was reached; wait a while and import this entry again"
                .to_string()
        }
        LibraryError::Gateway(GatewayError::Transient(_)) => {
            "could not reach the catalog; check the network connection and try again".to_string()
        }
        other => other.to_string(),
    }
}

/// First page of a page field: `898--913` becomes `898`.
fn first_page(pages: &str) -> &str {
    pages
        .split(|c: char| c == '-' || c == '\u{2013}')
        .next()
        .unwrap_or(pages)
        .trim()
}

/// Last name of the first author in a BibTeX `author` field.
fn first_author_last_name(authors: &str) -> Option<String> {
    let first = authors.split(" and ").next()?.trim();
    if first.is_empty() {
        return None;
    }
    let last = if first.contains(',') {
        last_name(first)
    } else {
        first.split_whitespace().last().unwrap_or(first)
    };
    Some(last.to_string())
}

fn field_query(entry: &CitationEntry) -> Option<FieldQuery> {
    let title = entry.field("title")?;
    Some(FieldQuery {
        first_author: entry.field("author").and_then(first_author_last_name),
        title: title.to_string(),
        journal: entry.field("journal").map(str::to_string),
        year: entry.field("year").map(str::to_string),
        volume: entry.field("volume").map(str::to_string),
        page: entry
            .field("pages")
            .map(first_page)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    })
}

impl Library {
    /// Import a BibTeX file.
    ///
    /// The failure report is written to `failed_<file name>` in the configured
    /// report directory, or next to the file when none is configured.
    pub fn import_bibtex_file(
        &self,
        path: &Path,
        on_progress: Option<&mut dyn FnMut(usize)>,
    ) -> Result<ImportSummary> {
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let report_dir = match &self.import_config().failure_report_dir {
            Some(dir) => dir.clone(),
            None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let report_path = report_dir.join(format!("failed_{}", source_name));

        let reader = BufReader::new(File::open(path)?);
        self.import_bibtex(reader, &source_name, &report_path, on_progress)
    }

    /// Import citation entries from any reader.
    ///
    /// `on_progress` is called with each line number as the input is read.
    pub fn import_bibtex<R: BufRead>(
        &self,
        reader: R,
        source_name: &str,
        report_path: &Path,
        on_progress: Option<&mut dyn FnMut(usize)>,
    ) -> Result<ImportSummary> {
        let tag = self.create_import_tag(source_name)?;
        let mut summary = ImportSummary {
            tag: tag.clone(),
            ..ImportSummary::default()
        };

        let mut report = BufWriter::new(File::create(report_path)?);
        let run = self.import_entries(
            reader,
            source_name,
            &tag,
            &mut report,
            &mut summary,
            on_progress,
        );
        let flushed = report.flush();
        drop(report);
        if let Err(e) = run.and(flushed.map_err(LibraryError::from)) {
            warn!(source = source_name, error = %e, "import aborted");
            self.clean_up_aborted_import(&summary, report_path);
            return Err(e);
        }

        if summary.failed == 0 {
            std::fs::remove_file(report_path)?;
        } else {
            summary.failure_report = Some(report_path.to_path_buf());
        }

        info!(
            source = source_name,
            added = summary.added,
            duplicates = summary.duplicates,
            failed = summary.failed,
            tag = %summary.tag,
            "import finished"
        );
        Ok(summary)
    }

    fn import_entries<R: BufRead>(
        &self,
        reader: R,
        source_name: &str,
        tag: &str,
        report: &mut impl Write,
        summary: &mut ImportSummary,
        on_progress: Option<&mut dyn FnMut(usize)>,
    ) -> Result<()> {
        writeln!(report, "% Entries from {} that could not be imported.", source_name)?;
        writeln!(report, "% Each entry follows a comment line giving the reason.")?;
        writeln!(report)?;

        let mut entries = EntryReader::new(reader);
        if let Some(callback) = on_progress {
            entries = entries.with_progress(callback);
        }

        for raw in entries {
            let raw = raw?;
            if let Some(reason) = self.import_entry(&raw, tag, summary)? {
                debug!(line = raw.first_line, reason = %reason, "entry failed");
                summary.failed += 1;
                writeln!(report, "% {}", reason)?;
                writeln!(report, "{}", raw.text)?;
                writeln!(report)?;
            }
        }
        Ok(())
    }

    /// After an aborted run, drop a report holding only its header and a tag
    /// no paper received. Papers already added stay in the library.
    fn clean_up_aborted_import(&self, summary: &ImportSummary, report_path: &Path) {
        if summary.failed == 0 {
            if let Err(e) = std::fs::remove_file(report_path) {
                warn!(path = %report_path.display(), error = %e, "could not remove failure report");
            }
        }
        if summary.added + summary.duplicates == 0 {
            if let Err(e) = self.delete_tag(&summary.tag) {
                warn!(tag = %summary.tag, error = %e, "could not remove import tag");
            }
        }
    }

    /// Register `Import <name>`, or `Import <name> N` if that is taken.
    fn create_import_tag(&self, source_name: &str) -> Result<String> {
        let base = format!("Import {}", source_name.replace(RESERVED_TAG_CHARS, "_"));
        let mut name = base.clone();
        let mut counter = 1;
        while self.has_tag(&name)? {
            name = format!("{} {}", base, counter);
            counter += 1;
        }
        self.create_tag(&name)?;
        Ok(name)
    }

    /// Import one entry. Returns the failure reason if it could not be
    /// imported; storage and I/O errors abort the whole run.
    fn import_entry(
        &self,
        raw: &RawEntry,
        tag: &str,
        summary: &mut ImportSummary,
    ) -> Result<Option<String>> {
        let entry = match parse_entry(raw) {
            Ok(entry) => entry,
            Err(e) => return Ok(Some(format!("malformed entry, could not read it: {}", e))),
        };
        if !entry.is_record() {
            return Ok(None);
        }

        let bibcode = match self.resolve_entry(&entry) {
            Ok(bibcode) => bibcode,
            Err(reason) => return Ok(Some(reason)),
        };

        match self.add_bibcode(&bibcode) {
            Ok(()) => {
                if self.has_tag(UNREAD)? && self.membership(&bibcode, UNREAD)? {
                    self.untag_paper(&bibcode, UNREAD)?;
                }
                self.tag_paper(&bibcode, tag)?;
                if !entry.cite_key.is_empty() && entry.cite_key != bibcode {
                    self.apply_cite_key(&bibcode, &entry.cite_key)?;
                }
                summary.added += 1;
                Ok(None)
            }
            Err(LibraryError::DuplicateRecord(_)) => {
                self.tag_paper(&bibcode, tag)?;
                summary.duplicates += 1;
                Ok(None)
            }
            Err(e @ (LibraryError::Storage(_) | LibraryError::Io(_))) => Err(e),
            Err(e) => Ok(Some(explain(&e))),
        }
    }

    /// Use the entry's own cite key, keeping the default if it is taken.
    fn apply_cite_key(&self, bibcode: &str, cite_key: &str) -> Result<()> {
        let value = AttributeValue::Text(cite_key.to_string());
        match self.set_attribute(bibcode, Field::CitationKeyword.name(), value) {
            Ok(()) => Ok(()),
            Err(e @ (LibraryError::DuplicateValue { .. } | LibraryError::InvalidValue(_))) => {
                warn!(bibcode, cite_key, error = %e, "kept default citation keyword");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Run the lookup strategies in order; the error is the failure reason.
    fn resolve_entry(&self, entry: &CitationEntry) -> std::result::Result<String, String> {
        let mut last_error: Option<LibraryError> = None;

        if let Some(url) = entry.field("adsurl") {
            match bibcode_from_ads_url(url) {
                Some(bibcode) => return Ok(bibcode),
                None => debug!(url, "adsurl does not name a bibcode"),
            }
        }

        if let Some(doi) = entry.field("doi").and_then(normalize_doi) {
            match self.gateway().resolve_doi(&doi) {
                Ok(bibcode) => return Ok(bibcode),
                Err(e) => {
                    debug!(doi = %doi, error = %e, "doi lookup failed");
                    last_error = Some(e.into());
                }
            }
        }

        if let Some(arxiv_id) = entry.field("eprint").and_then(extract_arxiv_id) {
            match self.gateway().resolve_preprint(&arxiv_id) {
                Ok(bibcode) => return Ok(bibcode),
                Err(e) => {
                    debug!(arxiv_id = %arxiv_id, error = %e, "eprint lookup failed");
                    last_error = Some(e.into());
                }
            }
        }

        if let Some(query) = field_query(entry) {
            match self.gateway().resolve_fields(&query) {
                Ok(bibcode) => return Ok(bibcode),
                Err(e) => {
                    debug!(title = %query.title, error = %e, "field lookup failed");
                    last_error = Some(e.into());
                }
            }
        }

        Err(match last_error {
            Some(e) => explain(&e),
            None => "no adsurl, doi, eprint or title field to look the paper up by".to_string(),
        })
    }
}
