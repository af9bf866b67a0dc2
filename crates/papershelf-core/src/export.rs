//! Citation export
//!
//! An export is each selected paper's BibTeX, opening key rewritten to its
//! citation keyword, separated by blank lines.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::library::Library;
use crate::paper::Field;

impl Library {
    /// BibTeX for the given papers, in the order given.
    pub fn export_bibtex<S: AsRef<str>>(&self, bibcodes: &[S]) -> Result<String> {
        let mut entries = Vec::with_capacity(bibcodes.len());
        for bibcode in bibcodes {
            let bibtex = self.get_attribute(bibcode.as_ref(), Field::Bibtex.name())?;
            entries.push(bibtex.to_string().trim().to_string());
        }
        let mut out = entries.join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    /// BibTeX for every paper carrying a tag.
    pub fn export_tag(&self, tag: &str) -> Result<String> {
        let bibcodes = self.papers_with_tag(tag)?;
        self.export_bibtex(&bibcodes)
    }

    /// Write an export of the given papers to `path`.
    pub fn write_export<S: AsRef<str>>(&self, path: &Path, bibcodes: &[S]) -> Result<()> {
        let text = self.export_bibtex(bibcodes)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), papers = bibcodes.len(), "wrote export");
        Ok(())
    }
}
