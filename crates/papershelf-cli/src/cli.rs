//! Command line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Keep track of astronomy papers by their ADS bibcode.
#[derive(Debug, Parser)]
#[command(name = "papershelf", version, about)]
pub struct Cli {
    /// Configuration file (default: the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Library database, overriding the configured one
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add papers by arXiv id, arXiv URL, ADS URL, or bibcode
    Add {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// List papers, optionally only those with a tag
    List {
        #[arg(long, short = 't')]
        tag: Option<String>,
    },

    /// Show everything stored about a paper
    Show { bibcode: String },

    /// Print one attribute of a paper
    Get { bibcode: String, attribute: String },

    /// Change one attribute of a paper
    Set(SetArgs),

    /// Remove a paper from the library
    Delete { bibcode: String },

    /// Print the short citation string of a paper
    Cite {
        bibcode: String,

        /// Print the filename-safe form instead
        #[arg(long)]
        filename: bool,
    },

    /// Re-sync a paper with the catalog, or every stale preprint
    Resync { bibcode: Option<String> },

    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Import every entry of a BibTeX file
    Import { file: PathBuf },

    /// Write BibTeX for some papers (default: all of them) to a file
    Export(ExportArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub bibcode: String,

    /// Attribute or tag name
    pub attribute: String,

    /// New value; `authors` takes a `;`-separated list, tags take true/false,
    /// `update_time` takes an RFC 3339 timestamp
    #[arg(required_unless_present = "clear")]
    pub value: Option<String>,

    /// Clear `local_file` or `user_notes`
    #[arg(long, conflicts_with = "value")]
    pub clear: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file
    pub output: PathBuf,

    /// Export the papers with this tag
    #[arg(long, short = 't', conflicts_with = "bibcodes")]
    pub tag: Option<String>,

    /// Papers to export
    pub bibcodes: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum TagCommand {
    /// Create a tag
    Create { name: String },
    /// Delete a tag; papers keep their other tags
    Delete { name: String },
    /// Rename a tag, keeping its papers
    Rename { old: String, new: String },
    /// Tag papers
    Add {
        name: String,
        #[arg(required = true)]
        bibcodes: Vec<String>,
    },
    /// Untag papers
    Remove {
        name: String,
        #[arg(required = true)]
        bibcodes: Vec<String>,
    },
    /// List all tags, or the tags of one paper
    List { bibcode: Option<String> },
}
