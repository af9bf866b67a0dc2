//! Command execution

use std::error::Error;
use std::path::Path;

use chrono::{DateTime, Utc};
use papershelf_ads::AdsClient;
use papershelf_core::{
    AttributeValue, Field, Library, LibraryConfig, LibraryError, MetadataGateway, ResyncOutcome,
    StaticCatalog,
};
use papershelf_identifiers::ads_abstract_url;
use tracing::warn;

use crate::cli::{Commands, ExportArgs, SetArgs, TagCommand};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Gateway over ADS, or over an unreachable catalog when ADS is not set up,
/// so that purely local commands keep working.
pub fn build_gateway(config: &LibraryConfig) -> MetadataGateway {
    match AdsClient::from_config(&config.ads) {
        Ok(client) => MetadataGateway::new(client),
        Err(e) => {
            warn!(error = %e, "ADS is not available, catalog lookups will fail");
            let offline = StaticCatalog::new();
            offline.set_outage(Some(e));
            MetadataGateway::new(offline)
        }
    }
}

/// Turn command line text into a value of the shape `attribute` takes.
pub fn parse_value(
    attribute: &str,
    raw: Option<&str>,
    clear: bool,
) -> Result<AttributeValue, String> {
    if clear {
        return Ok(AttributeValue::Null);
    }
    let raw = raw.ok_or_else(|| format!("{} needs a value", attribute))?;
    let value = match Field::from_name(attribute) {
        Some(Field::Volume) => AttributeValue::Integer(
            raw.trim()
                .parse()
                .map_err(|_| format!("volume must be a whole number, not '{}'", raw))?,
        ),
        Some(Field::Page) => match raw.trim().parse::<i64>() {
            Ok(number) => AttributeValue::Integer(number),
            Err(_) => AttributeValue::Text(raw.to_string()),
        },
        Some(Field::Authors) => AttributeValue::List(
            raw.split(';')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Some(Field::UpdateTime) => {
            let time = DateTime::parse_from_rfc3339(raw.trim())
                .map_err(|e| format!("update_time must be an RFC 3339 timestamp: {}", e))?;
            AttributeValue::Timestamp(time.with_timezone(&Utc))
        }
        Some(_) => AttributeValue::Text(raw.to_string()),
        // Anything else is a tag
        None => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => AttributeValue::Bool(true),
            "false" | "no" | "0" => AttributeValue::Bool(false),
            _ => return Err(format!("tag '{}' takes true or false, not '{}'", attribute, raw)),
        },
    };
    Ok(value)
}

pub fn run(command: Commands, library: &Library, config: &LibraryConfig) -> CliResult {
    match command {
        Commands::Add { identifiers } => add(library, &identifiers),
        Commands::List { tag } => {
            let keys = match tag {
                Some(tag) => library.papers_with_tag(&tag)?,
                None => library.list_keys()?,
            };
            for bibcode in keys {
                println!("{}  {}", bibcode, library.citation_string(&bibcode)?);
            }
            Ok(())
        }
        Commands::Show { bibcode } => show(library, &bibcode),
        Commands::Get { bibcode, attribute } => {
            println!("{}", library.get_attribute(&bibcode, &attribute)?);
            Ok(())
        }
        Commands::Set(args) => set(library, args),
        Commands::Delete { bibcode } => {
            library.delete(&bibcode)?;
            println!("deleted {}", bibcode);
            Ok(())
        }
        Commands::Cite { bibcode, filename } => {
            let text = if filename {
                library.citation_filename(&bibcode)?
            } else {
                library.citation_string(&bibcode)?
            };
            println!("{}", text);
            Ok(())
        }
        Commands::Resync { bibcode } => resync(library, bibcode.as_deref()),
        Commands::Tag(command) => tag(library, command),
        Commands::Import { file } => import(library, &file),
        Commands::Export(args) => export(library, args),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn add(library: &Library, identifiers: &[String]) -> CliResult {
    let mut failures = 0;
    for identifier in identifiers {
        match library.add(identifier) {
            Ok(bibcode) => println!("added {}", bibcode),
            Err(LibraryError::DuplicateRecord(bibcode)) => {
                println!("{} is already in the library", bibcode)
            }
            Err(e) => {
                eprintln!("{}: {}", identifier, e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(format!("{} of {} papers could not be added", failures, identifiers.len()).into());
    }
    Ok(())
}

fn show(library: &Library, bibcode: &str) -> CliResult {
    let record = library.record(bibcode)?;
    println!("{}", library.citation_string(bibcode)?);
    println!();
    println!("bibcode:          {}", record.bibcode);
    println!("title:            {}", record.title);
    println!("authors:          {}", record.authors.join("; "));
    println!("pubdate:          {}", record.pubdate);
    println!("journal:          {}", record.journal);
    if record.is_unpublished() {
        println!("status:           unpublished");
    } else {
        println!("volume/page:      {}/{}", record.volume, record.page);
    }
    println!("arxiv_id:         {}", record.arxiv_id.as_deref().unwrap_or("none"));
    println!("citation_keyword: {}", record.citation_keyword);
    println!("update_time:      {}", record.update_time.to_rfc3339());
    if let Some(path) = &record.local_file {
        println!("local_file:       {}", path.display());
    }
    if let Some(notes) = &record.user_notes {
        println!("user_notes:       {}", notes);
    }
    println!("tags:             {}", record.tags.join(", "));
    println!("url:              {}", ads_abstract_url(&record.bibcode));
    if !record.abstract_text.is_empty() {
        println!();
        println!("{}", record.abstract_text);
    }
    Ok(())
}

fn set(library: &Library, args: SetArgs) -> CliResult {
    let value = parse_value(&args.attribute, args.value.as_deref(), args.clear)?;
    library.set_attribute(&args.bibcode, &args.attribute, value)?;
    Ok(())
}

fn resync(library: &Library, bibcode: Option<&str>) -> CliResult {
    match bibcode {
        Some(bibcode) => match library.resync(bibcode)? {
            ResyncOutcome::Touched => println!("{} is up to date", bibcode),
            ResyncOutcome::Rekeyed { old, new } => println!("{} is now {}", old, new),
        },
        None => {
            let report = library.refresh_stale()?;
            for (old, new) in &report.rekeyed {
                println!("{} is now {}", old, new);
            }
            for (bibcode, reason) in &report.failed {
                eprintln!("{}: {}", bibcode, reason);
            }
            println!(
                "checked {} unpublished papers: {} unchanged, {} moved, {} failed",
                report.checked,
                report.touched,
                report.rekeyed.len(),
                report.failed.len()
            );
        }
    }
    Ok(())
}

fn tag(library: &Library, command: TagCommand) -> CliResult {
    match command {
        TagCommand::Create { name } => library.create_tag(&name)?,
        TagCommand::Delete { name } => library.delete_tag(&name)?,
        TagCommand::Rename { old, new } => library.rename_tag(&old, &new)?,
        TagCommand::Add { name, bibcodes } => {
            for bibcode in &bibcodes {
                library.tag_paper(bibcode, &name)?;
            }
        }
        TagCommand::Remove { name, bibcodes } => {
            for bibcode in &bibcodes {
                library.untag_paper(bibcode, &name)?;
            }
        }
        TagCommand::List { bibcode } => {
            let tags = match bibcode {
                Some(bibcode) => library.tags_of(&bibcode)?,
                None => library.all_tags()?,
            };
            for tag in tags {
                println!("{}", tag);
            }
        }
    }
    Ok(())
}

fn import(library: &Library, file: &Path) -> CliResult {
    let mut report_progress = |line: usize| {
        if line % 500 == 0 {
            eprint!("\rread {} lines", line);
        }
    };
    let summary = library.import_bibtex_file(file, Some(&mut report_progress))?;
    eprintln!();
    println!(
        "{} added, {} already present, {} failed; tagged '{}'",
        summary.added, summary.duplicates, summary.failed, summary.tag
    );
    if let Some(report) = summary.failure_report {
        println!("entries that failed are in {}", report.display());
    }
    Ok(())
}

fn export(library: &Library, args: ExportArgs) -> CliResult {
    let bibcodes = match (&args.tag, args.bibcodes.is_empty()) {
        (Some(tag), _) => library.papers_with_tag(tag)?,
        (None, true) => library.list_keys()?,
        (None, false) => args.bibcodes,
    };
    library.write_export(&args.output, &bibcodes)?;
    println!("wrote {} entries to {}", bibcodes.len(), args.output.display());
    Ok(())
}
