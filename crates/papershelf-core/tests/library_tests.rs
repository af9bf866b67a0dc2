//! Record store integration tests

mod common;

use chrono::{Duration, Utc};
use common::fixtures::*;
use papershelf_core::{
    AttributeValue, LibraryConfig, Library, LibraryError, MetadataGateway, Page, ResyncOutcome,
};
use proptest::prelude::*;
use rstest::rstest;

// === Adding papers ===

#[rstest]
#[case(BROWN_IDENTIFIERS[0])]
#[case(BROWN_IDENTIFIERS[1])]
#[case(BROWN_IDENTIFIERS[2])]
#[case(BROWN_IDENTIFIERS[3])]
#[case(BROWN_IDENTIFIERS[4])]
#[case(BROWN_IDENTIFIERS[5])]
#[case(BROWN_IDENTIFIERS[6])]
fn test_add_from_every_identifier_shape(#[case] identifier: &str) {
    let (_, library) = library();
    assert_eq!(library.add(identifier).unwrap(), BROWN_BIBCODE);

    let record = library.record(BROWN_BIBCODE).unwrap();
    assert_eq!(record.title, brown().title);
    assert_eq!(record.authors, brown().authors);
    assert_eq!(record.volume, 864);
    assert_eq!(record.page, Page::Number(94));
}

#[rstest]
#[case(BROWN_IDENTIFIERS[0])]
#[case(BROWN_IDENTIFIERS[1])]
#[case(BROWN_IDENTIFIERS[3])]
#[case(BROWN_IDENTIFIERS[6])]
fn test_add_existing_paper_is_duplicate(#[case] identifier: &str) {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    library
        .set_attribute(BROWN_BIBCODE, "user_notes", "keep me".into())
        .unwrap();
    let before = library.record(BROWN_BIBCODE).unwrap();

    let err = library.add(identifier).unwrap_err();
    assert!(matches!(err, LibraryError::DuplicateRecord(ref b) if b == BROWN_BIBCODE));
    assert_eq!(library.record(BROWN_BIBCODE).unwrap(), before);
    assert_eq!(library.count().unwrap(), 1);
}

#[test]
fn test_every_identifier_gives_same_metadata() {
    let (_, library) = library();
    let gateway = library.gateway();
    let expected = gateway.fetch_metadata(BROWN_BIBCODE).unwrap();
    for identifier in BROWN_IDENTIFIERS {
        let bibcode = gateway.resolve_identifier(identifier).unwrap();
        assert_eq!(gateway.fetch_metadata(&bibcode).unwrap(), expected);
    }
}

#[test]
fn test_repeated_lookups_hit_cache() {
    let (_, library) = library();
    let gateway = library.gateway();
    gateway.resolve_preprint(BROWN_ARXIV).unwrap();
    gateway.fetch_metadata(BROWN_BIBCODE).unwrap();
    let queries = gateway.query_count();
    assert_eq!(queries, 2);

    for _ in 0..5 {
        gateway.resolve_preprint(BROWN_ARXIV).unwrap();
        gateway.fetch_metadata(BROWN_BIBCODE).unwrap();
    }
    assert_eq!(gateway.query_count(), queries);
}

#[test]
fn test_add_unrecognized_identifier() {
    let (_, library) = library();
    assert!(matches!(
        library.add("https://www.example.com/paper"),
        Err(LibraryError::UnrecognizedIdentifier(_))
    ));
}

#[test]
fn test_new_paper_is_unread_when_tag_exists() {
    let (_, library) = library();
    library.add(TREMONTI_BIBCODE).unwrap();
    assert!(library.tags_of(TREMONTI_BIBCODE).unwrap().is_empty());

    library.create_tag("Unread").unwrap();
    library.add(BROWN_BIBCODE).unwrap();
    assert!(library.membership(BROWN_BIBCODE, "Unread").unwrap());
    assert!(!library.membership(TREMONTI_BIBCODE, "Unread").unwrap());
}

#[test]
fn test_list_keys_and_count() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    library.add(TREMONTI_BIBCODE).unwrap();
    library.add(FORBES_ARXIV).unwrap();
    assert_eq!(library.count().unwrap(), 3);
    assert_eq!(
        library.list_keys().unwrap(),
        vec![TREMONTI_BIBCODE, BROWN_BIBCODE, FORBES_BIBCODE]
    );
}

// === Attributes ===

#[test]
fn test_get_attribute_shapes() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();

    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "authors").unwrap(),
        AttributeValue::List(brown().authors)
    );
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "page").unwrap(),
        AttributeValue::Integer(94)
    );
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "volume").unwrap(),
        AttributeValue::Integer(864)
    );
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "citation_keyword").unwrap(),
        AttributeValue::Text(BROWN_BIBCODE.into())
    );
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "local_file").unwrap(),
        AttributeValue::Null
    );
    assert!(matches!(
        library.get_attribute(BROWN_BIBCODE, "update_time").unwrap(),
        AttributeValue::Timestamp(_)
    ));
}

#[test]
fn test_non_numeric_page_passes_through() {
    let (_, library) = library();
    library.add(MARKS_BIBCODE).unwrap();
    assert_eq!(
        library.get_attribute(MARKS_BIBCODE, "page").unwrap(),
        AttributeValue::Text("A8".into())
    );
}

#[test]
fn test_unpublished_sentinels() {
    let (_, library) = library();
    library.add(FORBES_BIBCODE).unwrap();
    assert_eq!(
        library.get_attribute(FORBES_BIBCODE, "page").unwrap(),
        AttributeValue::Integer(-1)
    );
    assert_eq!(
        library.get_attribute(FORBES_BIBCODE, "volume").unwrap(),
        AttributeValue::Integer(-1)
    );
}

#[test]
fn test_missing_arxiv_id_reads_as_none() {
    let (_, library) = library();
    library.add(TREMONTI_BIBCODE).unwrap();
    assert_eq!(
        library.get_attribute(TREMONTI_BIBCODE, "arxiv_id").unwrap(),
        AttributeValue::Text("none".into())
    );
}

#[test]
fn test_bibtex_uses_current_citation_keyword() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "bibtex").unwrap(),
        AttributeValue::Text(BROWN_BIBTEX.into())
    );

    library
        .set_attribute(BROWN_BIBCODE, "citation_keyword", "brown_nsc_18".into())
        .unwrap();
    let bibtex = library.get_attribute(BROWN_BIBCODE, "bibtex").unwrap();
    let expected = BROWN_BIBTEX.replacen("2018ApJ...864...94B,", "brown_nsc_18,", 1);
    assert_eq!(bibtex, AttributeValue::Text(expected));
    // adsurl still names the real bibcode
    assert!(bibtex.to_string().contains("abs/2018ApJ...864...94B"));
}

#[rstest]
#[case("nonsense")]
#[case("Title")]
#[case("favorites")]
fn test_unknown_attribute(#[case] name: &str) {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    assert!(matches!(
        library.get_attribute(BROWN_BIBCODE, name),
        Err(LibraryError::UnknownAttribute(_))
    ));
    assert!(matches!(
        library.set_attribute(BROWN_BIBCODE, name, "x".into()),
        Err(LibraryError::UnknownAttribute(_))
    ));
}

#[test]
fn test_missing_record() {
    let (_, library) = library();
    library.create_tag("Favorites").unwrap();
    assert!(matches!(
        library.get_attribute(BROWN_BIBCODE, "title"),
        Err(LibraryError::RecordNotFound(_))
    ));
    assert!(matches!(
        library.get_attribute(BROWN_BIBCODE, "Favorites"),
        Err(LibraryError::RecordNotFound(_))
    ));
    assert!(matches!(
        library.set_attribute(BROWN_BIBCODE, "title", "x".into()),
        Err(LibraryError::RecordNotFound(_))
    ));
}

#[test]
fn test_set_and_get_text_attributes() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    library
        .set_attribute(BROWN_BIBCODE, "user_notes", "Compare with M54".into())
        .unwrap();
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "user_notes").unwrap(),
        AttributeValue::Text("Compare with M54".into())
    );
    library
        .set_attribute(BROWN_BIBCODE, "user_notes", AttributeValue::Null)
        .unwrap();
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "user_notes").unwrap(),
        AttributeValue::Null
    );

    library
        .set_attribute(BROWN_BIBCODE, "page", AttributeValue::Text("L12".into()))
        .unwrap();
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "page").unwrap(),
        AttributeValue::Text("L12".into())
    );
}

#[test]
fn test_tag_as_attribute() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    library.create_tag("Favorites").unwrap();

    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "Favorites").unwrap(),
        AttributeValue::Bool(false)
    );
    library
        .set_attribute(BROWN_BIBCODE, "Favorites", true.into())
        .unwrap();
    assert_eq!(
        library.get_attribute(BROWN_BIBCODE, "favorites").unwrap(),
        AttributeValue::Bool(true)
    );
    assert!(matches!(
        library.set_attribute(BROWN_BIBCODE, "Favorites", "yes".into()),
        Err(LibraryError::InvalidValue(_))
    ));
}

#[test]
fn test_local_file_must_exist() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("brown2018.pdf");
    assert!(matches!(
        library.set_attribute(
            BROWN_BIBCODE,
            "local_file",
            pdf.to_string_lossy().into_owned().into()
        ),
        Err(LibraryError::InvalidValue(_))
    ));

    std::fs::write(&pdf, b"%PDF-1.4").unwrap();
    library
        .set_attribute(
            BROWN_BIBCODE,
            "local_file",
            pdf.to_string_lossy().into_owned().into(),
        )
        .unwrap();
    assert_eq!(
        library.record(BROWN_BIBCODE).unwrap().local_file,
        Some(pdf.clone())
    );
}

#[rstest]
#[case("")]
#[case("two words")]
#[case("tab\there")]
fn test_invalid_citation_keyword(#[case] keyword: &str) {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    assert!(matches!(
        library.set_attribute(BROWN_BIBCODE, "citation_keyword", keyword.into()),
        Err(LibraryError::InvalidValue(_))
    ));
}

#[test]
fn test_citation_keyword_uniqueness() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    library.add(TREMONTI_BIBCODE).unwrap();
    library
        .set_attribute(BROWN_BIBCODE, "citation_keyword", "nsc".into())
        .unwrap();

    let err = library
        .set_attribute(TREMONTI_BIBCODE, "citation_keyword", "nsc".into())
        .unwrap_err();
    assert!(matches!(
        err,
        LibraryError::DuplicateValue { ref attribute, ref value }
            if attribute == "citation_keyword" && value == "nsc"
    ));
    assert_eq!(library.record(BROWN_BIBCODE).unwrap().citation_keyword, "nsc");
    assert_eq!(
        library.record(TREMONTI_BIBCODE).unwrap().citation_keyword,
        TREMONTI_BIBCODE
    );
}

#[test]
fn test_bibcode_uniqueness_and_rename() {
    let (_, library) = library();
    library.add(BROWN_BIBCODE).unwrap();
    library.add(TREMONTI_BIBCODE).unwrap();
    assert!(matches!(
        library.set_attribute(TREMONTI_BIBCODE, "bibcode", BROWN_BIBCODE.into()),
        Err(LibraryError::DuplicateValue { .. })
    ));

    library.create_tag("Metallicity").unwrap();
    library.tag_paper(TREMONTI_BIBCODE, "Metallicity").unwrap();
    library
        .set_attribute(TREMONTI_BIBCODE, "bibcode", "2004ApJ...613..898X".into())
        .unwrap();
    assert!(!library.contains(TREMONTI_BIBCODE).unwrap());
    assert!(library
        .membership("2004ApJ...613..898X", "Metallicity")
        .unwrap());
}

proptest! {
    #[test]
    fn prop_authors_round_trip(
        authors in prop::collection::vec("[A-Za-z][A-Za-z ,.'-]{0,30}", 0..15)
    ) {
        let (_, library) = library();
        library.add(BROWN_BIBCODE).unwrap();
        library
            .set_attribute(BROWN_BIBCODE, "authors", AttributeValue::List(authors.clone()))
            .unwrap();
        prop_assert_eq!(
            library.get_attribute(BROWN_BIBCODE, "authors").unwrap(),
            AttributeValue::List(authors)
        );
    }
}

// === Re-sync ===

const FORBES_PUBLISHED: &str = "2020ApJ...900...12F";

/// Forbes et al. as it reads once the journal version is out.
fn publish_forbes(catalog: &papershelf_core::StaticCatalog) {
    catalog.remove(FORBES_BIBCODE);
    let mut published = forbes();
    published.bibcode = FORBES_PUBLISHED.into();
    published.journal = "The Astrophysical Journal".into();
    published.volume = 900;
    published.page = Page::Number(12);
    published.bibtex = FORBES_BIBTEX.replace(FORBES_BIBCODE, FORBES_PUBLISHED);
    catalog.insert(published);
}

#[test]
fn test_resync_unchanged_only_touches() {
    let (_, library) = library();
    library.add(FORBES_BIBCODE).unwrap();
    let old = Utc::now() - Duration::days(3);
    library
        .set_attribute(FORBES_BIBCODE, "update_time", AttributeValue::Timestamp(old))
        .unwrap();

    assert_eq!(library.resync(FORBES_BIBCODE).unwrap(), ResyncOutcome::Touched);
    let record = library.record(FORBES_BIBCODE).unwrap();
    assert!(record.update_time > old);
    assert!(record.is_unpublished());
}

#[test]
fn test_resync_without_arxiv_id_only_touches() {
    let (_, library) = library();
    library.add(TREMONTI_BIBCODE).unwrap();
    let queries = library.gateway().query_count();
    assert_eq!(
        library.resync(TREMONTI_BIBCODE).unwrap(),
        ResyncOutcome::Touched
    );
    assert_eq!(library.gateway().query_count(), queries);
}

#[test]
fn test_resync_rekey_carries_user_state() {
    let (catalog, library) = library();
    library.add(FORBES_ARXIV).unwrap();
    library.create_tag("Statistics").unwrap();
    library.create_tag("Favorites").unwrap();
    library.tag_paper(FORBES_BIBCODE, "Statistics").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("forbes.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();
    library
        .set_attribute(
            FORBES_BIBCODE,
            "local_file",
            pdf.to_string_lossy().into_owned().into(),
        )
        .unwrap();
    library
        .set_attribute(FORBES_BIBCODE, "user_notes", "log densities".into())
        .unwrap();
    library
        .set_attribute(FORBES_BIBCODE, "citation_keyword", "forbes_psa".into())
        .unwrap();

    publish_forbes(&catalog);
    assert_eq!(
        library.resync(FORBES_BIBCODE).unwrap(),
        ResyncOutcome::Rekeyed {
            old: FORBES_BIBCODE.into(),
            new: FORBES_PUBLISHED.into()
        }
    );

    assert!(!library.contains(FORBES_BIBCODE).unwrap());
    let record = library.record(FORBES_PUBLISHED).unwrap();
    assert_eq!(record.citation_keyword, "forbes_psa");
    assert_eq!(record.user_notes.as_deref(), Some("log densities"));
    assert_eq!(record.local_file, Some(pdf));
    assert_eq!(record.tags, vec!["Statistics"]);
    assert_eq!(record.volume, 900);
    assert!(!record.is_unpublished());
}

#[test]
fn test_resync_rekey_regenerates_default_keyword() {
    let (catalog, library) = library();
    library.add(FORBES_BIBCODE).unwrap();
    publish_forbes(&catalog);
    library.resync(FORBES_BIBCODE).unwrap();
    assert_eq!(
        library.record(FORBES_PUBLISHED).unwrap().citation_keyword,
        FORBES_PUBLISHED
    );
}

#[test]
fn test_resync_onto_existing_paper_changes_nothing() {
    let (catalog, library) = library();
    library.add(FORBES_BIBCODE).unwrap();
    publish_forbes(&catalog);
    library.add(FORBES_PUBLISHED).unwrap();
    library
        .set_attribute(FORBES_BIBCODE, "user_notes", "preprint copy".into())
        .unwrap();

    assert!(matches!(
        library.resync(FORBES_BIBCODE),
        Err(LibraryError::DuplicateRecord(ref b)) if b == FORBES_PUBLISHED
    ));
    assert_eq!(
        library.record(FORBES_BIBCODE).unwrap().user_notes.as_deref(),
        Some("preprint copy")
    );
    assert_eq!(library.count().unwrap(), 2);
}

#[test]
fn test_resync_failure_leaves_paper_alone() {
    let (catalog, library) = library();
    library.add(FORBES_BIBCODE).unwrap();
    let before = library.record(FORBES_BIBCODE).unwrap();

    catalog.set_outage(Some(papershelf_core::GatewayError::Transient(
        "connection reset".into(),
    )));
    assert!(matches!(
        library.resync(FORBES_BIBCODE),
        Err(LibraryError::Gateway(_))
    ));
    assert_eq!(library.record(FORBES_BIBCODE).unwrap(), before);
}

#[test]
fn test_refresh_stale_respects_threshold() {
    let (catalog, library) = library();
    library.add(FORBES_BIBCODE).unwrap();
    library.add(BROWN_BIBCODE).unwrap();
    publish_forbes(&catalog);

    // Synced just now: not stale yet
    let report = library.refresh_stale().unwrap();
    assert_eq!(report.checked, 0);

    let old = Utc::now() - Duration::hours(25);
    library
        .set_attribute(FORBES_BIBCODE, "update_time", AttributeValue::Timestamp(old))
        .unwrap();
    library
        .set_attribute(BROWN_BIBCODE, "update_time", AttributeValue::Timestamp(old))
        .unwrap();

    let report = library.refresh_stale().unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(
        report.rekeyed,
        vec![(FORBES_BIBCODE.to_string(), FORBES_PUBLISHED.to_string())]
    );
    assert!(report.failed.is_empty());
}

// === Persistence ===

#[test]
fn test_reopen_keeps_papers_and_tags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelf").join("library.db");
    let config = LibraryConfig::default();
    let catalog = catalog();

    {
        let library =
            Library::open(&path, MetadataGateway::new(catalog.clone()), &config).unwrap();
        library.add(BROWN_BIBCODE).unwrap();
        library.create_tag("Clusters").unwrap();
        library.tag_paper(BROWN_BIBCODE, "Clusters").unwrap();
    }

    let library = Library::open(&path, MetadataGateway::new(catalog), &config).unwrap();
    assert_eq!(library.list_keys().unwrap(), vec![BROWN_BIBCODE]);
    assert_eq!(library.tags_of(BROWN_BIBCODE).unwrap(), vec!["Clusters"]);
}

#[test]
fn test_open_resyncs_stale_preprints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");
    let catalog = catalog();
    let mut config = LibraryConfig::default();

    {
        config.sync.resync_on_open = false;
        let library =
            Library::open(&path, MetadataGateway::new(catalog.clone()), &config).unwrap();
        library.add(FORBES_BIBCODE).unwrap();
        library
            .set_attribute(
                FORBES_BIBCODE,
                "update_time",
                AttributeValue::Timestamp(Utc::now() - Duration::days(2)),
            )
            .unwrap();
    }

    publish_forbes(&catalog);
    config.sync.resync_on_open = true;
    let library = Library::open(&path, MetadataGateway::new(catalog), &config).unwrap();
    assert_eq!(library.list_keys().unwrap(), vec![FORBES_PUBLISHED]);
}

#[test]
fn test_open_survives_failed_resync() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");
    let catalog = catalog();
    let mut config = LibraryConfig::default();
    config.sync.resync_on_open = false;

    {
        let library =
            Library::open(&path, MetadataGateway::new(catalog.clone()), &config).unwrap();
        library.add(FORBES_BIBCODE).unwrap();
        library
            .set_attribute(
                FORBES_BIBCODE,
                "update_time",
                AttributeValue::Timestamp(Utc::now() - Duration::days(2)),
            )
            .unwrap();
    }

    catalog.set_outage(Some(papershelf_core::GatewayError::RateLimited));
    config.sync.resync_on_open = true;
    let library = Library::open(&path, MetadataGateway::new(catalog), &config).unwrap();
    assert_eq!(library.list_keys().unwrap(), vec![FORBES_BIBCODE]);
}
