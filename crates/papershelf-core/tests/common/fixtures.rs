//! Fixture papers and library construction

#![allow(dead_code)]

use papershelf_core::{Library, MetadataGateway, Page, PaperMetadata, StaticCatalog};

pub const BROWN_BIBCODE: &str = "2018ApJ...864...94B";
pub const BROWN_ARXIV: &str = "1804.09819";
pub const BROWN_DOI: &str = "10.3847/1538-4357/aad595";

pub const TREMONTI_BIBCODE: &str = "2004ApJ...613..898T";
pub const TREMONTI_DOI: &str = "10.1086/423264";

pub const FORBES_BIBCODE: &str = "2020arXiv200314327F";
pub const FORBES_ARXIV: &str = "2003.14327";

pub const BBFH_BIBCODE: &str = "1957RvMP...29..547B";

pub const MARKS_BIBCODE: &str = "2012A&A...543A...8M";

/// Every way of naming the Brown et al. paper.
pub const BROWN_IDENTIFIERS: [&str; 7] = [
    "https://ui.adsabs.harvard.edu/abs/2018ApJ...864...94B/abstract",
    "https://arxiv.org/abs/1804.09819",
    "https://arxiv.org/abs/1804.09819v2",
    "https://arxiv.org/pdf/1804.09819.pdf",
    "https://arxiv.org/pdf/1804.09819v2.pdf",
    "1804.09819",
    "2018ApJ...864...94B",
];

pub const BROWN_BIBTEX: &str = r#"@ARTICLE{2018ApJ...864...94B,
       author = {{Brown}, Gillen and {Gnedin}, Oleg Y. and {Li}, Hui},
        title = "{Nuclear Star Clusters in Cosmological Simulations}",
      journal = {\apj},
     keywords = {galaxies: formation, galaxies: nuclei, galaxies: star clusters: general, globular clusters: general, Astrophysics - Astrophysics of Galaxies, Astrophysics - Solar and Stellar Astrophysics},
         year = 2018,
        month = sep,
       volume = {864},
       number = {1},
          eid = {94},
        pages = {94},
          doi = {10.3847/1538-4357/aad595},
archivePrefix = {arXiv},
       eprint = {1804.09819},
 primaryClass = {astro-ph.GA},
       adsurl = {https://ui.adsabs.harvard.edu/abs/2018ApJ...864...94B},
      adsnote = {Provided by the SAO/NASA Astrophysics Data System}
}

"#;

pub const TREMONTI_BIBTEX: &str = r#"@ARTICLE{2004ApJ...613..898T,
       author = {{Tremonti}, Christy A. and {Heckman}, Timothy M. and {Kauffmann}, Guinevere and {Brinchmann}, Jarle and {Charlot}, St{\'e}phane and {White}, Simon D.~M. and {Seibert}, Mark and {Peng}, Eric W. and {Schlegel}, David J. and {Uomoto}, Alan and {Fukugita}, Masataka and {Brinkmann}, Jon},
        title = "{The Origin of the Mass-Metallicity Relation: Insights from 53,000 Star-forming Galaxies in the Sloan Digital Sky Survey}",
      journal = {\apj},
     keywords = {Galaxies: Abundances, Galaxies: Evolution, Galaxies: Fundamental Parameters, Galaxies: Statistics, Astrophysics},
         year = 2004,
        month = oct,
       volume = {613},
       number = {2},
        pages = {898-913},
          doi = {10.1086/423264},
archivePrefix = {arXiv},
       eprint = {astro-ph/0405537},
 primaryClass = {astro-ph},
       adsurl = {https://ui.adsabs.harvard.edu/abs/2004ApJ...613..898T},
      adsnote = {Provided by the SAO/NASA Astrophysics Data System}
}

"#;

pub const FORBES_BIBTEX: &str = r#"@ARTICLE{2020arXiv200314327F,
       author = {{Forbes}, John C.},
        title = "{A PDF PSA, or Never gonna set\_xscale again -- guilty feats with logarithms}",
      journal = {arXiv e-prints},
     keywords = {Astrophysics - Cosmology and Nongalactic Astrophysics, Astrophysics - Instrumentation and Methods for Astrophysics},
         year = 2020,
        month = mar,
          eid = {arXiv:2003.14327},
        pages = {arXiv:2003.14327},
archivePrefix = {arXiv},
       eprint = {2003.14327},
 primaryClass = {astro-ph.CO},
       adsurl = {https://ui.adsabs.harvard.edu/abs/2020arXiv200314327F},
      adsnote = {Provided by the SAO/NASA Astrophysics Data System}
}

"#;

pub fn brown() -> PaperMetadata {
    PaperMetadata {
        bibcode: BROWN_BIBCODE.into(),
        title: "Nuclear Star Clusters in Cosmological Simulations".into(),
        authors: vec![
            "Brown, Gillen".into(),
            "Gnedin, Oleg Y.".into(),
            "Li, Hui".into(),
        ],
        pubdate: "2018-09-00".into(),
        journal: "The Astrophysical Journal".into(),
        volume: 864,
        page: Page::Number(94),
        abstract_text: "We investigate the possible connection between the most massive \
            globular clusters, such as ω Cen and M54, and nuclear star clusters (NSCs) of \
            dwarf galaxies that exhibit similar spreads in age and metallicity."
            .into(),
        bibtex: BROWN_BIBTEX.into(),
        arxiv_id: Some(BROWN_ARXIV.into()),
    }
}

pub fn tremonti() -> PaperMetadata {
    PaperMetadata {
        bibcode: TREMONTI_BIBCODE.into(),
        title: "The Origin of the Mass-Metallicity Relation: Insights from 53,000 \
            Star-forming Galaxies in the Sloan Digital Sky Survey"
            .into(),
        authors: [
            "Tremonti, Christy A.",
            "Heckman, Timothy M.",
            "Kauffmann, Guinevere",
            "Brinchmann, Jarle",
            "Charlot, Stéphane",
            "White, Simon D. M.",
            "Seibert, Mark",
            "Peng, Eric W.",
            "Schlegel, David J.",
            "Uomoto, Alan",
            "Fukugita, Masataka",
            "Brinkmann, Jon",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        pubdate: "2004-10-00".into(),
        journal: "The Astrophysical Journal".into(),
        volume: 613,
        page: Page::Number(898),
        abstract_text: "We utilize Sloan Digital Sky Survey imaging and spectroscopy of \
            ~53,000 star-forming galaxies at z~0.1 to study the relation between stellar \
            mass and gas-phase metallicity."
            .into(),
        bibtex: TREMONTI_BIBTEX.into(),
        arxiv_id: None,
    }
}

pub fn forbes() -> PaperMetadata {
    PaperMetadata {
        bibcode: FORBES_BIBCODE.into(),
        title: "A PDF PSA, or Never gonna set_xscale again -- guilty feats with logarithms"
            .into(),
        authors: vec!["Forbes, John C.".into()],
        pubdate: "2020-03-00".into(),
        journal: "arXiv e-prints".into(),
        volume: -1,
        page: Page::unpublished(),
        abstract_text: "In the course of doing astronomy, one often encounters plots of \
            densities, for example probability densities, flux densities, and mass functions."
            .into(),
        bibtex: FORBES_BIBTEX.into(),
        arxiv_id: Some(FORBES_ARXIV.into()),
    }
}

pub fn bbfh() -> PaperMetadata {
    PaperMetadata {
        bibcode: BBFH_BIBCODE.into(),
        title: "Synthesis of the Elements in Stars".into(),
        authors: vec![
            "Burbidge, E. Margaret".into(),
            "Burbidge, G. R.".into(),
            "Fowler, William A.".into(),
            "Hoyle, F.".into(),
        ],
        pubdate: "1957-00-00".into(),
        journal: "Reviews of Modern Physics".into(),
        volume: 29,
        page: Page::Number(547),
        abstract_text: String::new(),
        bibtex: "@ARTICLE{1957RvMP...29..547B,\n       title = \"{Synthesis of the Elements in Stars}\",\n}\n\n".into(),
        arxiv_id: None,
    }
}

pub fn marks() -> PaperMetadata {
    PaperMetadata {
        bibcode: MARKS_BIBCODE.into(),
        title: "Evidence for top-heavy stellar initial mass functions with increasing density and decreasing metallicity".into(),
        authors: vec!["Marks, M.".into(), "Kroupa, P.".into()],
        pubdate: "2012-07-00".into(),
        journal: "Astronomy and Astrophysics".into(),
        volume: 543,
        page: Page::Text("A8".into()),
        abstract_text: String::new(),
        bibtex: "@ARTICLE{2012A&A...543A...8M,\n        pages = {A8},\n}\n\n".into(),
        arxiv_id: Some("1205.1508".into()),
    }
}

/// A catalog holding every fixture paper.
pub fn catalog() -> StaticCatalog {
    let catalog = StaticCatalog::new();
    for paper in [brown(), tremonti(), forbes(), bbfh(), marks()] {
        catalog.insert(paper);
    }
    catalog.insert_doi(BROWN_DOI, BROWN_BIBCODE);
    catalog.insert_doi(TREMONTI_DOI, TREMONTI_BIBCODE);
    catalog
}

/// An empty in-memory library over the fixture catalog. The returned
/// catalog handle shares contents with the one inside the library.
pub fn library() -> (StaticCatalog, Library) {
    let catalog = catalog();
    let library = Library::open_in_memory(MetadataGateway::new(catalog.clone())).unwrap();
    (catalog, library)
}
