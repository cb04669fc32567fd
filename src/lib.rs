//! # mqa - Metadata Quality Assessment
//!
//! mqa scores DCAT catalogs against weighted quality profiles and rates
//! tabular data files on a small set of data-quality indicators.
//!
//! ## Overview
//!
//! A catalog is read into an in-memory RDF [`graph`]. The dataset and
//! distribution entities are extracted, every metric of the selected
//! [`profile`] is evaluated against them, and the results roll up into
//! per-dimension scores (findability, accessibility, interoperability,
//! reusability, contextuality) and a four-level [`score::Rating`].
//!
//! ## Core Concepts
//!
//! - **Profiles**: named, versioned metric catalogs with dimension budgets
//! - **Metrics**: weighted property checks scored proportionally over entities
//! - **Collaborators**: vocabulary lookup, URL reachability and shape validation,
//!   all injectable so assessments run offline in tests
//!
//! ## Modules
//!
//! - [`graph`] - RDF parsing and the triple store queried by extraction
//! - [`profile`] - Built-in and file-backed profile catalogs
//! - [`evaluate`] - Per-metric evaluation against extracted entities
//! - [`scoring`] - Aggregation into dimension and total scores
//! - [`assessment`] - End-to-end catalog assessment
//! - [`data_quality`] - Indicators for tabular data files
//! - [`shapes`] - Shape validation reports and their merged summary
//!
//! ## Example
//!
//! ```no_run
//! use mqa::assessment::{assess_graph, Collaborators};
//! use mqa::graph::{parse_graph, GraphFormat};
//! use mqa::profile::ProfileCatalog;
//! use mqa::vocabulary::VocabularySet;
//!
//! let content = std::fs::read_to_string("catalog.ttl").expect("read catalog");
//! let graph = parse_graph(&content, GraphFormat::Turtle).expect("parse catalog");
//! let catalog = ProfileCatalog::builtin().expect("builtin profiles");
//! let vocabularies = VocabularySet::builtin();
//!
//! let report = assess_graph(
//!     &graph,
//!     &catalog,
//!     "dcat_ap_es",
//!     None,
//!     &Collaborators::offline(&vocabularies),
//! )
//! .expect("assessment");
//! println!("{} ({})", report.profile_score, report.rating.as_str());
//! ```

pub mod assessment;
pub mod config;
pub mod data_quality;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod formatters;
pub mod graph;
pub mod metric;
pub mod namespaces;
pub mod profile;
pub mod reachability;
pub mod score;
pub mod scoring;
pub mod shapes;
pub mod ui;
pub mod vocabulary;
