//! Source acquisition: find the repositories to analyze.
//!
//! This module handles the first stage of the pipeline - getting a corpus of
//! repository records and the per-repository signals used for estimation.
//! It provides:
//!
//! - **Records**: The normalized `Repository` type
//! - **Catalog**: Listing an owner's repositories (`gh`, or a JSON file)
//! - **Inspection**: Language byte totals or file lists per repository
//! - **Date filtering**: Narrow the corpus by creation date
//!
//! ## Example
//!
//! ```rust,ignore
//! use repotallylib::source::{fetch_corpus, filter_by_date, DateWindow, GhCli};
//!
//! let corpus = fetch_corpus(&GhCli::new(), Some("octo"))?;
//! let recent = filter_by_date(&corpus.repos, &DateWindow::LastDays(30), chrono::Utc::now());
//! ```

pub mod catalog;
pub mod datefilter;
pub mod gh;
pub mod inspect;
pub mod record;

pub use catalog::{fetch_corpus, Catalog, FetchedCorpus, JsonCatalog};
pub use datefilter::{filter_by_date, parse_date, DateRange, DateWindow};
pub use gh::GhCli;
pub use inspect::{inspect, EstimationMode, RepoInspector, RepoSignal};
pub use record::{parse_timestamp, Repository};
