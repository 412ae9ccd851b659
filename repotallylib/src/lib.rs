//! # repotallylib
//!
//! A library for summarizing an owner's GitHub repositories: how many, how
//! big, in which languages, created when, and roughly how many lines of code.
//!
//! ## Overview
//!
//! Counting lines for real would mean cloning every repository. Instead the
//! library inspects a small stratified sample through cheap proxy signals and
//! scales the result up to the whole corpus:
//!
//! - **Source**: List repositories (`gh`, or a JSON dump) and narrow them by date
//! - **Data**: Sample, estimate lines per sample, and aggregate corpus statistics
//! - **Query**: Filter and page a loaded corpus in three views
//! - **Output**: Tables, the JSON payload, and a self-contained HTML report
//!
//! Every line figure produced here is an estimate and is labelled as such.
//!
//! ## Example
//!
//! ```rust
//! use repotallylib::{ActiveFilter, CorpusStats, CorpusView, Repository, ViewOptions};
//!
//! let mut a = Repository::new("octo", "tally");
//! a.primary_language = Some("Rust".to_string());
//! a.disk_usage_kb = 2048;
//! let mut b = Repository::new("octo", "notes");
//! b.is_private = true;
//!
//! let stats = CorpusStats::from_repos(&[a.clone(), b.clone()]);
//! assert_eq!(stats.public + stats.private, stats.total);
//!
//! let mut view = CorpusView::new(vec![a, b], ViewOptions::default());
//! view.apply_filter(ActiveFilter::new().language("Rust"));
//! assert_eq!(view.summary().total, 1);
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod query;
pub mod source;

pub use data::{
    analyze, estimate_from_bytes, estimate_from_paths, run_analysis, stratified_sample, Analysis,
    AnalyzeOptions, CorpusStats, LineEstimate, LineSummary, SampleOutcome, SizeBucket,
    SizeDistribution, Stratum,
};
pub use error::RepotallyError;
pub use output::{
    file_stamp, render_report, write_report, ReportPayload, ReportTable, TableRow,
};
pub use query::{
    ActiveFilter, BarScale, CorpusView, PageWindow, ViewKind, ViewOptions, ViewSummary,
    Visibility,
};
pub use source::{
    fetch_corpus, filter_by_date, Catalog, DateRange, DateWindow, EstimationMode, GhCli,
    JsonCatalog, RepoInspector, Repository,
};

/// Result type for repotallylib operations
pub type Result<T> = std::result::Result<T, RepotallyError>;
