//! Data collection: sample, estimate, and aggregate.
//!
//! This module handles the second stage of the pipeline - turning a corpus of
//! repository records into statistics. It provides:
//!
//! - **Sampling**: Stratified selection of repositories to inspect
//! - **Estimation**: Heuristic line counts from language bytes or file lists
//! - **Statistics**: Corpus-wide counts and scaled line estimates
//! - **Analysis**: The sequential pipeline tying them together
//!
//! ## Example
//!
//! ```rust,ignore
//! use repotallylib::data::{run_analysis, AnalyzeOptions};
//! use repotallylib::source::GhCli;
//!
//! let gh = GhCli::new();
//! let analysis = run_analysis(&gh, &gh, None, &AnalyzeOptions::new(), chrono::Utc::now(), &mut rand::thread_rng())?;
//! println!("~{} lines", analysis.stats.lines.total_lines);
//! ```

pub mod analyzer;
pub mod estimator;
pub mod sampler;
pub mod stats;

pub use analyzer::{analyze, run_analysis, Analysis, AnalyzeOptions, SampleOutcome};
pub use estimator::{estimate, estimate_from_bytes, estimate_from_paths, LineEstimate};
pub use sampler::{stratified_sample, SampledRepo, Stratum};
pub use stats::{CorpusStats, LineSummary, SizeBucket, SizeDistribution};
