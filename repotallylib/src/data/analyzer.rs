//! The analysis pipeline.
//!
//! Fetch → date filter → aggregate → sample → estimate → scale up. Every
//! stage runs sequentially; inspector calls are strictly one at a time with a
//! fixed pause after each.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::RepotallyError;
use crate::source::catalog::{fetch_corpus, Catalog};
use crate::source::datefilter::{filter_by_date, DateWindow};
use crate::source::inspect::{inspect, EstimationMode, RepoInspector};
use crate::source::record::Repository;
use crate::Result;

use super::estimator::{estimate, LineEstimate};
use super::sampler::{stratified_sample, Stratum};
use super::stats::CorpusStats;

/// Default number of repositories inspected per run.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Default pause after each inspector call.
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_millis(500);

/// Options for an analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Repositories to inspect for line estimates (0 disables estimation)
    pub sample_size: usize,
    /// Pause after every inspector call
    pub call_delay: Duration,
    /// Which proxy signal to request
    pub mode: EstimationMode,
    /// Pre-analysis date policy
    pub window: DateWindow,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            call_delay: DEFAULT_CALL_DELAY,
            mode: EstimationMode::default(),
            window: DateWindow::All,
        }
    }
}

impl AnalyzeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample size.
    pub fn sample_size(mut self, k: usize) -> Self {
        self.sample_size = k;
        self
    }

    /// Set the pause after each inspector call.
    pub fn call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Set the estimation mode.
    pub fn mode(mut self, mode: EstimationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the date window.
    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
}

/// How one sampled repository fared.
#[derive(Debug, Clone, Serialize)]
pub struct SampleOutcome {
    pub name: String,
    pub stratum: Stratum,
    pub estimate: LineEstimate,
    /// The inspector call failed and the zero estimate was used
    pub failed: bool,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub username: String,
    /// Whether private records were hidden from this corpus
    pub public_only: bool,
    pub window: DateWindow,
    /// The analyzed corpus (after date filtering)
    pub repos: Vec<Repository>,
    pub stats: CorpusStats,
    pub samples: Vec<SampleOutcome>,
}

/// Aggregate `corpus`, then sample, inspect and scale up line estimates.
///
/// Inspector failures never abort the run: the failing repository
/// contributes the zero estimate and the failure is logged.
pub fn analyze<I, R>(
    corpus: &[Repository],
    options: &AnalyzeOptions,
    inspector: &I,
    rng: &mut R,
) -> (CorpusStats, Vec<SampleOutcome>)
where
    I: RepoInspector + ?Sized,
    R: Rng + ?Sized,
{
    let mut stats = CorpusStats::from_repos(corpus);

    let sample = stratified_sample(corpus, options.sample_size, rng);
    let n = sample.len();
    let mut outcomes = Vec::with_capacity(n);

    for (i, picked) in sample.iter().enumerate() {
        info!("[{}/{}] estimating lines for {}", i + 1, n, picked.repo.name);
        debug!("{} chosen as {:?}", picked.repo.name, picked.stratum);

        let (estimate, failed) = match inspect(inspector, picked.repo, options.mode) {
            Ok(signal) => (estimate(&signal), false),
            Err(e) => {
                warn!("{}: {}; counting it as zero", picked.repo.name, e);
                (LineEstimate::zero(), true)
            }
        };

        outcomes.push(SampleOutcome {
            name: picked.repo.name.clone(),
            stratum: picked.stratum,
            estimate,
            failed,
        });

        if !options.call_delay.is_zero() {
            thread::sleep(options.call_delay);
        }
    }

    let estimates: Vec<LineEstimate> = outcomes.iter().map(|o| o.estimate.clone()).collect();
    stats.apply_estimates(&estimates);
    (stats, outcomes)
}

/// Run the whole pipeline for `owner` (or the acting identity).
///
/// Fails with [`RepotallyError::EmptyResult`] when the date window leaves
/// nothing to analyze.
pub fn run_analysis<C, I, R>(
    catalog: &C,
    inspector: &I,
    owner: Option<&str>,
    options: &AnalyzeOptions,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Analysis>
where
    C: Catalog + ?Sized,
    I: RepoInspector + ?Sized,
    R: Rng + ?Sized,
{
    let fetched = fetch_corpus(catalog, owner)?;

    let repos = if options.window.is_active() {
        let kept = filter_by_date(&fetched.repos, &options.window, now);
        info!(
            "{} of {} repositories created {}",
            kept.len(),
            fetched.repos.len(),
            options.window.describe()
        );
        if kept.is_empty() {
            return Err(RepotallyError::EmptyResult);
        }
        kept
    } else {
        fetched.repos
    };

    let (stats, samples) = analyze(&repos, options, inspector, rng);

    Ok(Analysis {
        username: fetched.username,
        public_only: fetched.public_only,
        window: options.window,
        repos,
        stats,
        samples,
    })
}
