//! Corpus-wide statistics.
//!
//! [`CorpusStats`] is built in a single fold over the records
//! ([`CorpusStats::from_repos`]) and then, if a sample was inspected, has the
//! sample-derived line figures scaled up to the whole corpus
//! ([`CorpusStats::apply_estimates`]).
//!
//! Invariants held by every value produced here:
//!
//! - `public + private == total`
//! - the four size buckets sum to `total`
//! - the line total and every language subtotal share one scale factor

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::source::record::Repository;

use super::estimator::LineEstimate;

/// Highlight lists in the overview.
const HIGHLIGHT_LEN: usize = 10;
const OLDEST_LEN: usize = 5;

/// Disk-usage bucket, inclusive lower and exclusive upper bound in MB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeBucket {
    /// `< 1MB`
    Small,
    /// `1–10MB`
    Medium,
    /// `10–100MB`
    Large,
    /// `≥ 100MB`
    Huge,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 4] = [
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::Huge,
    ];

    /// Bucket for a disk usage given in KB.
    pub fn classify(disk_usage_kb: u64) -> Self {
        let mb = disk_usage_kb as f64 / 1024.0;
        if mb < 1.0 {
            SizeBucket::Small
        } else if mb < 10.0 {
            SizeBucket::Medium
        } else if mb < 100.0 {
            SizeBucket::Large
        } else {
            SizeBucket::Huge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Small => "< 1MB",
            SizeBucket::Medium => "1-10MB",
            SizeBucket::Large => "10-100MB",
            SizeBucket::Huge => ">= 100MB",
        }
    }
}

/// Repository counts per size bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub small: u64,
    pub medium: u64,
    pub large: u64,
    pub huge: u64,
}

impl SizeDistribution {
    pub fn record(&mut self, bucket: SizeBucket) {
        *self.slot(bucket) += 1;
    }

    pub fn count(&self, bucket: SizeBucket) -> u64 {
        match bucket {
            SizeBucket::Small => self.small,
            SizeBucket::Medium => self.medium,
            SizeBucket::Large => self.large,
            SizeBucket::Huge => self.huge,
        }
    }

    pub fn total(&self) -> u64 {
        self.small + self.medium + self.large + self.huge
    }

    fn slot(&mut self, bucket: SizeBucket) -> &mut u64 {
        match bucket {
            SizeBucket::Small => &mut self.small,
            SizeBucket::Medium => &mut self.medium,
            SizeBucket::Large => &mut self.large,
            SizeBucket::Huge => &mut self.huge,
        }
    }
}

impl AddAssign for LineEstimate {
    fn add_assign(&mut self, other: Self) {
        self.total_lines += other.total_lines;
        self.file_count += other.file_count;
        for (language, lines) in other.lines_by_language {
            *self.lines_by_language.entry(language).or_insert(0) += lines;
        }
    }
}

/// Line figures extrapolated from the inspected sample.
///
/// Every number here is an estimate: a heuristic per-repository figure,
/// averaged over the sample and scaled to the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSummary {
    /// Number of repositories inspected
    pub sample_size: usize,
    /// `|corpus| / |sample|`, or 0 when nothing was sampled
    pub scale_factor: f64,
    /// Estimated lines across the corpus
    pub total_lines: u64,
    /// Estimated files across the corpus
    pub total_files: u64,
    /// Estimated lines per language across the corpus
    pub lines_by_language: BTreeMap<String, u64>,
    /// Always true once a sample contributed; figures are never exact
    pub estimated: bool,
}

impl LineSummary {
    /// Scale per-repository estimates up to a corpus of `corpus_len` records.
    ///
    /// Every figure is `round(Σ sample × corpus_len / sample_len)`, i.e. the
    /// sample mean times the corpus size. An empty sample yields all zeros.
    pub fn scaled(estimates: &[LineEstimate], corpus_len: usize) -> Self {
        if estimates.is_empty() {
            return Self::default();
        }

        let sample_len = estimates.len();
        let mut sum = LineEstimate::zero();
        for estimate in estimates {
            sum += estimate.clone();
        }

        let scale = |value: u64| -> u64 {
            (value as f64 * corpus_len as f64 / sample_len as f64).round() as u64
        };

        Self {
            sample_size: sample_len,
            scale_factor: corpus_len as f64 / sample_len as f64,
            total_lines: scale(sum.total_lines),
            total_files: scale(sum.file_count),
            lines_by_language: sum
                .lines_by_language
                .into_iter()
                .map(|(language, lines)| (language, scale(lines)))
                .collect(),
            estimated: true,
        }
    }
}

/// Aggregate statistics for a corpus (or a filtered subset of one).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total: u64,
    pub public: u64,
    pub private: u64,
    pub fork: u64,
    pub archived: u64,
    pub total_size_kb: u64,
    pub total_size_mb: f64,
    pub total_stars: u64,
    pub total_forks: u64,
    /// Repositories created per `YYYY`
    pub by_year: BTreeMap<String, u64>,
    /// Repositories created per `YYYY-MM`
    pub by_month: BTreeMap<String, u64>,
    /// Repositories per primary language (unset languages are not counted)
    pub by_language: BTreeMap<String, u64>,
    pub size_distribution: SizeDistribution,
    /// Names of the most recently created repositories
    pub recent: Vec<String>,
    /// Names of the largest repositories
    pub largest: Vec<String>,
    /// Names of the oldest repositories
    pub oldest: Vec<String>,
    /// Sample-derived line estimates
    pub lines: LineSummary,
}

impl CorpusStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every record into fresh statistics.
    pub fn from_repos(repos: &[Repository]) -> Self {
        let mut stats = Self::new();
        for repo in repos {
            stats.add_repo(repo);
        }
        stats.set_highlights(repos);
        stats
    }

    /// Fold one record into the running counts.
    pub fn add_repo(&mut self, repo: &Repository) {
        self.total += 1;
        if repo.is_private {
            self.private += 1;
        } else {
            self.public += 1;
        }
        if repo.is_fork {
            self.fork += 1;
        }
        if repo.is_archived {
            self.archived += 1;
        }

        self.total_size_kb += repo.disk_usage_kb;
        self.total_size_mb = self.total_size_kb as f64 / 1024.0;
        self.size_distribution
            .record(SizeBucket::classify(repo.disk_usage_kb));

        self.total_stars += repo.stargazer_count;
        self.total_forks += repo.fork_count;

        if let Some(language) = &repo.primary_language {
            *self.by_language.entry(language.clone()).or_insert(0) += 1;
        }

        // Undated records count everywhere except the date-keyed maps.
        if let (Some(year), Some(month)) = (repo.year_key(), repo.month_key()) {
            *self.by_year.entry(year).or_insert(0) += 1;
            *self.by_month.entry(month).or_insert(0) += 1;
        }
    }

    /// Install scaled line estimates for this corpus.
    pub fn apply_estimates(&mut self, estimates: &[LineEstimate]) {
        self.lines = LineSummary::scaled(estimates, self.total as usize);
    }

    /// Languages by repository count, largest first (ties alphabetical).
    pub fn top_languages(&self, n: usize) -> Vec<(String, u64)> {
        top_n(&self.by_language, n)
    }

    /// The last `n` months that saw a repository created, oldest first.
    pub fn recent_months(&self, n: usize) -> Vec<(String, u64)> {
        let skip = self.by_month.len().saturating_sub(n);
        self.by_month
            .iter()
            .skip(skip)
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    fn set_highlights(&mut self, repos: &[Repository]) {
        let mut dated: Vec<&Repository> = repos.iter().filter(|r| r.created_at.is_some()).collect();
        dated.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.recent = dated
            .iter()
            .take(HIGHLIGHT_LEN)
            .map(|r| r.name.clone())
            .collect();
        self.oldest = dated
            .iter()
            .rev()
            .take(OLDEST_LEN)
            .map(|r| r.name.clone())
            .collect();

        let mut by_size: Vec<&Repository> = repos.iter().collect();
        by_size.sort_by(|a, b| b.disk_usage_kb.cmp(&a.disk_usage_kb));
        self.largest = by_size
            .iter()
            .take(HIGHLIGHT_LEN)
            .map(|r| r.name.clone())
            .collect();
    }
}

fn top_n(counts: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut items: Vec<(String, u64)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // BTreeMap order is alphabetical and the sort is stable, so ties stay alphabetical.
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items.truncate(n);
    items
}
