//! Stratified sampling of the corpus.
//!
//! Only a handful of repositories can be inspected per run, so the sample is
//! assembled from three strata:
//!
//! 1. `⌊k/3⌋` most recently active repositories (pushed, else updated, else
//!    created; undated ones rank last)
//! 2. `⌊k/3⌋` largest repositories by disk usage, skipping any already chosen
//! 3. the remainder drawn uniformly at random, without replacement, from
//!    everything not yet chosen
//!
//! The random stratum makes estimates vary between runs. That variance is
//! expected; pass a seeded generator to get a reproducible sample.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::source::record::Repository;

/// Why a repository ended up in the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stratum {
    /// Among the most recently active
    Recent,
    /// Among the largest by disk usage
    Largest,
    /// Uniform random fill
    Random,
    /// The sample covers the whole corpus
    Census,
}

/// One member of the sample set.
#[derive(Debug, Clone, Copy)]
pub struct SampledRepo<'a> {
    pub repo: &'a Repository,
    pub stratum: Stratum,
}

/// Select up to `k` distinct repositories from `corpus`.
///
/// Returns the whole corpus (in corpus order) when `k >= corpus.len()`, and
/// nothing when `k == 0`.
pub fn stratified_sample<'a, R: Rng + ?Sized>(
    corpus: &'a [Repository],
    k: usize,
    rng: &mut R,
) -> Vec<SampledRepo<'a>> {
    if k == 0 || corpus.is_empty() {
        return Vec::new();
    }
    if k >= corpus.len() {
        return corpus
            .iter()
            .map(|repo| SampledRepo {
                repo,
                stratum: Stratum::Census,
            })
            .collect();
    }

    let per_stratum = k / 3;
    let mut chosen = vec![false; corpus.len()];
    let mut sample = Vec::with_capacity(k);

    let mut by_recent: Vec<usize> = (0..corpus.len()).collect();
    by_recent.sort_by(|&a, &b| corpus[b].last_activity().cmp(&corpus[a].last_activity()));
    for idx in by_recent.into_iter().take(per_stratum) {
        chosen[idx] = true;
        sample.push(SampledRepo {
            repo: &corpus[idx],
            stratum: Stratum::Recent,
        });
    }

    let mut by_size: Vec<usize> = (0..corpus.len()).collect();
    by_size.sort_by(|&a, &b| corpus[b].disk_usage_kb.cmp(&corpus[a].disk_usage_kb));
    let largest: Vec<usize> = by_size
        .into_iter()
        .filter(|&idx| !chosen[idx])
        .take(per_stratum)
        .collect();
    for idx in largest {
        chosen[idx] = true;
        sample.push(SampledRepo {
            repo: &corpus[idx],
            stratum: Stratum::Largest,
        });
    }

    let pool: Vec<usize> = (0..corpus.len()).filter(|&idx| !chosen[idx]).collect();
    let amount = (k - sample.len()).min(pool.len());
    for pick in rand::seq::index::sample(rng, pool.len(), amount) {
        sample.push(SampledRepo {
            repo: &corpus[pool[pick]],
            stratum: Stratum::Random,
        });
    }

    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::record::parse_timestamp;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// repo0..repo9, repo9 most recently pushed, repo0 the largest.
    fn corpus() -> Vec<Repository> {
        (0..10)
            .map(|i| {
                let mut repo = Repository::new("octo", format!("repo{}", i));
                repo.pushed_at = parse_timestamp(&format!("2024-01-{:02}T00:00:00Z", i + 1));
                repo.disk_usage_kb = (10 - i) * 1000;
                repo
            })
            .collect()
    }

    fn names<'a>(sample: &[SampledRepo<'a>]) -> Vec<&'a str> {
        sample.iter().map(|s| s.repo.name.as_str()).collect()
    }

    #[test]
    fn test_zero_sample_is_empty() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(stratified_sample(&corpus, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_census_when_k_covers_corpus() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(1);
        for k in [10, 11, 500] {
            let sample = stratified_sample(&corpus, k, &mut rng);
            assert_eq!(sample.len(), corpus.len());
            let unique: HashSet<_> = sample.iter().map(|s| s.repo.key()).collect();
            assert_eq!(unique.len(), corpus.len());
            assert!(sample.iter().all(|s| s.stratum == Stratum::Census));
        }
    }

    #[test]
    fn test_three_strata_of_one() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = stratified_sample(&corpus, 3, &mut rng);

        assert_eq!(sample.len(), 3);
        assert_eq!(sample[0].repo.name, "repo9");
        assert_eq!(sample[0].stratum, Stratum::Recent);
        assert_eq!(sample[1].repo.name, "repo0");
        assert_eq!(sample[1].stratum, Stratum::Largest);
        assert_eq!(sample[2].stratum, Stratum::Random);

        let unique: HashSet<_> = sample.iter().map(|s| s.repo.key()).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_largest_skips_already_chosen() {
        let mut corpus = corpus();
        // Most recent is now also the largest.
        corpus[9].disk_usage_kb = 1_000_000;
        let mut rng = StdRng::seed_from_u64(3);
        let sample = stratified_sample(&corpus, 6, &mut rng);

        assert_eq!(sample.len(), 6);
        assert_eq!(&names(&sample)[..4], &["repo9", "repo8", "repo0", "repo1"]);
        let unique: HashSet<_> = sample.iter().map(|s| s.repo.key()).collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_small_k_is_all_random() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(11);
        let sample = stratified_sample(&corpus, 2, &mut rng);
        assert_eq!(sample.len(), 2);
        assert!(sample.iter().all(|s| s.stratum == Stratum::Random));
    }

    #[test]
    fn test_seeded_sample_is_reproducible() {
        let corpus = corpus();
        let a = stratified_sample(&corpus, 5, &mut StdRng::seed_from_u64(42));
        let b = stratified_sample(&corpus, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_undated_rank_last_for_recency() {
        let mut corpus = corpus();
        for repo in corpus.iter_mut() {
            repo.pushed_at = None;
        }
        corpus[4].created_at = parse_timestamp("2020-01-01T00:00:00Z");
        let mut rng = StdRng::seed_from_u64(5);
        let sample = stratified_sample(&corpus, 3, &mut rng);
        assert_eq!(sample[0].repo.name, "repo4");
    }
}
