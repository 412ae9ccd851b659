//! Per-repository inspection signals.
//!
//! Counting lines for real would mean cloning every repository. Instead the
//! estimator works from one of two cheap proxies the host already exposes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

use super::record::Repository;

/// Which proxy signal to request for each sampled repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstimationMode {
    /// Bytes per language, divided by an average line width
    Bytes,
    /// File paths of the default branch, classified by extension
    #[default]
    Extensions,
}

impl std::str::FromStr for EstimationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bytes" | "languages" => Ok(EstimationMode::Bytes),
            "extensions" | "ext" | "tree" => Ok(EstimationMode::Extensions),
            _ => Err(format!("Unknown estimation mode: {}", s)),
        }
    }
}

/// Source of the per-repository proxy signals.
pub trait RepoInspector {
    /// Bytes of source per language.
    fn language_bytes(&self, repo: &Repository) -> Result<BTreeMap<String, u64>>;

    /// Paths of every file (blob) on the default branch.
    fn file_paths(&self, repo: &Repository) -> Result<Vec<String>>;
}

/// The signal actually obtained for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSignal {
    LanguageBytes(BTreeMap<String, u64>),
    FilePaths(Vec<String>),
}

/// Request the signal `mode` asks for.
pub fn inspect<I: RepoInspector + ?Sized>(
    inspector: &I,
    repo: &Repository,
    mode: EstimationMode,
) -> Result<RepoSignal> {
    match mode {
        EstimationMode::Bytes => inspector.language_bytes(repo).map(RepoSignal::LanguageBytes),
        EstimationMode::Extensions => inspector.file_paths(repo).map(RepoSignal::FilePaths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    struct Canned;

    impl RepoInspector for Canned {
        fn language_bytes(&self, _repo: &Repository) -> Result<BTreeMap<String, u64>> {
            Ok(BTreeMap::from([("Rust".to_string(), 400)]))
        }

        fn file_paths(&self, _repo: &Repository) -> Result<Vec<String>> {
            Ok(vec!["src/lib.rs".to_string()])
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(EstimationMode::from_str("bytes").unwrap(), EstimationMode::Bytes);
        assert_eq!(
            EstimationMode::from_str("Extensions").unwrap(),
            EstimationMode::Extensions
        );
        assert!(EstimationMode::from_str("exact").is_err());
    }

    #[test]
    fn test_inspect_dispatches_on_mode() {
        let repo = Repository::new("octo", "a");
        assert!(matches!(
            inspect(&Canned, &repo, EstimationMode::Bytes).unwrap(),
            RepoSignal::LanguageBytes(_)
        ));
        assert_eq!(
            inspect(&Canned, &repo, EstimationMode::Extensions).unwrap(),
            RepoSignal::FilePaths(vec!["src/lib.rs".to_string()])
        );
    }
}
