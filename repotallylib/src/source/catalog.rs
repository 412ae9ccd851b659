//! Catalog listing: where the corpus comes from.
//!
//! A [`Catalog`] knows who the acting identity is and can list an owner's
//! repositories. [`fetch_corpus`] layers the visibility rule on top: when the
//! listed owner is not the acting identity, only public records are kept.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::RepotallyError;
use crate::Result;

use super::record::Repository;

/// A source of repository records.
pub trait Catalog {
    /// Login of the acting identity.
    fn viewer(&self) -> Result<String>;

    /// All records for `owner`, or for the acting identity when `None`.
    fn list(&self, owner: Option<&str>) -> Result<Vec<Repository>>;
}

/// The corpus for one analysis run.
#[derive(Debug, Clone)]
pub struct FetchedCorpus {
    /// Whose repositories these are
    pub username: String,
    /// The records, in catalog order
    pub repos: Vec<Repository>,
    /// Whether private records were dropped
    pub public_only: bool,
}

/// List the corpus for `owner` (or the acting identity).
///
/// Fails with [`RepotallyError::NotAuthenticated`] when no owner is given and
/// the acting identity is unknown, and with [`RepotallyError::EmptyCorpus`]
/// when nothing is left to analyze.
pub fn fetch_corpus<C: Catalog + ?Sized>(catalog: &C, owner: Option<&str>) -> Result<FetchedCorpus> {
    let (username, mut repos, public_only) = match owner {
        None => {
            let viewer = catalog.viewer()?;
            info!("fetching repositories for {}", viewer);
            let repos = catalog.list(None)?;
            (viewer, repos, false)
        }
        Some(owner) => {
            info!("fetching repositories for {}", owner);
            let repos = catalog.list(Some(owner))?;
            let viewer = catalog.viewer().ok();
            let is_self = viewer
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(owner));
            (owner.to_string(), repos, !is_self)
        }
    };

    if public_only {
        let before = repos.len();
        repos.retain(|r| !r.is_private);
        debug!(
            "dropped {} private repositories (viewer differs from owner)",
            before - repos.len()
        );
    }

    if repos.is_empty() {
        return Err(RepotallyError::EmptyCorpus { owner: username });
    }

    info!("fetched {} repositories", repos.len());
    Ok(FetchedCorpus {
        username,
        repos,
        public_only,
    })
}

/// A catalog read from a JSON file.
///
/// Accepts either a bare array of records (a `gh repo list --json` dump) or
/// an object with a `repos` array, such as a saved report payload.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
    viewer: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Records(Vec<Repository>),
    Payload { repos: Vec<Repository> },
}

impl JsonCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            viewer: None,
        }
    }

    /// Set the acting identity. Without one, the first record's owner is used.
    pub fn with_viewer(mut self, login: impl Into<String>) -> Self {
        self.viewer = Some(login.into());
        self
    }

    fn read(&self) -> Result<Vec<Repository>> {
        let raw = fs::read_to_string(&self.path)?;
        let file: CatalogFile = serde_json::from_str(&raw).map_err(|e| {
            RepotallyError::MalformedPayload(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(match file {
            CatalogFile::Records(repos) => repos,
            CatalogFile::Payload { repos } => repos,
        })
    }
}

impl Catalog for JsonCatalog {
    fn viewer(&self) -> Result<String> {
        if let Some(login) = &self.viewer {
            return Ok(login.clone());
        }
        self.read()?
            .into_iter()
            .map(|r| r.owner)
            .find(|owner| !owner.is_empty())
            .ok_or(RepotallyError::NotAuthenticated)
    }

    fn list(&self, owner: Option<&str>) -> Result<Vec<Repository>> {
        let repos = self.read()?;
        Ok(match owner {
            Some(owner) => repos
                .into_iter()
                .filter(|r| r.owner.is_empty() || r.owner.eq_ignore_ascii_case(owner))
                .collect(),
            None => repos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedCatalog {
        viewer: Option<&'static str>,
        repos: Vec<Repository>,
    }

    impl Catalog for FixedCatalog {
        fn viewer(&self) -> Result<String> {
            self.viewer
                .map(str::to_string)
                .ok_or(RepotallyError::NotAuthenticated)
        }

        fn list(&self, _owner: Option<&str>) -> Result<Vec<Repository>> {
            Ok(self.repos.clone())
        }
    }

    fn mixed() -> Vec<Repository> {
        let mut secret = Repository::new("octo", "secret");
        secret.is_private = true;
        vec![Repository::new("octo", "open"), secret]
    }

    #[test]
    fn test_own_corpus_keeps_private() {
        let catalog = FixedCatalog {
            viewer: Some("octo"),
            repos: mixed(),
        };
        let corpus = fetch_corpus(&catalog, None).unwrap();
        assert_eq!(corpus.username, "octo");
        assert_eq!(corpus.repos.len(), 2);
        assert!(!corpus.public_only);

        let corpus = fetch_corpus(&catalog, Some("Octo")).unwrap();
        assert_eq!(corpus.repos.len(), 2);
    }

    #[test]
    fn test_other_owner_is_public_only() {
        let catalog = FixedCatalog {
            viewer: Some("someone-else"),
            repos: mixed(),
        };
        let corpus = fetch_corpus(&catalog, Some("octo")).unwrap();
        assert_eq!(corpus.username, "octo");
        assert!(corpus.public_only);
        assert_eq!(corpus.repos.len(), 1);
        assert_eq!(corpus.repos[0].name, "open");
    }

    #[test]
    fn test_no_viewer_without_owner_is_fatal() {
        let catalog = FixedCatalog {
            viewer: None,
            repos: mixed(),
        };
        assert!(matches!(
            fetch_corpus(&catalog, None),
            Err(RepotallyError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_empty_corpus() {
        let catalog = FixedCatalog {
            viewer: Some("octo"),
            repos: vec![],
        };
        assert!(matches!(
            fetch_corpus(&catalog, None),
            Err(RepotallyError::EmptyCorpus { .. })
        ));
    }

    #[test]
    fn test_json_catalog_reads_array_and_payload() {
        let dir = tempfile::tempdir().unwrap();

        let array_path = dir.path().join("catalog.json");
        let mut f = fs::File::create(&array_path).unwrap();
        write!(
            f,
            r#"[{{"name": "a", "owner": {{"login": "octo"}}}}, {{"name": "b", "owner": {{"login": "octo"}}}}]"#
        )
        .unwrap();
        let catalog = JsonCatalog::new(&array_path);
        assert_eq!(catalog.viewer().unwrap(), "octo");
        assert_eq!(catalog.list(None).unwrap().len(), 2);
        assert_eq!(catalog.list(Some("other")).unwrap().len(), 0);

        let payload_path = dir.path().join("payload.json");
        fs::write(
            &payload_path,
            r#"{"timestamp": "x", "username": "octo", "repos": [{"name": "c"}]}"#,
        )
        .unwrap();
        let catalog = JsonCatalog::new(&payload_path).with_viewer("octo");
        let repos = catalog.list(Some("octo")).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "c");
    }

    #[test]
    fn test_json_catalog_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let catalog = JsonCatalog::new(&path);
        assert!(matches!(
            catalog.list(None),
            Err(RepotallyError::MalformedPayload(_))
        ));
    }
}
