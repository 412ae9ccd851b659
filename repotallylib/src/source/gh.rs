//! `gh` CLI adapter for the catalog and inspection traits.
//!
//! Authentication, host selection and pagination all belong to `gh`; this
//! module only shapes the commands and parses their output.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::debug;

use crate::error::RepotallyError;
use crate::Result;

use super::catalog::Catalog;
use super::inspect::RepoInspector;
use super::record::Repository;

/// Fields requested from `gh repo list --json`.
pub const REPO_FIELDS: &str = "name,description,isPrivate,isFork,isArchived,primaryLanguage,\
createdAt,updatedAt,pushedAt,diskUsage,url,stargazerCount,forkCount,homepageUrl,owner";

/// Runs `gh` subcommands.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    limit: usize,
}

impl Default for GhCli {
    fn default() -> Self {
        Self {
            program: "gh".to_string(),
            limit: 1000,
        }
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable (a wrapper script, a pinned path).
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Maximum number of repositories to list.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let call = format!("{} {}", self.program, args.join(" "));
        debug!("running {}", call);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| RepotallyError::upstream(&call, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RepotallyError::upstream(&call, stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn default_branch(&self, repo: &Repository) -> Result<String> {
        let endpoint = format!("repos/{}", repo.full_name());
        let branch = self.run(&["api", &endpoint, "--jq", ".default_branch"])?;
        if branch.is_empty() {
            return Err(RepotallyError::upstream(endpoint, "no default branch"));
        }
        Ok(branch)
    }
}

impl Catalog for GhCli {
    fn viewer(&self) -> Result<String> {
        let login = self
            .run(&["api", "user", "--jq", ".login"])
            .map_err(|_| RepotallyError::NotAuthenticated)?;
        if login.is_empty() {
            return Err(RepotallyError::NotAuthenticated);
        }
        Ok(login)
    }

    fn list(&self, owner: Option<&str>) -> Result<Vec<Repository>> {
        let limit = self.limit.to_string();
        let mut args = vec!["repo", "list"];
        if let Some(owner) = owner {
            args.push(owner);
        }
        args.extend(["--limit", limit.as_str(), "--json", REPO_FIELDS]);

        let raw = self.run(&args)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| RepotallyError::MalformedPayload(format!("gh repo list: {}", e)))
    }
}

impl RepoInspector for GhCli {
    fn language_bytes(&self, repo: &Repository) -> Result<BTreeMap<String, u64>> {
        let endpoint = format!("repos/{}/languages", repo.full_name());
        let raw = self.run(&["api", &endpoint])?;
        serde_json::from_str(&raw)
            .map_err(|e| RepotallyError::MalformedPayload(format!("{}: {}", endpoint, e)))
    }

    fn file_paths(&self, repo: &Repository) -> Result<Vec<String>> {
        let branch = self.default_branch(repo)?;
        let endpoint = format!("repos/{}/git/trees/{}?recursive=1", repo.full_name(), branch);
        let raw = self.run(&[
            "api",
            &endpoint,
            "--jq",
            r#".tree[] | select(.type=="blob") | .path"#,
        ])?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
