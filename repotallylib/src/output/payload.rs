//! The persisted report payload.
//!
//! One payload per run: who was analyzed, when, the statistics, and every
//! record. The records keep the `gh repo list --json` shape, so a saved
//! payload can be fed back in as a catalog.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::analyzer::Analysis;
use crate::data::stats::CorpusStats;
use crate::source::record::Repository;
use crate::Result;

/// `strftime` pattern for the timestamp embedded in output file names.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Everything a report is rendered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    /// When the analysis finished
    pub timestamp: DateTime<Utc>,
    pub username: String,
    /// Description of the pre-analysis date window, if one was active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<String>,
    pub stats: CorpusStats,
    pub repos: Vec<Repository>,
}

impl ReportPayload {
    pub fn new(
        username: impl Into<String>,
        stats: CorpusStats,
        repos: Vec<Repository>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            username: username.into(),
            date_filter: None,
            stats,
            repos,
        }
    }

    pub fn from_analysis(analysis: Analysis, timestamp: DateTime<Utc>) -> Self {
        let date_filter = analysis
            .window
            .is_active()
            .then(|| analysis.window.describe());
        Self {
            timestamp,
            username: analysis.username,
            date_filter,
            stats: analysis.stats,
            repos: analysis.repos,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the payload as pretty JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        info!("wrote {}", path.as_ref().display());
        Ok(())
    }

    /// Write into `dir` under the conventional file name.
    pub fn save_in(&self, dir: impl AsRef<Path>, stamp: &str) -> Result<PathBuf> {
        let path = dir.as_ref().join(data_file_name(&self.username, stamp));
        self.save(&path)?;
        Ok(path)
    }

    /// Read a payload written by [`ReportPayload::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Render `at` with [`FILE_STAMP_FORMAT`].
pub fn file_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format(FILE_STAMP_FORMAT).to_string()
}

/// `github_data_{user}_{stamp}.json`
pub fn data_file_name(username: &str, stamp: &str) -> String {
    format!("github_data_{}_{}.json", username, stamp)
}

/// `github_report_{user}_{stamp}.html`
pub fn report_file_name(username: &str, stamp: &str) -> String {
    format!("github_report_{}_{}.html", username, stamp)
}
