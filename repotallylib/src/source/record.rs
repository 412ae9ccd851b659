//! Normalized repository records.
//!
//! A [`Repository`] is the unit every other stage works on. Its serialized
//! form follows the shape `gh repo list --json` emits, so a catalog dump can
//! be read back as-is and the report payload stays compatible with it:
//!
//! - camelCase keys (`isPrivate`, `stargazerCount`, ...)
//! - `owner` is `{"login": "..."}`
//! - `primaryLanguage` is `{"name": "..."}` or `null`
//! - `diskUsage` is in KB
//!
//! Missing optional fields fall back to their defaults. A timestamp that is
//! missing or not valid RFC 3339 is read as absent instead of failing the
//! whole document.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata for one repository. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Repository name, unique within its owner
    pub name: String,
    /// Owner login
    #[serde(default, with = "login")]
    pub owner: String,
    /// Web URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Free-form description (empty strings are read as `None`)
    #[serde(default, deserialize_with = "non_empty")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_fork: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_archived: bool,
    /// Primary language name, if the host detected one
    #[serde(default, with = "language_name")]
    pub primary_language: Option<String>,
    /// Disk usage in KB
    #[serde(default, rename = "diskUsage", deserialize_with = "null_as_default")]
    pub disk_usage_kb: u64,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default, with = "timestamp")]
    pub pushed_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazer_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fork_count: u64,
    #[serde(default, deserialize_with = "non_empty")]
    pub homepage_url: Option<String>,
}

impl Repository {
    /// Create a public, empty record for `owner/name`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            url: format!("https://github.com/{}/{}", owner, name),
            name,
            owner,
            description: None,
            is_private: false,
            is_fork: false,
            is_archived: false,
            primary_language: None,
            disk_usage_kb: 0,
            created_at: None,
            updated_at: None,
            pushed_at: None,
            stargazer_count: 0,
            fork_count: 0,
            homepage_url: None,
        }
    }

    /// Corpus key.
    pub fn key(&self) -> (&str, &str) {
        (&self.owner, &self.name)
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Disk usage in MB (`KB / 1024`).
    pub fn size_mb(&self) -> f64 {
        self.disk_usage_kb as f64 / 1024.0
    }

    /// Calendar date of creation, read in the record's own offset.
    ///
    /// This is the single date policy used by both the date filters and the
    /// year/month aggregates: no conversion to UTC or to a display zone.
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_at.map(|dt| dt.date_naive())
    }

    /// `YYYY` bucket key for creation time.
    pub fn year_key(&self) -> Option<String> {
        self.created_at.map(|dt| dt.format("%Y").to_string())
    }

    /// `YYYY-MM` bucket key for creation time.
    pub fn month_key(&self) -> Option<String> {
        self.created_at.map(|dt| dt.format("%Y-%m").to_string())
    }

    /// Most recent activity: pushed, else updated, else created.
    pub fn last_activity(&self) -> Option<DateTime<FixedOffset>> {
        self.pushed_at.or(self.updated_at).or(self.created_at)
    }

    /// Case-insensitive substring match over name and description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Parse an RFC 3339 timestamp, keeping its offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

mod login {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Login {
        #[serde(default)]
        login: Option<String>,
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(owner: &String, serializer: S) -> Result<S::Ok, S::Error> {
        Login {
            login: Some(owner.clone()),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let raw = Option::<Login>::deserialize(deserializer)?;
        Ok(raw.and_then(|l| l.login).unwrap_or_default())
    }
}

mod language_name {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Named {
        #[serde(default)]
        name: Option<String>,
    }

    pub fn serialize<S: Serializer>(
        language: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        language
            .as_ref()
            .map(|name| Named {
                name: Some(name.clone()),
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let raw = Option::<Named>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|n| n.name)
            .filter(|name| !name.trim().is_empty()))
    }
}

mod timestamp {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const GH_RECORD: &str = r#"{
        "name": "tally",
        "owner": {"id": "MDQ6", "login": "octo"},
        "url": "https://github.com/octo/tally",
        "description": "",
        "isPrivate": true,
        "isFork": false,
        "isArchived": true,
        "primaryLanguage": {"name": "Rust"},
        "diskUsage": 2048,
        "createdAt": "2023-12-31T23:30:00Z",
        "updatedAt": "2024-02-01T10:00:00Z",
        "pushedAt": null,
        "stargazerCount": 7,
        "forkCount": 2,
        "homepageUrl": ""
    }"#;

    #[test]
    fn test_parse_gh_record() {
        let repo: Repository = serde_json::from_str(GH_RECORD).unwrap();
        assert_eq!(repo.name, "tally");
        assert_eq!(repo.owner, "octo");
        assert!(repo.is_private);
        assert!(repo.is_archived);
        assert_eq!(repo.primary_language.as_deref(), Some("Rust"));
        assert_eq!(repo.disk_usage_kb, 2048);
        assert_eq!(repo.description, None);
        assert_eq!(repo.homepage_url, None);
        assert_eq!(repo.pushed_at, None);
        assert_eq!(repo.stargazer_count, 7);
        assert_eq!(repo.size_mb(), 2.0);
        assert_eq!(repo.key(), ("octo", "tally"));
        assert_eq!(repo.full_name(), "octo/tally");
    }

    #[test]
    fn test_missing_fields_default() {
        let repo: Repository =
            serde_json::from_str(r#"{"name": "bare", "primaryLanguage": null}"#).unwrap();
        assert_eq!(repo.owner, "");
        assert_eq!(repo.primary_language, None);
        assert_eq!(repo.disk_usage_kb, 0);
        assert_eq!(repo.stargazer_count, 0);
        assert!(!repo.is_private);
        assert_eq!(repo.created_at, None);
    }

    #[test]
    fn test_malformed_timestamp_is_absent() {
        let repo: Repository =
            serde_json::from_str(r#"{"name": "x", "createdAt": "last tuesday"}"#).unwrap();
        assert_eq!(repo.created_at, None);
        assert_eq!(repo.year_key(), None);
        assert_eq!(repo.created_date(), None);
    }

    #[test]
    fn test_date_keys_use_stated_offset() {
        let mut repo = Repository::new("octo", "tz");
        repo.created_at = parse_timestamp("2023-12-31T23:30:00-05:00");
        // Still Dec 31 in the stated offset even though it's Jan 1 in UTC.
        assert_eq!(repo.year_key().as_deref(), Some("2023"));
        assert_eq!(repo.month_key().as_deref(), Some("2023-12"));
        assert_eq!(repo.created_date().unwrap().day(), 31);
    }

    #[test]
    fn test_serialize_round_trips_gh_shape() {
        let repo: Repository = serde_json::from_str(GH_RECORD).unwrap();
        let value = serde_json::to_value(&repo).unwrap();
        assert_eq!(value["owner"]["login"], "octo");
        assert_eq!(value["primaryLanguage"]["name"], "Rust");
        assert_eq!(value["diskUsage"], 2048);
        assert_eq!(value["createdAt"], "2023-12-31T23:30:00Z");
        let back: Repository = serde_json::from_value(value).unwrap();
        assert_eq!(back, repo);
    }

    #[test]
    fn test_matches_text() {
        let mut repo = Repository::new("octo", "Parser-Kit");
        repo.description = Some("Tokenizer and GRAMMAR tools".into());
        assert!(repo.matches_text("parser"));
        assert!(repo.matches_text("grammar"));
        assert!(repo.matches_text(""));
        assert!(!repo.matches_text("compiler"));
    }

    #[test]
    fn test_last_activity_fallback() {
        let mut repo = Repository::new("octo", "a");
        assert_eq!(repo.last_activity(), None);
        repo.created_at = parse_timestamp("2022-01-01T00:00:00Z");
        assert_eq!(repo.last_activity(), repo.created_at);
        repo.pushed_at = parse_timestamp("2024-01-01T00:00:00Z");
        assert_eq!(repo.last_activity(), repo.pushed_at);
    }
}
