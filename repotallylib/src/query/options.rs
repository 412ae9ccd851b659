//! Input options for browsing a loaded corpus.
//!
//! This module contains the filter state and the presentation knobs that
//! control what the view engine derives and how it pages it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::source::datefilter::DateRange;
use crate::source::record::Repository;

/// Default rows per page in every view.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Default number of members rendered per language group.
pub const DEFAULT_GROUP_CAP: usize = 10;

/// Default full width of a size bar, in pixels.
pub const DEFAULT_BAR_MAX_WIDTH: f64 = 200.0;

/// Visibility constraint of the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Any,
    Public,
    Private,
}

impl Visibility {
    pub fn admits(&self, repo: &Repository) -> bool {
        match self {
            Visibility::Any => true,
            Visibility::Public => !repo.is_private,
            Visibility::Private => repo.is_private,
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "any" | "all" => Ok(Visibility::Any),
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Unknown visibility: {}", s)),
        }
    }
}

/// Conjunction of constraints over the corpus.
///
/// The default value matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilter {
    /// Case-insensitive substring over name and description
    pub text: String,
    /// Exact primary-language match
    pub language: Option<String>,
    pub visibility: Visibility,
    /// Inclusive range over the creation date
    pub dates: DateRange,
}

impl ActiveFilter {
    /// Create a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: free-text search.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: exact language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder: visibility.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder: creation date range.
    pub fn dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    /// True when no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.language.is_none()
            && self.visibility == Visibility::Any
            && self.dates.is_unbounded()
    }

    /// Whether `repo` satisfies every constraint.
    pub fn matches(&self, repo: &Repository) -> bool {
        let needle = self.text.trim().to_lowercase();
        repo.matches_text(&needle)
            && self
                .language
                .as_deref()
                .is_none_or(|l| repo.primary_language.as_deref() == Some(l))
            && self.visibility.admits(repo)
            && self.dates.admits(repo)
    }
}

/// The three paginated views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    /// Newest first
    Timeline,
    /// Largest first, with size bars
    Size,
    /// Grouped by primary language
    Language,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Timeline, ViewKind::Size, ViewKind::Language];
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timeline" | "time" | "date" => Ok(ViewKind::Timeline),
            "size" => Ok(ViewKind::Size),
            "language" | "languages" | "lang" => Ok(ViewKind::Language),
            _ => Err(format!("Unknown view: {}", s)),
        }
    }
}

/// What a full-width size bar represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarScale {
    /// The largest repository in the filtered subset
    #[default]
    FilteredCorpus,
    /// The largest repository on the page being shown
    VisiblePage,
}

impl FromStr for BarScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "corpus" | "filtered" => Ok(BarScale::FilteredCorpus),
            "page" | "visible" => Ok(BarScale::VisiblePage),
            _ => Err(format!("Unknown bar scale: {}", s)),
        }
    }
}

/// Presentation options for the view engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    pub page_size: usize,
    pub group_cap: usize,
    pub bar_max_width: f64,
    pub bar_scale: BarScale,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            group_cap: DEFAULT_GROUP_CAP,
            bar_max_width: DEFAULT_BAR_MAX_WIDTH,
            bar_scale: BarScale::default(),
        }
    }
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows per page (at least 1).
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Members rendered per language group.
    pub fn group_cap(mut self, cap: usize) -> Self {
        self.group_cap = cap;
        self
    }

    pub fn bar_max_width(mut self, width: f64) -> Self {
        self.bar_max_width = width;
        self
    }

    pub fn bar_scale(mut self, scale: BarScale) -> Self {
        self.bar_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::record::parse_timestamp;

    fn repo(name: &str, private: bool, language: Option<&str>) -> Repository {
        let mut repo = Repository::new("octo", name);
        repo.is_private = private;
        repo.primary_language = language.map(str::to_string);
        repo.description = Some("A Command-Line Tool".to_string());
        repo.created_at = parse_timestamp("2024-03-10T08:00:00Z");
        repo
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = ActiveFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&repo("x", true, None)));
        assert!(filter.matches(&Repository::new("octo", "undated")));
    }

    #[test]
    fn test_text_is_case_insensitive_over_description() {
        let filter = ActiveFilter::new().text("command-LINE");
        assert!(filter.matches(&repo("x", false, None)));
        assert!(!ActiveFilter::new().text("gui").matches(&repo("x", false, None)));
    }

    #[test]
    fn test_language_is_exact() {
        let filter = ActiveFilter::new().language("Rust");
        assert!(filter.matches(&repo("x", false, Some("Rust"))));
        assert!(!filter.matches(&repo("x", false, Some("rust"))));
        assert!(!filter.matches(&repo("x", false, None)));
    }

    #[test]
    fn test_visibility_and_dates_combine() {
        let dates = DateRange::parse(Some("2024-03-10"), Some("2024-03-10")).unwrap();
        let filter = ActiveFilter::new()
            .visibility(Visibility::Private)
            .dates(dates);
        assert!(!filter.is_empty());
        assert!(filter.matches(&repo("x", true, None)));
        assert!(!filter.matches(&repo("x", false, None)));
        let mut undated = repo("x", true, None);
        undated.created_at = None;
        assert!(!filter.matches(&undated));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Visibility::from_str("PUBLIC").unwrap(), Visibility::Public);
        assert_eq!(ViewKind::from_str("lang").unwrap(), ViewKind::Language);
        assert_eq!(BarScale::from_str("page").unwrap(), BarScale::VisiblePage);
        assert!(ViewKind::from_str("graph").is_err());
    }

    #[test]
    fn test_view_options_defaults() {
        let opts = ViewOptions::default();
        assert_eq!(opts.page_size, 30);
        assert_eq!(opts.group_cap, 10);
        assert_eq!(opts.bar_max_width, 200.0);
        assert_eq!(opts.bar_scale, BarScale::FilteredCorpus);
        assert_eq!(ViewOptions::new().page_size(0).page_size, 1);
    }
}
