//! The corpus view engine: filter, summarize, and page a loaded corpus.
//!
//! A [`CorpusView`] owns its corpus and never mutates it. Applying a filter
//! recomputes, in one pass, the filtered subset and its lightweight summary,
//! rebuilds the three orderings, and resets every page cursor to 1.
//!
//! The pipeline is:
//! 1. Corpus (loaded report payload)
//! 2. CorpusView (filtered, summarized, sorted, paged)
//! 3. Table rows (formatted strings for display)

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::source::record::Repository;

use super::options::{ActiveFilter, BarScale, ViewKind, ViewOptions};

/// Group label for records without a primary language.
pub const OTHER_LANGUAGE: &str = "Other";

/// Numbered buttons shown around the current page.
pub const PAGE_WINDOW_BUTTONS: usize = 7;

/// Statistics recomputed over the filtered subset on every filter change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub total: u64,
    pub public: u64,
    pub private: u64,
    pub total_size_mb: f64,
    pub total_stars: u64,
}

impl ViewSummary {
    fn add(&mut self, repo: &Repository) {
        self.total += 1;
        if repo.is_private {
            self.private += 1;
        } else {
            self.public += 1;
        }
        self.total_size_mb += repo.size_mb();
        self.total_stars += repo.stargazer_count;
    }
}

/// Cursor over `total_items` in pages of `page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    total_items: usize,
    page_size: usize,
    current: usize,
}

impl Paginator {
    pub fn new(total_items: usize, page_size: usize) -> Self {
        Self {
            total_items,
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// `ceil(total_items / page_size)`; zero for an empty list.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Move to page `p`. Out-of-range requests leave the cursor where it is.
    pub fn go_to(&mut self, p: usize) -> bool {
        if p < 1 || p > self.total_pages() {
            return false;
        }
        self.current = p;
        true
    }

    /// Item index range of the current page.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.current - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    /// Numbered-button layout around the current page.
    pub fn window(&self) -> PageWindow {
        PageWindow::around(self.current, self.total_pages(), PAGE_WINDOW_BUTTONS)
    }
}

/// Which page buttons a renderer should draw.
///
/// Renderers show nothing at all when `total_pages <= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub current: usize,
    pub total_pages: usize,
    /// Consecutive numbered pages, current included
    pub pages: Vec<usize>,
    /// Draw a separate "1" button before `pages`
    pub show_first: bool,
    /// Draw an ellipsis between "1" and `pages`
    pub leading_gap: bool,
    /// Draw an ellipsis between `pages` and the last page
    pub trailing_gap: bool,
    /// Draw a separate last-page button after `pages`
    pub show_last: bool,
}

impl PageWindow {
    pub fn around(current: usize, total_pages: usize, max_buttons: usize) -> Self {
        if total_pages == 0 {
            return Self {
                current,
                total_pages,
                pages: Vec::new(),
                show_first: false,
                leading_gap: false,
                trailing_gap: false,
                show_last: false,
            };
        }

        let max_buttons = max_buttons.max(1);
        let mut start = current.saturating_sub(max_buttons / 2).max(1);
        let end = (start + max_buttons - 1).min(total_pages);
        if end + 1 - start < max_buttons {
            start = (end + 1).saturating_sub(max_buttons).max(1);
        }

        Self {
            current,
            total_pages,
            pages: (start..=end).collect(),
            show_first: start > 1,
            leading_gap: start > 2,
            trailing_gap: end + 1 < total_pages,
            show_last: end < total_pages,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }
}

/// One page of a view.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub view: ViewKind,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

/// Size-view row: a repository and its bar width.
#[derive(Debug, Clone, Serialize)]
pub struct SizeRow<'a> {
    pub repo: &'a Repository,
    pub bar_width: f64,
}

/// The part of one language group that falls on a page.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageSlice<'a> {
    pub language: String,
    /// Members of the whole group, not just the rendered ones
    pub member_count: usize,
    pub repos: Vec<&'a Repository>,
}

#[derive(Debug, Clone)]
struct LanguageGroup {
    language: String,
    members: Vec<usize>,
}

/// Bar width for `size` against `max`, clamped to `full`.
pub fn bar_width(size_kb: u64, max_kb: u64, full: f64) -> f64 {
    if max_kb == 0 {
        return 0.0;
    }
    (size_kb as f64 / max_kb as f64 * full).min(full)
}

/// Filterable, paginated views over an owned corpus.
#[derive(Debug, Clone)]
pub struct CorpusView {
    corpus: Vec<Repository>,
    options: ViewOptions,
    filter: ActiveFilter,
    summary: ViewSummary,
    /// Filtered indices, corpus order
    filtered: Vec<usize>,
    /// Filtered indices, newest first (undated last)
    timeline: Vec<usize>,
    /// Filtered indices, largest first
    by_size: Vec<usize>,
    /// Groups by descending size, members in corpus order
    groups: Vec<LanguageGroup>,
    cursors: HashMap<ViewKind, Paginator>,
}

impl CorpusView {
    /// Load a corpus with the match-all filter.
    pub fn new(corpus: Vec<Repository>, options: ViewOptions) -> Self {
        let mut view = Self {
            corpus,
            options,
            filter: ActiveFilter::new(),
            summary: ViewSummary::default(),
            filtered: Vec::new(),
            timeline: Vec::new(),
            by_size: Vec::new(),
            groups: Vec::new(),
            cursors: HashMap::new(),
        };
        view.rederive();
        view
    }

    pub fn corpus(&self) -> &[Repository] {
        &self.corpus
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn filter(&self) -> &ActiveFilter {
        &self.filter
    }

    /// Replace the active filter wholesale and re-derive everything.
    pub fn apply_filter(&mut self, filter: ActiveFilter) {
        self.filter = filter;
        self.rederive();
    }

    /// Back to the match-all filter.
    pub fn reset_filter(&mut self) {
        self.apply_filter(ActiveFilter::new());
    }

    pub fn summary(&self) -> ViewSummary {
        self.summary
    }

    /// Filtered records in corpus order.
    pub fn filtered(&self) -> impl Iterator<Item = &Repository> + '_ {
        self.filtered.iter().map(|&i| &self.corpus[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Distinct primary languages across the whole corpus, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .corpus
            .iter()
            .filter_map(|r| r.primary_language.clone())
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }

    /// "all N" or "M of N".
    pub fn status_line(&self) -> String {
        if self.filtered.len() == self.corpus.len() {
            format!("all {}", self.corpus.len())
        } else {
            format!("{} of {}", self.filtered.len(), self.corpus.len())
        }
    }

    pub fn current_page(&self, kind: ViewKind) -> usize {
        self.cursor(kind).current()
    }

    pub fn total_pages(&self, kind: ViewKind) -> usize {
        self.cursor(kind).total_pages()
    }

    pub fn total_items(&self, kind: ViewKind) -> usize {
        self.cursor(kind).total_items()
    }

    pub fn page_window(&self, kind: ViewKind) -> PageWindow {
        self.cursor(kind).window()
    }

    /// Move `kind` to page `p`; a no-op returning false when out of range.
    pub fn change_page(&mut self, kind: ViewKind, p: usize) -> bool {
        let moved = self
            .cursors
            .get_mut(&kind)
            .is_some_and(|cursor| cursor.go_to(p));
        if !moved {
            debug!("page {} of {:?} is out of range", p, kind);
        }
        moved
    }

    /// Current timeline page: newest first.
    pub fn timeline_page(&self) -> Page<&Repository> {
        let cursor = self.cursor(ViewKind::Timeline);
        let items = self.timeline[cursor.range()]
            .iter()
            .map(|&i| &self.corpus[i])
            .collect();
        self.page(ViewKind::Timeline, items)
    }

    /// Current size page: largest first, with bar widths.
    pub fn size_page(&self) -> Page<SizeRow<'_>> {
        let cursor = self.cursor(ViewKind::Size);
        let slice = &self.by_size[cursor.range()];
        let max_kb = match self.options.bar_scale {
            BarScale::FilteredCorpus => self.by_size.first(),
            BarScale::VisiblePage => slice.first(),
        }
        .map_or(0, |&i| self.corpus[i].disk_usage_kb);

        let items = slice
            .iter()
            .map(|&i| {
                let repo = &self.corpus[i];
                SizeRow {
                    repo,
                    bar_width: bar_width(repo.disk_usage_kb, max_kb, self.options.bar_max_width),
                }
            })
            .collect();
        self.page(ViewKind::Size, items)
    }

    /// Current language page.
    ///
    /// Pagination counts rendered members, so a group may start on one page
    /// and continue on the next.
    pub fn language_page(&self) -> Page<LanguageSlice<'_>> {
        let range = self.cursor(ViewKind::Language).range();
        let cap = self.options.group_cap;
        let mut items: Vec<LanguageSlice<'_>> = Vec::new();
        let mut offset = 0;

        for group in &self.groups {
            if offset >= range.end {
                break;
            }
            let rendered = group.members.len().min(cap);
            let group_end = offset + rendered;
            if group_end > range.start {
                let from = range.start.saturating_sub(offset);
                let to = (range.end - offset).min(rendered);
                items.push(LanguageSlice {
                    language: group.language.clone(),
                    member_count: group.members.len(),
                    repos: group.members[from..to]
                        .iter()
                        .map(|&i| &self.corpus[i])
                        .collect(),
                });
            }
            offset = group_end;
        }

        self.page(ViewKind::Language, items)
    }

    fn page<T>(&self, kind: ViewKind, items: Vec<T>) -> Page<T> {
        let cursor = self.cursor(kind);
        Page {
            view: kind,
            page: cursor.current(),
            total_pages: cursor.total_pages(),
            total_items: cursor.total_items(),
            items,
        }
    }

    fn cursor(&self, kind: ViewKind) -> Paginator {
        self.cursors
            .get(&kind)
            .copied()
            .unwrap_or_else(|| Paginator::new(0, self.options.page_size))
    }

    fn rederive(&mut self) {
        let mut summary = ViewSummary::default();
        let mut filtered = Vec::new();
        for (i, repo) in self.corpus.iter().enumerate() {
            if self.filter.matches(repo) {
                summary.add(repo);
                filtered.push(i);
            }
        }

        let mut timeline = filtered.clone();
        // Stable: equal timestamps keep corpus order; `None` sorts last.
        timeline.sort_by_key(|&i| Reverse(self.corpus[i].created_at));

        let mut by_size = filtered.clone();
        by_size.sort_by_key(|&i| Reverse(self.corpus[i].disk_usage_kb));

        let mut groups: Vec<LanguageGroup> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for &i in &filtered {
            let language = self.corpus[i]
                .primary_language
                .as_deref()
                .unwrap_or(OTHER_LANGUAGE);
            let slot = *slots.entry(language).or_insert_with(|| {
                groups.push(LanguageGroup {
                    language: language.to_string(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].members.push(i);
        }
        groups.sort_by_key(|g| Reverse(g.members.len()));

        let cap = self.options.group_cap;
        let language_items = groups.iter().map(|g| g.members.len().min(cap)).sum();
        let page_size = self.options.page_size;

        self.cursors = HashMap::from([
            (ViewKind::Timeline, Paginator::new(filtered.len(), page_size)),
            (ViewKind::Size, Paginator::new(filtered.len(), page_size)),
            (ViewKind::Language, Paginator::new(language_items, page_size)),
        ]);
        debug!(
            "filter matched {} of {} repositories",
            filtered.len(),
            self.corpus.len()
        );

        self.summary = summary;
        self.filtered = filtered;
        self.timeline = timeline;
        self.by_size = by_size;
        self.groups = groups;
    }
}
