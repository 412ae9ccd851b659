//! Table-ready data structures for report output.
//!
//! This module provides `ReportTable`, a presentation-ready data structure
//! that can be directly consumed by renderers or serialized to JSON.
//!
//! The data flow is:
//! 1. Raw Data (CorpusStats, loaded corpus)
//! 2. CorpusView (filtered, sorted, paged)
//! 3. ReportTable (formatted strings for display)
//!
//! ReportTable is a pure presentation layer - it only formats data, no
//! filtering or sorting logic.

use serde::{Deserialize, Serialize};

use crate::data::analyzer::SampleOutcome;
use crate::data::sampler::Stratum;
use crate::data::stats::{CorpusStats, SizeBucket};
use crate::query::view::{CorpusView, LanguageSlice, Page, SizeRow};
use crate::source::record::Repository;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (metric, repository name, language, etc.)
    pub label: String,
    /// Values for each remaining column (as strings, ready for display)
    pub values: Vec<String>,
}

impl TableRow {
    fn new(label: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Table-ready report data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTable {
    /// Optional title (e.g., "Languages")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers, label column first
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Summary row (e.g., "Page 1 / 3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TableRow>,
    /// Optional note below the table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
}

impl ReportTable {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: Some(title.to_string()),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            footer: None,
            legend: None,
        }
    }

    /// Corpus-wide counts plus the estimated line figures.
    pub fn overview(stats: &CorpusStats) -> Self {
        let mut table = Self::new("Overview", &["Metric", "Value"]);
        let mut push =
            |label: &str, value: String| table.rows.push(TableRow::new(label, vec![value]));

        push("Repositories", format_count(stats.total));
        push("Public", format_count(stats.public));
        push("Private", format_count(stats.private));
        push("Forks", format_count(stats.fork));
        push("Archived", format_count(stats.archived));
        push("Total size", format_mb(stats.total_size_mb));
        push("Stars", format_count(stats.total_stars));
        push("Forked by others", format_count(stats.total_forks));
        push("Estimated lines", format!("~{}", format_count(stats.lines.total_lines)));
        push("Estimated files", format!("~{}", format_count(stats.lines.total_files)));

        table.legend = Some(estimate_legend(stats));
        table
    }

    /// Top languages by repository count, with estimated lines.
    pub fn languages(stats: &CorpusStats, limit: usize) -> Self {
        let mut table = Self::new("Languages", &["Language", "Repositories", "Est. lines"]);
        for (language, count) in stats.top_languages(limit) {
            let lines = stats
                .lines
                .lines_by_language
                .get(&language)
                .map_or_else(|| "-".to_string(), |l| format!("~{}", format_count(*l)));
            table
                .rows
                .push(TableRow::new(language, vec![format_count(count), lines]));
        }
        table.legend = Some(estimate_legend(stats));
        table
    }

    /// Repository counts per size bucket.
    pub fn sizes(stats: &CorpusStats) -> Self {
        let mut table = Self::new("Sizes", &["Size", "Repositories"]);
        for bucket in SizeBucket::ALL {
            table.rows.push(TableRow::new(
                bucket.label(),
                vec![format_count(stats.size_distribution.count(bucket))],
            ));
        }
        table.footer = Some(TableRow::new(
            "Total",
            vec![format_count(stats.size_distribution.total())],
        ));
        table
    }

    /// Repositories created per year.
    pub fn years(stats: &CorpusStats) -> Self {
        let mut table = Self::new("Created per year", &["Year", "Repositories"]);
        for (year, count) in &stats.by_year {
            table
                .rows
                .push(TableRow::new(year.clone(), vec![format_count(*count)]));
        }
        table
    }

    /// Repositories created in each of the last `n` active months.
    pub fn months(stats: &CorpusStats, n: usize) -> Self {
        let mut table = Self::new("Recent months", &["Month", "Repositories"]);
        for (month, count) in stats.recent_months(n) {
            table.rows.push(TableRow::new(month, vec![format_count(count)]));
        }
        table
    }

    /// Newest, largest and oldest repositories by name.
    pub fn highlights(stats: &CorpusStats) -> Self {
        let mut table = Self::new(
            "Highlights",
            &["#", "Recently created", "Largest", "Oldest"],
        );
        let rows = stats
            .recent
            .len()
            .max(stats.largest.len())
            .max(stats.oldest.len());
        for i in 0..rows {
            let cell = |names: &[String]| names.get(i).cloned().unwrap_or_default();
            table.rows.push(TableRow::new(
                (i + 1).to_string(),
                vec![cell(&stats.recent), cell(&stats.largest), cell(&stats.oldest)],
            ));
        }
        table
    }

    /// The inspected repositories and what each contributed.
    pub fn samples(samples: &[SampleOutcome]) -> Self {
        let mut table = Self::new(
            "Sampled repositories",
            &["Repository", "Picked as", "Files", "Est. lines"],
        );
        for sample in samples {
            let lines = if sample.failed {
                "failed".to_string()
            } else {
                format_count(sample.estimate.total_lines)
            };
            table.rows.push(TableRow::new(
                sample.name.clone(),
                vec![
                    stratum_label(sample.stratum).to_string(),
                    format_count(sample.estimate.file_count),
                    lines,
                ],
            ));
        }
        table
    }

    /// Summary of the filtered subset of a view.
    pub fn view_summary(view: &CorpusView) -> Self {
        let summary = view.summary();
        let mut table = Self::new("Summary", &["Metric", "Value"]);
        table.rows = vec![
            TableRow::new("Repositories", vec![format_count(summary.total)]),
            TableRow::new("Public", vec![format_count(summary.public)]),
            TableRow::new("Private", vec![format_count(summary.private)]),
            TableRow::new("Total size", vec![format_mb(summary.total_size_mb)]),
            TableRow::new("Stars", vec![format_count(summary.total_stars)]),
        ];
        table.legend = Some(format!("Showing {}", view.status_line()));
        table
    }

    /// A timeline page.
    pub fn timeline_page(page: &Page<&Repository>) -> Self {
        let mut table = Self::new(
            "Timeline",
            &["Repository", "Created", "Language", "Visibility", "Stars"],
        );
        for repo in &page.items {
            table.rows.push(TableRow::new(
                repo.name.clone(),
                vec![
                    format_created(repo),
                    language_of(repo),
                    visibility_of(repo),
                    format_count(repo.stargazer_count),
                ],
            ));
        }
        table.footer = Some(page_footer(page));
        table
    }

    /// A size page, bars rendered as text.
    pub fn size_page(page: &Page<SizeRow<'_>>, bar_max_width: f64) -> Self {
        let mut table = Self::new("By size", &["Repository", "Size", "Bar"]);
        for row in &page.items {
            table.rows.push(TableRow::new(
                row.repo.name.clone(),
                vec![
                    format_mb(row.repo.size_mb()),
                    text_bar(row.bar_width, bar_max_width),
                ],
            ));
        }
        table.footer = Some(page_footer(page));
        table
    }

    /// A language page; each group slice is headed by its full member count.
    pub fn language_page(page: &Page<LanguageSlice<'_>>) -> Self {
        let mut table = Self::new("By language", &["Repository", "Created", "Visibility"]);
        for slice in &page.items {
            table.rows.push(TableRow::new(
                format!("{} ({})", slice.language, slice.member_count),
                vec![String::new(), String::new()],
            ));
            for repo in &slice.repos {
                table.rows.push(TableRow::new(
                    format!("  {}", repo.name),
                    vec![format_created(repo), visibility_of(repo)],
                ));
            }
        }
        table.footer = Some(page_footer(page));
        table
    }
}

/// Thousands-separated integer.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_mb(mb: f64) -> String {
    format!("{:.1} MB", mb)
}

/// Blocks proportional to `width / full`, 20 characters at full width.
pub fn text_bar(width: f64, full: f64) -> String {
    const CELLS: f64 = 20.0;
    if full <= 0.0 || width <= 0.0 {
        return String::new();
    }
    let cells = (width / full * CELLS).round().clamp(1.0, CELLS) as usize;
    "█".repeat(cells)
}

fn estimate_legend(stats: &CorpusStats) -> String {
    if stats.lines.sample_size == 0 {
        "Line figures: no repositories were sampled".to_string()
    } else {
        format!(
            "Line figures are estimates extrapolated from {} sampled repositories",
            stats.lines.sample_size
        )
    }
}

fn stratum_label(stratum: Stratum) -> &'static str {
    match stratum {
        Stratum::Recent => "recent",
        Stratum::Largest => "largest",
        Stratum::Random => "random",
        Stratum::Census => "all",
    }
}

fn page_footer<T>(page: &Page<T>) -> TableRow {
    TableRow::new(
        format!("Page {} / {}", page.page, page.total_pages.max(1)),
        vec![format!("{} items", page.total_items)],
    )
}

fn format_created(repo: &Repository) -> String {
    repo.created_at
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn language_of(repo: &Repository) -> String {
    repo.primary_language.clone().unwrap_or_else(|| "-".to_string())
}

fn visibility_of(repo: &Repository) -> String {
    let label = if repo.is_private { "private" } else { "public" };
    label.to_string()
}
