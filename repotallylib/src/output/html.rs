//! Self-contained HTML report.
//!
//! The page carries the whole corpus as an embedded JSON constant so it can
//! filter and page without a server. The overview tables and the first page
//! of each view are rendered up front with `tera`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};
use tracing::info;

use crate::error::RepotallyError;
use crate::query::options::{BarScale, ViewOptions};
use crate::query::view::{CorpusView, ViewSummary, OTHER_LANGUAGE};
use crate::source::record::Repository;
use crate::Result;

use super::payload::{report_file_name, ReportPayload};
use super::table::{format_count, ReportTable, TableRow};

const REPORT_TEMPLATE: &str = include_str!("../../templates/report.html.tera");

/// Languages shown in the overview table.
const LANGUAGE_ROWS: usize = 10;

#[derive(Serialize)]
struct HtmlTable {
    title: String,
    headers: Vec<String>,
    rows: Vec<TableRow>,
    footer: Option<TableRow>,
    legend: Option<String>,
}

impl From<ReportTable> for HtmlTable {
    fn from(table: ReportTable) -> Self {
        Self {
            title: table.title.unwrap_or_default(),
            headers: table.headers,
            rows: table.rows,
            footer: table.footer,
            legend: table.legend,
        }
    }
}

#[derive(Serialize)]
struct RepoLine {
    name: String,
    url: String,
    private: bool,
    language: Option<String>,
    created: String,
    stars: u64,
}

impl From<&Repository> for RepoLine {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            url: repo.url.clone(),
            private: repo.is_private,
            language: repo.primary_language.clone(),
            created: repo
                .created_date()
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
            stars: repo.stargazer_count,
        }
    }
}

#[derive(Serialize)]
struct SizeLine {
    name: String,
    url: String,
    size_mb: f64,
    bar_width: f64,
}

#[derive(Serialize)]
struct GroupLines {
    language: String,
    member_count: usize,
    repos: Vec<RepoLine>,
}

#[derive(Serialize)]
struct ReportContext {
    username: String,
    generated_at: String,
    date_filter: Option<String>,
    summary: ViewSummary,
    status_line: String,
    estimated_lines: String,
    estimate_note: String,
    tables: Vec<HtmlTable>,
    languages: Vec<String>,
    timeline: Vec<RepoLine>,
    sizes: Vec<SizeLine>,
    groups: Vec<GroupLines>,
    corpus_json: String,
    page_size: usize,
    group_cap: usize,
    bar_max_width: f64,
    bar_scale_page: bool,
    other_language: &'static str,
}

/// JSON safe to place inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

/// Render the report page for `payload`.
pub fn render_report(payload: &ReportPayload, options: &ViewOptions) -> Result<String> {
    let view = CorpusView::new(payload.repos.clone(), *options);
    let stats = &payload.stats;

    let tables = vec![
        ReportTable::overview(stats),
        ReportTable::languages(stats, LANGUAGE_ROWS),
        ReportTable::sizes(stats),
        ReportTable::years(stats),
        ReportTable::highlights(stats),
    ]
    .into_iter()
    .map(HtmlTable::from)
    .collect();

    let timeline = view
        .timeline_page()
        .items
        .into_iter()
        .map(RepoLine::from)
        .collect();
    let sizes = view
        .size_page()
        .items
        .into_iter()
        .map(|row| SizeLine {
            name: row.repo.name.clone(),
            url: row.repo.url.clone(),
            size_mb: row.repo.size_mb(),
            bar_width: row.bar_width,
        })
        .collect();
    let groups = view
        .language_page()
        .items
        .into_iter()
        .map(|slice| GroupLines {
            language: slice.language,
            member_count: slice.member_count,
            repos: slice.repos.into_iter().map(RepoLine::from).collect(),
        })
        .collect();

    let context = ReportContext {
        username: payload.username.clone(),
        generated_at: payload.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        date_filter: payload.date_filter.clone(),
        summary: view.summary(),
        status_line: view.status_line(),
        estimated_lines: format_count(stats.lines.total_lines),
        estimate_note: format!(
            "Line counts are heuristic estimates from {} sampled repositories, not counted figures.",
            stats.lines.sample_size
        ),
        tables,
        languages: view.languages(),
        timeline,
        sizes,
        groups,
        corpus_json: script_json(&payload.repos)?,
        page_size: options.page_size,
        group_cap: options.group_cap,
        bar_max_width: options.bar_max_width,
        bar_scale_page: options.bar_scale == BarScale::VisiblePage,
        other_language: OTHER_LANGUAGE,
    };

    let context =
        Context::from_serialize(&context).map_err(|e| RepotallyError::Template(e.to_string()))?;
    Tera::one_off(REPORT_TEMPLATE, &context, true)
        .map_err(|e| RepotallyError::Template(e.to_string()))
}

/// Render and write the report into `dir` under the conventional file name.
pub fn write_report(
    payload: &ReportPayload,
    options: &ViewOptions,
    dir: impl AsRef<Path>,
    stamp: &str,
) -> Result<PathBuf> {
    let html = render_report(payload, options)?;
    let path = dir.as_ref().join(report_file_name(&payload.username, stamp));
    fs::write(&path, html)?;
    info!("wrote {}", path.display());
    Ok(path)
}
