//! Template rendering for CLI output using outstanding

use console::{measure_text_width, pad_str, truncate_str, Alignment, Style};
use outstanding::{render_auto, render_with_output, Theme};
use repotallylib::{PageWindow, ReportTable, TableRow};
use serde::Serialize;

/// Include template at compile time
const TABLE_TEMPLATE: &str = include_str!("../templates/report_table.jinja");

/// Widest label column before names are truncated
const MAX_LABEL_WIDTH: usize = 48;

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Data context for the table template, every line pre-formatted
#[derive(Debug, Serialize)]
struct TableContext {
    title: Option<String>,
    header: String,
    separator: String,
    rows: Vec<String>,
    footer: Option<String>,
    legend: Option<String>,
    /// Page buttons under a paged view
    buttons: Option<String>,
}

/// Map the `--output` value onto a render mode.
pub fn output_mode(value: &str) -> OutputMode {
    match value {
        "json" => OutputMode::Json,
        "text" => OutputMode::Text,
        "term" => OutputMode::Term,
        "term-debug" => OutputMode::TermDebug,
        _ => OutputMode::Auto,
    }
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new()
        .add("title", Style::new().bold().cyan())
        .add("header", Style::new().bold())
        .add("muted", Style::new().dim())
}

/// Truncate a name to fit within max_len, adding ".." if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    if measure_text_width(name) > max_len {
        truncate_str(name, max_len, "..").to_string()
    } else {
        name.to_string()
    }
}

fn column_widths(table: &ReportTable) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| measure_text_width(h)).collect();
    for row in table.rows.iter().chain(table.footer.iter()) {
        let cells = std::iter::once(&row.label).chain(row.values.iter());
        for (i, cell) in cells.enumerate() {
            let width = measure_text_width(cell);
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(width),
                None => widths.push(width),
            }
        }
    }
    if let Some(first) = widths.first_mut() {
        *first = (*first).min(MAX_LABEL_WIDTH);
    }
    widths
}

fn format_cells(label: &str, values: &[String], widths: &[usize]) -> String {
    let label_width = widths.first().copied().unwrap_or(0);
    let mut line = pad_str(
        &truncate_name(label, label_width),
        label_width,
        Alignment::Left,
        None,
    )
    .to_string();
    for (value, width) in values.iter().zip(widths.iter().skip(1)) {
        line.push_str("  ");
        line.push_str(&pad_str(value, *width, Alignment::Right, None));
    }
    line.trim_end().to_string()
}

fn format_row(row: &TableRow, widths: &[usize]) -> String {
    format_cells(&row.label, &row.values, widths)
}

fn to_context(table: &ReportTable, window: Option<&PageWindow>) -> TableContext {
    let widths = column_widths(table);
    let (label_header, value_headers): (&str, &[String]) = match table.headers.split_first() {
        Some((first, rest)) => (first, rest),
        None => ("", &[]),
    };

    TableContext {
        title: table.title.clone(),
        header: format_cells(label_header, value_headers, &widths),
        separator: "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)),
        rows: table.rows.iter().map(|r| format_row(r, &widths)).collect(),
        footer: table.footer.as_ref().map(|r| format_row(r, &widths)),
        legend: table.legend.clone(),
        buttons: window
            .map(render_page_window)
            .filter(|buttons| !buttons.is_empty()),
    }
}

/// Render one table, with page buttons when it shows a paged view.
pub fn render_table(
    table: &ReportTable,
    window: Option<&PageWindow>,
    output_mode: OutputMode,
) -> anyhow::Result<String> {
    let context = to_context(table, window);
    render_with_output(TABLE_TEMPLATE, &context, &create_theme(), output_mode)
        .map_err(|e| anyhow::anyhow!("rendering {}: {}", table.title.as_deref().unwrap_or("table"), e))
}

/// Render several tables separated by blank lines.
pub fn render_tables(
    sections: &[(ReportTable, Option<PageWindow>)],
    output_mode: OutputMode,
) -> anyhow::Result<String> {
    let rendered = sections
        .iter()
        .map(|(table, window)| render_table(table, window.as_ref(), output_mode))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(rendered
        .iter()
        .map(|t| t.trim_end_matches('\n'))
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n")
}

/// Serialize `data` through outstanding's structured output.
pub fn render_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    let rendered = render_auto(TABLE_TEMPLATE, data, &create_theme(), OutputMode::Json)
        .map_err(|e| anyhow::anyhow!("rendering JSON: {}", e))?;
    Ok(format!("{}\n", rendered.trim_end()))
}

/// Page buttons as text, e.g. `< 1 ... 4 5 [6] 7 8 ... 20 >`.
pub fn render_page_window(window: &PageWindow) -> String {
    if window.total_pages <= 1 {
        return String::new();
    }

    let mut parts: Vec<String> = Vec::new();
    parts.push(if window.has_prev() { "<" } else { " " }.to_string());
    if window.show_first {
        parts.push("1".to_string());
        if window.leading_gap {
            parts.push("...".to_string());
        }
    }
    for page in &window.pages {
        if *page == window.current {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if window.show_last {
        if window.trailing_gap {
            parts.push("...".to_string());
        }
        parts.push(window.total_pages.to_string());
    }
    parts.push(if window.has_next() { ">" } else { " " }.to_string());
    parts.join(" ").trim().to_string()
}
