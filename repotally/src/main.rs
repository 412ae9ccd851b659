//! # repotally
//!
//! A CLI tool that summarizes a GitHub user's repositories and estimates how
//! much code they hold, without cloning anything.
//!
//! ## Overview
//!
//! repotally is built on top of repotallylib. It lists repositories through the
//! `gh` CLI (or a JSON dump of one), aggregates counts, sizes, languages and
//! creation dates, and extrapolates a line estimate from a small stratified
//! sample. Every run writes a JSON payload and a self-contained HTML report.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze the authenticated user
//! repotally
//!
//! # Analyze someone else, inspecting 10 repositories
//! repotally octocat --sample 10
//!
//! # Only repositories created in the last 90 days
//! repotally octocat --last-days 90
//!
//! # Work offline from a `gh repo list --json` dump
//! repotally analyze octocat --catalog repos.json
//!
//! # Browse a saved payload: filter and page the three views
//! repotally view github_data_octocat_20240601_120000.json --language Rust --page 2
//! ```
//!
//! Logging goes to stderr and is controlled with `REPOTALLY_LOG`
//! (e.g. `REPOTALLY_LOG=repotallylib=debug`).

mod render;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{Local, Utc};
use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use repotallylib::{
    file_stamp, run_analysis, write_report, ActiveFilter, AnalyzeOptions, BarScale, Catalog,
    CorpusView, DateRange, DateWindow, EstimationMode, GhCli, JsonCatalog, PageWindow,
    ReportPayload, ReportTable, ViewKind, ViewOptions, Visibility,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use render::{output_mode, render_json, render_tables, OutputMode};

/// Environment variable holding the log filter
const LOG_ENV: &str = "REPOTALLY_LOG";

/// Languages listed in the terminal overview
const LANGUAGE_ROWS: usize = 10;

/// Months listed in the terminal overview
const MONTH_ROWS: usize = 6;

/// Date range flags shared by `analyze` and `view`
fn date_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("start-date")
            .long("start-date")
            .value_name("YYYY-MM-DD")
            .help("Only repositories created on or after this date"),
    )
    .arg(
        Arg::new("end-date")
            .long("end-date")
            .value_name("YYYY-MM-DD")
            .help("Only repositories created on or before this date"),
    )
}

/// Flags of the analyze command; the root command accepts them too
fn analyze_args(cmd: Command) -> Command {
    let cmd = cmd
        .arg(Arg::new("owner").help("User or organization to analyze (defaults to the gh login)"))
        .arg(
            Arg::new("sample")
                .short('s')
                .long("sample")
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("Repositories to inspect for line estimates (0 disables estimation; defaults to 0 with --catalog)"),
        )
        .arg(
            Arg::new("delay-ms")
                .long("delay-ms")
                .value_parser(value_parser!(u64))
                .default_value("500")
                .help("Pause after each inspection call, in milliseconds"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_parser(["bytes", "extensions"])
                .default_value("extensions")
                .help("Estimation signal: language bytes or file extensions"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for the random part of the sample"),
        )
        .arg(
            Arg::new("last-days")
                .long("last-days")
                .value_parser(value_parser!(u32))
                .help("Only repositories created in the last N days"),
        )
        .arg(
            Arg::new("last-year")
                .long("last-year")
                .action(ArgAction::SetTrue)
                .help("Only repositories created in the last 365 days"),
        );
    date_args(cmd)
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("FILE")
                .help("Read repositories from a JSON file instead of gh"),
        )
        .arg(
            Arg::new("output-dir")
                .short('d')
                .long("output-dir")
                .default_value(".")
                .help("Directory for the data and report files"),
        )
        .arg(
            Arg::new("no-html")
                .long("no-html")
                .action(ArgAction::SetTrue)
                .help("Skip the HTML report"),
        )
}

/// Build the clap Command structure
fn build_command() -> Command {
    let root = Command::new("repotally")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Estimate code volume across a GitHub user's repositories")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .global(true)
                .value_parser(["table", "term", "text", "term-debug", "json"])
                .default_value("table")
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug details to stderr"),
        );

    let view = Command::new("view")
        .about("Filter and page a saved payload")
        .arg(
            Arg::new("payload")
                .required(true)
                .help("A github_data_*.json file written by analyze"),
        )
        .arg(
            Arg::new("view")
                .long("view")
                .value_parser(["timeline", "size", "language", "summary", "all"])
                .default_value("all")
                .help("Which view to print"),
        )
        .arg(
            Arg::new("page")
                .short('p')
                .long("page")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Page to show (1-based)"),
        )
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .help("Case-insensitive match on name or description"),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .help("Exact primary language"),
        )
        .arg(
            Arg::new("visibility")
                .long("visibility")
                .value_parser(["any", "public", "private"])
                .default_value("any")
                .help("Public or private repositories only"),
        )
        .arg(
            Arg::new("page-size")
                .long("page-size")
                .value_parser(value_parser!(usize))
                .default_value("30")
                .help("Rows per page"),
        )
        .arg(
            Arg::new("bar-scale")
                .long("bar-scale")
                .value_parser(["corpus", "page"])
                .default_value("corpus")
                .help("Scale size bars to the filtered corpus or the visible page"),
        );

    analyze_args(root)
        .subcommand(analyze_args(
            Command::new("analyze").about("Analyze repositories (default command)"),
        ))
        .subcommand(date_args(view))
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "repotally=debug,repotallylib=debug"
    } else {
        "repotally=info,repotallylib=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn get_str<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(|s| s.as_str())
}

fn parse_arg<T>(matches: &ArgMatches, id: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match get_str(matches, id) {
        Some(value) => value.parse().map_err(|e: String| anyhow!(e)),
        None => Ok(T::default()),
    }
}

fn date_range(matches: &ArgMatches) -> anyhow::Result<DateRange> {
    Ok(DateRange::parse(
        get_str(matches, "start-date"),
        get_str(matches, "end-date"),
    )?)
}

/// Handler for the analyze command
fn analyze_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<String> {
    let window = DateWindow::from_parts(
        matches.get_one::<u32>("last-days").copied(),
        matches.get_flag("last-year"),
        date_range(matches)?,
    );
    let catalog_path = get_str(matches, "catalog");
    // Offline runs have no inspector to sample with unless asked explicitly.
    let sample_size = match matches.value_source("sample") {
        Some(ValueSource::DefaultValue) | None if catalog_path.is_some() => 0,
        _ => matches.get_one::<usize>("sample").copied().unwrap_or(5),
    };
    let options = AnalyzeOptions::new()
        .sample_size(sample_size)
        .call_delay(Duration::from_millis(
            matches.get_one::<u64>("delay-ms").copied().unwrap_or(500),
        ))
        .mode(parse_arg::<EstimationMode>(matches, "mode")?)
        .window(window);

    let mut rng = match matches.get_one::<u64>("seed") {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    };

    let gh = GhCli::new();
    let catalog: Box<dyn Catalog> = match catalog_path {
        Some(path) => Box::new(JsonCatalog::new(path)),
        None => Box::new(gh.clone()),
    };

    let owner = get_str(matches, "owner");
    if window.is_active() {
        info!("date filter: {}", window.describe());
    }
    let analysis = run_analysis(catalog.as_ref(), &gh, owner, &options, Utc::now(), &mut rng)?;
    if analysis.public_only {
        info!(
            "{} is not the authenticated user; only public repositories are listed",
            analysis.username
        );
    }

    let samples = analysis.samples.clone();
    let payload = ReportPayload::from_analysis(analysis, Utc::now());

    let dir = PathBuf::from(get_str(matches, "output-dir").unwrap_or("."));
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let stamp = file_stamp(&Local::now());
    let mut written = vec![payload.save_in(&dir, &stamp)?];
    if !matches.get_flag("no-html") {
        written.push(write_report(&payload, &ViewOptions::default(), &dir, &stamp)?);
    }

    if matches!(mode, OutputMode::Json) {
        return render_json(&payload);
    }

    let stats = &payload.stats;
    let mut tables = vec![
        ReportTable::overview(stats),
        ReportTable::languages(stats, LANGUAGE_ROWS),
        ReportTable::sizes(stats),
        ReportTable::years(stats),
        ReportTable::months(stats, MONTH_ROWS),
        ReportTable::highlights(stats),
    ];
    if !samples.is_empty() {
        tables.push(ReportTable::samples(&samples));
    }
    let sections: Vec<(ReportTable, Option<PageWindow>)> =
        tables.into_iter().map(|t| (t, None)).collect();

    let mut output = render_tables(&sections, mode)?;
    output.push('\n');
    for path in written {
        output.push_str(&format!("Saved {}\n", path.display()));
    }
    Ok(output)
}

/// Handler for the view command
fn view_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<String> {
    let path = get_str(matches, "payload").ok_or_else(|| anyhow!("no payload file given"))?;
    let payload =
        ReportPayload::load(path).with_context(|| format!("loading payload {}", path))?;

    let options = ViewOptions::new()
        .page_size(matches.get_one::<usize>("page-size").copied().unwrap_or(30))
        .bar_scale(parse_arg::<BarScale>(matches, "bar-scale")?);

    let mut filter = ActiveFilter::new()
        .visibility(parse_arg::<Visibility>(matches, "visibility")?)
        .dates(date_range(matches)?);
    if let Some(text) = get_str(matches, "text") {
        filter = filter.text(text);
    }
    if let Some(language) = get_str(matches, "language") {
        filter = filter.language(language);
    }

    let mut view = CorpusView::new(payload.repos, options);
    view.apply_filter(filter);

    let selected = get_str(matches, "view").unwrap_or("all");
    let kinds: Vec<ViewKind> = match selected {
        "all" => ViewKind::ALL.to_vec(),
        "summary" => Vec::new(),
        other => vec![other.parse().map_err(|e: String| anyhow!(e))?],
    };

    let page = matches.get_one::<usize>("page").copied().unwrap_or(1);
    for kind in &kinds {
        if page != 1 && !view.change_page(*kind, page) {
            warn!(
                "page {} is out of range for the {:?} view ({} pages)",
                page,
                kind,
                view.total_pages(*kind)
            );
        }
    }

    let mut sections: Vec<(ReportTable, Option<PageWindow>)> =
        vec![(ReportTable::view_summary(&view), None)];
    for kind in kinds {
        let table = match kind {
            ViewKind::Timeline => ReportTable::timeline_page(&view.timeline_page()),
            ViewKind::Size => ReportTable::size_page(&view.size_page(), options.bar_max_width),
            ViewKind::Language => ReportTable::language_page(&view.language_page()),
        };
        sections.push((table, Some(view.page_window(kind))));
    }

    if matches!(mode, OutputMode::Json) {
        let tables: Vec<&ReportTable> = sections.iter().map(|(t, _)| t).collect();
        return render_json(&tables);
    }
    render_tables(&sections, mode)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    let (name, sub) = matches.subcommand().unwrap_or(("analyze", &matches));

    init_logging(sub.get_flag("verbose"));
    let mode = output_mode(get_str(sub, "output").unwrap_or("table"));

    let result = match name {
        "view" => view_handler(sub, mode),
        _ => analyze_handler(sub, mode),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
