//! Line-count estimation from cheap proxy signals.
//!
//! Both estimators are order-of-magnitude heuristics built on fixed
//! per-language and per-extension averages. Their output is always reported
//! as an estimate, never as a counted figure.
//!
//! - **Bytes**: `lines = bytes / average line width` per language.
//! - **Extensions**: each file contributes an average line count for its
//!   extension; only the first [`FILE_SAMPLE_CAP`] paths are classified and
//!   the result is scaled up to the full file count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::source::inspect::RepoSignal;

/// Paths classified per repository before extrapolating.
pub const FILE_SAMPLE_CAP: usize = 50;

/// Average line width for languages missing from [`bytes_per_line`].
pub const DEFAULT_BYTES_PER_LINE: u64 = 35;

/// Average file length for extensions missing from [`lines_per_file`].
pub const DEFAULT_LINES_PER_FILE: u64 = 80;

/// Lines per file assumed when deriving a file count from byte totals.
pub const LINES_PER_ESTIMATED_FILE: u64 = 200;

/// Estimated size of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEstimate {
    pub total_lines: u64,
    pub file_count: u64,
    pub lines_by_language: BTreeMap<String, u64>,
}

impl LineEstimate {
    /// `{0, 0, {}}`, the result for any missing or unusable signal.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.total_lines == 0 && self.file_count == 0 && self.lines_by_language.is_empty()
    }
}

/// Average bytes per line for a language.
pub fn bytes_per_line(language: &str) -> u64 {
    match language {
        "Python" => 30,
        "JavaScript" => 35,
        "TypeScript" => 40,
        "HTML" => 50,
        "CSS" => 30,
        "Java" => 40,
        "C" => 35,
        "C++" => 40,
        "Go" => 30,
        "Ruby" => 30,
        "PHP" => 35,
        "Shell" => 25,
        "PowerShell" => 35,
        _ => DEFAULT_BYTES_PER_LINE,
    }
}

/// Language label for a known (lowercase) extension.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext {
        "py" => "Python",
        "js" => "JavaScript",
        "ts" => "TypeScript",
        "java" => "Java",
        "cpp" => "C++",
        "c" => "C",
        "cs" => "C#",
        "rb" => "Ruby",
        "go" => "Go",
        "rs" => "Rust",
        "php" => "PHP",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "sass" => "Sass",
        "vue" => "Vue",
        "jsx" | "tsx" => "React",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "scala" => "Scala",
        "r" => "R",
        "jl" => "Julia",
        "dart" => "Dart",
        "sh" | "bash" | "zsh" => "Shell",
        "yml" | "yaml" => "YAML",
        "json" => "JSON",
        "xml" => "XML",
        "md" => "Markdown",
        "rst" => "reStructuredText",
        _ => return None,
    };
    Some(language)
}

/// Average lines per file for a (lowercase) extension.
pub fn lines_per_file(ext: &str) -> u64 {
    match ext {
        "py" => 150,
        "js" => 120,
        "java" => 200,
        "html" => 100,
        _ => DEFAULT_LINES_PER_FILE,
    }
}

/// Lowercased extension of the last path component, or `"other"`.
pub fn file_extension(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => "other".to_string(),
    }
}

/// Language label for a path: the table entry, else the uppercased extension.
pub fn classify_path(path: &str) -> String {
    let ext = file_extension(path);
    language_for_extension(&ext)
        .map(str::to_string)
        .unwrap_or_else(|| ext.to_uppercase())
}

/// Estimate from bytes per language.
///
/// `file_count` is derived as `max(1, total / 200)`. An empty map yields the
/// zero estimate.
pub fn estimate_from_bytes(bytes: &BTreeMap<String, u64>) -> LineEstimate {
    if bytes.is_empty() {
        return LineEstimate::zero();
    }

    let mut estimate = LineEstimate::zero();
    for (language, count) in bytes {
        let lines = count / bytes_per_line(language);
        estimate.lines_by_language.insert(language.clone(), lines);
        estimate.total_lines += lines;
    }
    estimate.file_count = (estimate.total_lines / LINES_PER_ESTIMATED_FILE).max(1);
    estimate
}

/// Estimate from the file paths of the default branch.
pub fn estimate_from_paths<S: AsRef<str>>(paths: &[S]) -> LineEstimate {
    if paths.is_empty() {
        return LineEstimate::zero();
    }

    let mut estimate = LineEstimate {
        file_count: paths.len() as u64,
        ..LineEstimate::zero()
    };

    for path in paths.iter().take(FILE_SAMPLE_CAP) {
        let path = path.as_ref();
        let ext = file_extension(path);
        let lines = lines_per_file(&ext);
        *estimate
            .lines_by_language
            .entry(classify_path(path))
            .or_insert(0) += lines;
        estimate.total_lines += lines;
    }

    if paths.len() > FILE_SAMPLE_CAP {
        let multiplier = paths.len() as f64 / FILE_SAMPLE_CAP as f64;
        estimate.total_lines = (estimate.total_lines as f64 * multiplier) as u64;
        for lines in estimate.lines_by_language.values_mut() {
            *lines = (*lines as f64 * multiplier) as u64;
        }
    }

    estimate
}

/// Estimate from whichever signal was obtained.
pub fn estimate(signal: &RepoSignal) -> LineEstimate {
    match signal {
        RepoSignal::LanguageBytes(bytes) => estimate_from_bytes(bytes),
        RepoSignal::FilePaths(paths) => estimate_from_paths(paths),
    }
}
