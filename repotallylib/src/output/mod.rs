//! Output formatting: present data as tables, JSON, and HTML.
//!
//! This module handles the fourth and final stage of the pipeline -
//! formatting results for display and persistence. It provides:
//!
//! - **ReportTable**: Table-ready data structure with headers, rows, and footer
//! - **ReportPayload**: The JSON document written for every run
//! - **HTML report**: A self-contained page rendered with `tera`
//!
//! ReportTable is a pure presentation layer - it only formats data into strings.
//! All filtering and sorting happens in the query stage.
//!
//! ## Example
//!
//! ```rust,ignore
//! use repotallylib::output::{file_stamp, write_report, ReportPayload, ReportTable};
//!
//! let payload = ReportPayload::from_analysis(analysis, chrono::Utc::now());
//! let stamp = file_stamp(&chrono::Local::now());
//! payload.save_in("reports", &stamp)?;
//! write_report(&payload, &ViewOptions::default(), "reports", &stamp)?;
//! let table = ReportTable::overview(&payload.stats);
//! ```

pub mod html;
pub mod payload;
pub mod table;

pub use html::{render_report, write_report};
pub use payload::{data_file_name, file_stamp, report_file_name, ReportPayload};
pub use table::{format_count, ReportTable, TableRow};
