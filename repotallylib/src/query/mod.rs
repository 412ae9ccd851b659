//! Query processing: filter, summarize, and page a loaded corpus.
//!
//! This module handles the third stage of the pipeline - browsing a corpus
//! after it has been fetched and analyzed. It provides:
//!
//! - **Options**: Filter state and presentation knobs (`ActiveFilter`, `ViewOptions`)
//! - **CorpusView**: Filtered subset, summary, and three paginated views
//!
//! ## Example
//!
//! ```rust,ignore
//! use repotallylib::query::{ActiveFilter, CorpusView, ViewKind, ViewOptions};
//!
//! let mut view = CorpusView::new(payload.repos, ViewOptions::default());
//! view.apply_filter(ActiveFilter::new().language("Rust"));
//! view.change_page(ViewKind::Size, 2);
//! for row in view.size_page().items {
//!     println!("{} {:.0}px", row.repo.name, row.bar_width);
//! }
//! ```

pub mod options;
pub mod view;

pub use options::{ActiveFilter, BarScale, ViewKind, ViewOptions, Visibility};
pub use view::{
    bar_width, CorpusView, LanguageSlice, Page, PageWindow, Paginator, SizeRow, ViewSummary,
    OTHER_LANGUAGE,
};
