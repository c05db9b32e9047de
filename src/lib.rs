//! Catalog recurring `<section>` shapes across a static site.
//!
//! `section_catalog` walks a directory of HTML files, pulls out every
//! `<section>` (and every `<div>` that behaves like one), groups them by their
//! class list, and reports where occurrences of the same shape differ in their
//! nested markup.
//!
//! # Quick start
//!
//! ```rust
//! use std::path::Path;
//! use section_catalog::{extract_sections, Catalog, Config};
//!
//! let html = r#"<section class="hero"><img class="logo"></section>"#;
//! let config = Config::default();
//! let records = extract_sections(html, Path::new("index.html"), &config);
//! let catalog = Catalog::from_records(records, &config);
//! assert_eq!(catalog.len(), 1);
//! assert!(catalog.get("classes:hero").is_some());
//! ```

mod analyze;
mod catalog;
mod error;
pub mod json;
pub mod report;
mod scan;
mod signature;

pub use analyze::{analyze_section, ContentAnalysis, ContentHash};
pub use catalog::{group_key, Catalog, ChildrenReport, Occurrence, SectionGroup, Variant};
pub use error::CatalogError;
pub use report::ReportFormat;
pub use scan::{
    extract_sections, find_html_files, parse_html_file, scan_directory, Scan, SectionRecord,
    SectionTag,
};
pub use signature::{class_list, ElementSignature, KEY_ATTRIBUTES};

use std::path::Path;

/// Settings shared by the scanner, cataloger and reporter.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// File extension to scan, without the dot.
    pub extension: String,
    /// Sections carrying this class are never cataloged.
    pub excluded_class: String,
    /// Markdown file lists longer than this are abbreviated.
    pub file_list_limit: usize,
    /// Files shown before "... and N more" in an abbreviated list.
    pub file_list_preview: usize,
    /// Entries in the Markdown "Most Common Classes" list.
    pub top_classes: usize,
    /// Dump every occurrence and its attributes.
    pub show_details: bool,
    /// Reserved. Accepted for command-line compatibility, renders nothing extra.
    pub show_content: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: "html".to_string(),
            excluded_class: "footer".to_string(),
            file_list_limit: 5,
            file_list_preview: 3,
            top_classes: 10,
            show_details: false,
            show_content: false,
        }
    }
}

impl Config {
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }
    pub fn with_excluded_class(mut self, class: impl Into<String>) -> Self {
        self.excluded_class = class.into();
        self
    }
    pub fn with_file_list_limit(mut self, n: usize) -> Self {
        self.file_list_limit = n;
        self
    }
    pub fn with_file_list_preview(mut self, n: usize) -> Self {
        self.file_list_preview = n;
        self
    }
    pub fn with_top_classes(mut self, n: usize) -> Self {
        self.top_classes = n;
        self
    }
    pub fn with_show_details(mut self, v: bool) -> Self {
        self.show_details = v;
        self
    }
    pub fn with_show_content(mut self, v: bool) -> Self {
        self.show_content = v;
        self
    }
}

/// Scan `root` and group every section found into a catalog.
///
/// Equivalent to [`scan_directory`] followed by [`Catalog::from_records`].
/// The returned [`Scan`] keeps its counters; its records are moved into the
/// catalog.
pub fn catalog_directory(root: &Path, config: &Config) -> Result<(Catalog, Scan), CatalogError> {
    let mut scan = scan_directory(root, config)?;
    let records = std::mem::take(&mut scan.records);
    Ok((Catalog::from_records(records, config), scan))
}
