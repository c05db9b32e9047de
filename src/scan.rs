use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::analyze::{analyze_section, ContentAnalysis, ContentHash};
use crate::error::CatalogError;
use crate::signature::class_list;
use crate::Config;

/// Which kind of element a section was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionTag {
    Section,
    Div,
}

impl SectionTag {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionTag::Section => "section",
            SectionTag::Div => "div",
        }
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One section-like element found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    /// Class names in source order.
    pub classes: Vec<String>,
    pub file: PathBuf,
    /// Every attribute on the element, by name.
    pub attributes: BTreeMap<String, String>,
    pub content_analysis: ContentAnalysis,
    pub content_hash: ContentHash,
    pub tag: SectionTag,
}

/// Result of scanning a directory tree.
#[derive(Debug, Default)]
pub struct Scan {
    pub records: Vec<SectionRecord>,
    /// HTML files visited, including ones that failed to read.
    pub files_processed: usize,
    pub files_failed: usize,
    /// Section-like elements extracted across all files.
    pub sections_found: usize,
}

fn is_section(node: NodeRef<'_, Node>) -> bool {
    matches!(node.value(), Node::Element(el) if el.name() == "section")
}

/// True if any node strictly below `node` is a `<section>`.
fn contains_section(node: NodeRef<'_, Node>) -> bool {
    node.descendants().skip(1).any(is_section)
}

/// A `<div>` counts as a section when one of its classes mentions "section"
/// and its parent holds a `<section>` somewhere below it.
///
/// The parent check looks at all descendants of the parent, not only direct
/// siblings, so a div wrapping its own `<section>` also qualifies.
fn is_section_like_div(div: ElementRef<'_>) -> bool {
    let mentions_section = class_list(div.value())
        .iter()
        .any(|class| class.to_lowercase().contains("section"));
    if !mentions_section {
        return false;
    }
    div.parent().is_some_and(contains_section)
}

/// Extract every section-like element from an HTML document.
///
/// Real `<section>` elements come first, then qualifying `<div>`s, each in
/// document order. Elements carrying the excluded class are dropped.
pub fn extract_sections(html: &str, file: &Path, config: &Config) -> Vec<SectionRecord> {
    let doc = Html::parse_document(html);
    let elements: Vec<ElementRef<'_>> = doc
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let sections = elements
        .iter()
        .copied()
        .filter(|el| el.value().name() == "section");
    let divs = elements
        .iter()
        .copied()
        .filter(|el| el.value().name() == "div" && is_section_like_div(*el));

    sections
        .chain(divs)
        .filter_map(|el| {
            let classes = class_list(el.value());
            if classes.iter().any(|c| *c == config.excluded_class) {
                return None;
            }
            let tag = if el.value().name() == "section" {
                SectionTag::Section
            } else {
                SectionTag::Div
            };
            let attributes = el
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            let content_analysis = analyze_section(el);
            let content_hash = content_analysis.content_hash();
            Some(SectionRecord {
                classes,
                file: file.to_path_buf(),
                attributes,
                content_analysis,
                content_hash,
                tag,
            })
        })
        .collect()
}

/// Read and parse one HTML file.
pub fn parse_html_file(path: &Path, config: &Config) -> Result<Vec<SectionRecord>, CatalogError> {
    let html = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(extract_sections(&html, path, config))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(&format!(".{extension}")))
        .unwrap_or(false)
}

/// List HTML files under `root`, recursively, sorted by file name per directory.
///
/// Symlinked files are included; symlinked directories are not descended
/// into. Unreadable directory entries are logged and skipped.
pub fn find_html_files(root: &Path, config: &Config) -> Result<Vec<PathBuf>, CatalogError> {
    if !root.exists() {
        return Err(CatalogError::RootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", CatalogError::Walk(e));
                continue;
            }
        };
        // file_type() does not follow links; path().is_file() does.
        if entry.path().is_file() && has_extension(entry.path(), &config.extension) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Scan every HTML file under `root`.
///
/// A file that cannot be read is logged and contributes no records; only a
/// missing root aborts the scan.
pub fn scan_directory(root: &Path, config: &Config) -> Result<Scan, CatalogError> {
    let mut scan = Scan::default();
    for path in find_html_files(root, config)? {
        scan.files_processed += 1;
        info!("Processing: {}", path.display());
        match parse_html_file(&path, config) {
            Ok(records) => {
                debug!("{} sections in {}", records.len(), path.display());
                scan.sections_found += records.len();
                scan.records.extend(records);
            }
            Err(e) => {
                warn!("Error parsing {}: {}", path.display(), e);
                scan.files_failed += 1;
            }
        }
    }
    Ok(scan)
}
