use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::catalog::{file_name, Catalog, ChildrenReport, SectionGroup};
use crate::error::CatalogError;
use crate::scan::SectionTag;
use crate::Config;

const RULE_WIDTH: usize = 60;

/// Rendering style for the human-readable report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Plain,
    Markdown,
}

impl ReportFormat {
    /// Markdown for `.md` paths, plain text for anything else.
    pub fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "md" => ReportFormat::Markdown,
            _ => ReportFormat::Plain,
        }
    }
}

fn quoted(files: &[String]) -> String {
    files
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn ticked<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> String {
    items
        .into_iter()
        .map(|f| format!("`{}`", f.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn classes_display(group: &SectionGroup) -> String {
    if group.classes.is_empty() {
        "None".to_string()
    } else {
        group.classes.join(", ")
    }
}

/// Render the catalog in the requested format.
///
/// Markdown output starts with a summary block.
pub fn render_catalog(catalog: &Catalog, format: ReportFormat, config: &Config) -> String {
    match format {
        ReportFormat::Plain => render_plain(catalog, config),
        ReportFormat::Markdown => {
            let mut out = render_summary(catalog, config);
            out.push_str(&render_markdown(catalog, config));
            out
        }
    }
}

fn render_plain(catalog: &Catalog, config: &Config) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![rule.clone(), "UNIQUE SECTION CATALOG".to_string(), rule];

    for (i, group) in catalog.iter().enumerate() {
        lines.push(format!("\n{}. Section Signature:", i + 1));
        lines.push(format!("   Classes: {}", classes_display(group)));
        lines.push(format!("   Tag: {}", group.tag));
        lines.push(format!("   Found in {} file(s)", group.occurrence_count()));

        if group.occurrence_count() > 1 {
            lines.push(format!("   Files: {}", quoted(&group.occurrence_file_names())));
        } else {
            lines.push(format!("   File: \"{}\"", file_name(&group.first_seen_in)));
        }

        match group.children_report() {
            ChildrenReport::Varying(children) => {
                lines.push("   Unique Children (varying across files):".to_string());
                for (child, files) in children {
                    let files: Vec<String> = files.iter().cloned().collect();
                    lines.push(format!("     - {child}"));
                    lines.push(format!("       Found in: {}", quoted(&files)));
                }
            }
            ChildrenReport::Consistent => {
                lines.push("   Unique Children: All children consistent across files".to_string());
            }
            ChildrenReport::SingleFile(count) => {
                lines.push(format!("   Unique Children: {count} elements (single file)"));
            }
            ChildrenReport::None => lines.push("   Unique Children: None".to_string()),
        }

        if config.show_details {
            lines.push("   All section occurrences:".to_string());
            for occurrence in &group.occurrences {
                lines.push(format!("     - {}", file_name(&occurrence.file)));
                if !occurrence.all_attributes.is_empty() {
                    let attrs = occurrence
                        .all_attributes
                        .iter()
                        .map(|(k, v)| format!("{k}='{v}'"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    lines.push(format!("       Attributes: {attrs}"));
                }
            }
        }
    }

    lines.join("\n")
}

fn render_markdown(catalog: &Catalog, config: &Config) -> String {
    let mut lines = vec![
        "# 🏗️ Section Catalog".to_string(),
        String::new(),
        format!("**Total unique sections:** {}", catalog.len()),
        String::new(),
    ];

    for (i, group) in catalog.iter().enumerate() {
        lines.push(format!("## {}. Section Signature", i + 1));
        lines.push(String::new());
        lines.push(format!("**Classes:** `{}`", classes_display(group)));
        lines.push(format!("**Tag:** `{}`", group.tag));
        lines.push(format!("**Found in:** {} file(s)", group.occurrence_count()));
        lines.push(String::new());

        if group.occurrence_count() > 1 {
            let files = group.occurrence_file_names();
            if files.len() <= config.file_list_limit {
                lines.push(format!("**Files:** {}", ticked(&files)));
            } else {
                let preview = config.file_list_preview.min(files.len());
                lines.push(format!(
                    "**Files:** {}... and {} more",
                    ticked(&files[..preview]),
                    files.len() - preview
                ));
                lines.push(String::new());
                lines.push("<details>".to_string());
                lines.push("<summary>View all files</summary>".to_string());
                lines.push(String::new());
                for file in &files {
                    lines.push(format!("- `{file}`"));
                }
                lines.push(String::new());
                lines.push("</details>".to_string());
            }
        } else {
            lines.push(format!("**File:** `{}`", file_name(&group.first_seen_in)));
        }
        lines.push(String::new());

        match group.children_report() {
            ChildrenReport::Varying(children) => {
                lines.push("### Unique Children (varying across files)".to_string());
                lines.push(String::new());
                for (child, files) in children {
                    lines.push(format!("**Element:** `{child}`"));
                    lines.push(format!("**Found in:** {}", ticked(files)));
                    lines.push(String::new());
                }
            }
            ChildrenReport::Consistent => {
                lines.push("### Unique Children".to_string());
                lines.push(String::new());
                lines.push("✅ All children consistent across files".to_string());
                lines.push(String::new());
            }
            ChildrenReport::SingleFile(count) => {
                lines.push("### Unique Children".to_string());
                lines.push(String::new());
                lines.push(format!("📄 {count} elements (single file)"));
                lines.push(String::new());
            }
            ChildrenReport::None => {
                lines.push("### Unique Children".to_string());
                lines.push(String::new());
                lines.push("❌ None".to_string());
                lines.push(String::new());
            }
        }

        if config.show_details {
            lines.push("### All Section Occurrences".to_string());
            lines.push(String::new());
            for occurrence in &group.occurrences {
                lines.push(format!("**File:** `{}`", file_name(&occurrence.file)));
                if !occurrence.all_attributes.is_empty() {
                    let attrs = occurrence
                        .all_attributes
                        .iter()
                        .map(|(k, v)| format!("`{k}='{v}'`"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    lines.push(format!("**Attributes:** {attrs}"));
                }
                lines.push(String::new());
            }
        }

        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Markdown summary: totals, tag breakdown and the most common classes.
pub fn render_summary(catalog: &Catalog, config: &Config) -> String {
    let total = catalog.len();
    let single = catalog.iter().filter(|g| g.occurrence_count() == 1).count();
    let sections = catalog.iter().filter(|g| g.tag == SectionTag::Section).count();
    let divs = catalog.iter().filter(|g| g.tag == SectionTag::Div).count();

    let mut lines = vec![
        "## 📊 Summary".to_string(),
        String::new(),
        format!("- **Total unique sections:** {total}"),
        format!("- **Single file sections:** {single}"),
        format!("- **Multi-file sections:** {}", total - single),
        format!("- **`<section>` elements:** {sections}"),
        format!("- **`<div>` elements:** {divs}"),
        String::new(),
    ];

    let frequencies = catalog.class_frequencies();
    if !frequencies.is_empty() {
        lines.push("### Most Common Classes".to_string());
        lines.push(String::new());
        for (class, count) in frequencies.into_iter().take(config.top_classes) {
            lines.push(format!("- `{class}`: {count} sections"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render groups whose occurrences differ in descendant structure.
///
/// Returns `None` when every group is structurally uniform.
pub fn render_variants(catalog: &Catalog, format: ReportFormat) -> Option<String> {
    let similar = catalog.similar_sections();
    if similar.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    match format {
        ReportFormat::Plain => {
            let rule = "=".repeat(RULE_WIDTH);
            lines.push(format!("\n{rule}"));
            lines.push("SECTIONS WITH SAME STRUCTURE BUT DIFFERENT CONTENT".to_string());
            lines.push(rule);
            for group in similar {
                lines.push(format!("\nStructure: {}", group.key));
                lines.push(format!("Found {} variants:", group.variants.len()));
                for (i, variant) in group.variants.iter().enumerate() {
                    lines.push(format!("  {}. Content Hash: {}", i + 1, variant.content_hash));
                    lines.push(format!("     Files: {}", variant.occurrences));
                    lines.push(format!("     First seen: {}", variant.first_seen_in.display()));
                    lines.push(format!(
                        "     Elements: {} total, {} unique",
                        variant.total_elements, variant.unique_elements
                    ));
                }
            }
        }
        ReportFormat::Markdown => {
            lines.push("## 🔄 Sections with Same Structure but Different Content".to_string());
            lines.push(String::new());
            for group in similar {
                lines.push(format!("### Structure: `{}`", group.key));
                lines.push(String::new());
                lines.push(format!("**Found {} variants:**", group.variants.len()));
                lines.push(String::new());
                for (i, variant) in group.variants.iter().enumerate() {
                    lines.push(format!("**{}. Variant {}**", i + 1, i + 1));
                    lines.push(format!("- **Content Hash:** `{}`", variant.content_hash));
                    lines.push(format!("- **Files:** {}", variant.occurrences));
                    let first_seen = file_name(&variant.first_seen_in);
                    lines.push(format!("- **First seen:** `{first_seen}`"));
                    lines.push(format!(
                        "- **Elements:** {} total, {} unique",
                        variant.total_elements, variant.unique_elements
                    ));
                    lines.push(String::new());
                }
            }
        }
    }
    Some(lines.join("\n"))
}

/// Write a rendered report, replacing any existing file.
pub fn write_report(path: &Path, text: &str) -> Result<(), CatalogError> {
    std::fs::write(path, text).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Append rendered text to an existing report.
pub fn append_report(path: &Path, text: &str) -> Result<(), CatalogError> {
    let to_write_error = |source: std::io::Error| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(to_write_error)?;
    file.write_all(text.as_bytes()).map_err(to_write_error)
}
