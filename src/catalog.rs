use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::analyze::{ContentAnalysis, ContentHash};
use crate::scan::{SectionRecord, SectionTag};
use crate::signature::sorted_classes;
use crate::Config;

/// Grouping key for a class list: `"classes:"` followed by the sorted classes.
pub fn group_key(classes: &[String]) -> String {
    format!("classes:{}", sorted_classes(classes).join(" "))
}

/// Display name of a path: its final component.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Where a group was seen and with which attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file: PathBuf,
    pub all_attributes: BTreeMap<String, String>,
    pub content_hash: ContentHash,
}

/// One distinct descendant structure within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub content_hash: ContentHash,
    pub occurrences: usize,
    pub first_seen_in: PathBuf,
    pub total_elements: usize,
    pub unique_elements: usize,
}

/// How the unique children of a group compare across its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildrenReport<'a> {
    /// The group has no descendant elements at all.
    None,
    /// Only one occurrence; carries the number of distinct descriptors.
    SingleFile(usize),
    /// Every descriptor appears in every file of the group.
    Consistent,
    /// Descriptors missing from at least one file, with the files they do appear in.
    Varying(Vec<(&'a str, &'a BTreeSet<String>)>),
}

/// All sections across the scan that share a sorted class list.
#[derive(Debug, Clone)]
pub struct SectionGroup {
    pub key: String,
    /// Classes of the first occurrence, in source order.
    pub classes: Vec<String>,
    pub tag: SectionTag,
    pub content_hash: ContentHash,
    pub content_analysis: ContentAnalysis,
    /// Descriptor to the file names it was found in.
    pub children_to_files: BTreeMap<String, BTreeSet<String>>,
    pub first_seen_in: PathBuf,
    pub occurrences: Vec<Occurrence>,
    /// Distinct content hashes, in first-seen order.
    pub variants: Vec<Variant>,
}

impl SectionGroup {
    fn new(key: String, record: &SectionRecord) -> Self {
        Self {
            key,
            classes: record.classes.clone(),
            tag: record.tag,
            content_hash: record.content_hash.clone(),
            content_analysis: record.content_analysis.clone(),
            children_to_files: BTreeMap::new(),
            first_seen_in: record.file.clone(),
            occurrences: Vec::new(),
            variants: Vec::new(),
        }
    }

    fn push(&mut self, record: SectionRecord) {
        let name = file_name(&record.file);
        for child in &record.content_analysis.unique_children {
            self.children_to_files
                .entry(child.clone())
                .or_default()
                .insert(name.clone());
        }

        match self
            .variants
            .iter_mut()
            .find(|v| v.content_hash == record.content_hash)
        {
            Some(variant) => variant.occurrences += 1,
            None => self.variants.push(Variant {
                content_hash: record.content_hash.clone(),
                occurrences: 1,
                first_seen_in: record.file.clone(),
                total_elements: record.content_analysis.total_elements,
                unique_elements: record.content_analysis.unique_elements,
            }),
        }

        self.occurrences.push(Occurrence {
            file: record.file,
            all_attributes: record.attributes,
            content_hash: record.content_hash,
        });
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    /// File names of every occurrence, in scan order (repeats kept).
    pub fn occurrence_file_names(&self) -> Vec<String> {
        self.occurrences
            .iter()
            .map(|o| file_name(&o.file))
            .collect()
    }

    /// Distinct file names this group occurs in.
    pub fn occurrence_files(&self) -> BTreeSet<String> {
        self.occurrences
            .iter()
            .map(|o| file_name(&o.file))
            .collect()
    }

    pub fn children_report(&self) -> ChildrenReport<'_> {
        if self.children_to_files.is_empty() {
            return ChildrenReport::None;
        }
        if self.occurrences.len() == 1 {
            return ChildrenReport::SingleFile(self.children_to_files.len());
        }

        let all_files = self.occurrence_files();
        let varying: Vec<_> = self
            .children_to_files
            .iter()
            .filter(|(_, files)| **files != all_files)
            .map(|(child, files)| (child.as_str(), files))
            .collect();
        if varying.is_empty() {
            ChildrenReport::Consistent
        } else {
            ChildrenReport::Varying(varying)
        }
    }

    /// True when occurrences disagree on their descendant structure.
    pub fn has_variants(&self) -> bool {
        self.variants.len() > 1
    }
}

/// Every unique section group found in a scan, in first-seen order.
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: IndexMap<String, SectionGroup>,
    excluded_class: String,
}

impl Catalog {
    pub fn new(config: &Config) -> Self {
        Self {
            groups: IndexMap::new(),
            excluded_class: config.excluded_class.clone(),
        }
    }

    pub fn from_records<I>(records: I, config: &Config) -> Self
    where
        I: IntoIterator<Item = SectionRecord>,
    {
        let mut catalog = Self::new(config);
        for record in records {
            catalog.add(record);
        }
        catalog
    }

    /// Add one record to its group. Returns false if the record was excluded.
    pub fn add(&mut self, record: SectionRecord) -> bool {
        if record.classes.iter().any(|c| *c == self.excluded_class) {
            return false;
        }
        let key = group_key(&record.classes);
        self.groups
            .entry(key.clone())
            .or_insert_with(|| SectionGroup::new(key, &record))
            .push(record);
        true
    }

    pub fn get(&self, key: &str) -> Option<&SectionGroup> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups whose occurrences share classes but differ in descendant structure.
    pub fn similar_sections(&self) -> Vec<&SectionGroup> {
        self.iter().filter(|g| g.has_variants()).collect()
    }

    /// Class name to the number of groups using it, most frequent first.
    ///
    /// Ties keep the order in which classes were first seen.
    pub fn class_frequencies(&self) -> Vec<(&str, usize)> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for group in self.iter() {
            for class in &group.classes {
                *counts.entry(class.as_str()).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::extract_sections;

    const CARD: &str = "<section class=\"card\"><h2></h2><p></p></section>";
    const HERO_LOGO: &str = "<section class=\"hero\"><img class=\"logo\"></section>";
    const HERO_LAZY: &str =
        "<section class=\"hero\"><img class=\"logo\" loading=\"lazy\"></section>";

    fn records(file: &str, html: &str) -> Vec<SectionRecord> {
        extract_sections(html, Path::new(file), &Config::default())
    }

    fn catalog(pages: &[(&str, &str)]) -> Catalog {
        let all = pages.iter().flat_map(|(file, html)| records(file, html));
        Catalog::from_records(all, &Config::default())
    }

    #[test]
    fn test_group_key_sorts_classes() {
        let ab = group_key(&["a".to_string(), "b".to_string()]);
        let ba = group_key(&["b".to_string(), "a".to_string()]);
        assert_eq!(ab, "classes:a b");
        assert_eq!(ab, ba);
        assert_eq!(group_key(&[]), "classes:");
    }

    #[test]
    fn test_class_order_shares_group() {
        let c = catalog(&[
            ("a.html", "<section class=\"a b\"></section>"),
            ("b.html", "<section class=\"b a\"></section>"),
        ]);
        assert_eq!(c.len(), 1);
        let g = c.get("classes:a b").unwrap();
        assert_eq!(g.occurrence_count(), 2);
        assert_eq!(g.classes, vec!["a", "b"]);
    }

    #[test]
    fn test_id_and_tag_do_not_split_groups() {
        let c = catalog(&[(
            "a.html",
            "<body><section class=\"x-section\" id=\"one\"></section>\
             <div class=\"x-section\" id=\"two\"></div></body>",
        )]);
        assert_eq!(c.len(), 1);
        let g = c.get("classes:x-section").unwrap();
        assert_eq!(g.tag, SectionTag::Section);
        assert_eq!(g.occurrence_count(), 2);
        let attrs = &g.occurrences[1].all_attributes;
        assert_eq!(attrs.get("id").map(String::as_str), Some("two"));
    }

    #[test]
    fn test_excluded_class_rejected_on_add() {
        // Records built by hand can still carry the excluded class.
        let html = "<section class=\"promo\"></section>";
        let mut record = records("a.html", html).remove(0);
        record.classes.push("footer".to_string());
        let mut c = Catalog::new(&Config::default());
        assert!(!c.add(record));
        assert!(c.is_empty());
    }

    #[test]
    fn test_single_file_report() {
        let html = "<section class=\"hero\"><p></p><span></span></section>";
        let c = catalog(&[("a.html", html)]);
        let g = c.get("classes:hero").unwrap();
        assert_eq!(g.children_report(), ChildrenReport::SingleFile(2));
    }

    #[test]
    fn test_no_children_report() {
        let c = catalog(&[
            ("a.html", "<section class=\"empty\"></section>"),
            ("b.html", "<section class=\"empty\"></section>"),
        ]);
        let g = c.get("classes:empty").unwrap();
        assert_eq!(g.children_report(), ChildrenReport::None);
    }

    #[test]
    fn test_consistent_children() {
        let swapped = "<section class=\"card\"><p></p><h2></h2></section>";
        let c = catalog(&[("a.html", CARD), ("b.html", CARD), ("c.html", swapped)]);
        let g = c.get("classes:card").unwrap();
        assert_eq!(g.children_report(), ChildrenReport::Consistent);
        // Same descriptors, different order: still two structures.
        assert_eq!(g.variants.len(), 2);
    }

    #[test]
    fn test_varying_children_file_subset() {
        // <p> is missing from b.html only.
        let short = "<section class=\"card\"><h2></h2></section>";
        let c = catalog(&[("a.html", CARD), ("b.html", short), ("c.html", CARD)]);
        let g = c.get("classes:card").unwrap();
        let ChildrenReport::Varying(varying) = g.children_report() else {
            panic!("expected varying children");
        };
        assert_eq!(varying.len(), 1);
        assert_eq!(varying[0].0, "<p>");
        let files: Vec<&str> = varying[0].1.iter().map(String::as_str).collect();
        assert_eq!(files, vec!["a.html", "c.html"]);
    }

    #[test]
    fn test_variants_track_counts_and_first_file() {
        let c = catalog(&[
            ("a.html", HERO_LOGO),
            ("b.html", HERO_LAZY),
            ("c.html", HERO_LOGO),
        ]);
        let g = c.get("classes:hero").unwrap();
        assert!(g.has_variants());
        assert_eq!(g.variants.len(), 2);
        assert_eq!(g.variants[0].occurrences, 2);
        assert_eq!(g.variants[0].first_seen_in, PathBuf::from("a.html"));
        assert_eq!(g.variants[1].occurrences, 1);
        assert_eq!(g.variants[1].first_seen_in, PathBuf::from("b.html"));
        assert_eq!(g.content_hash, g.variants[0].content_hash);
        assert_eq!(c.similar_sections().len(), 1);
    }

    #[test]
    fn test_uniform_group_not_similar() {
        let c = catalog(&[
            ("a.html", "<section class=\"hero\"><p></p></section>"),
            ("b.html", "<section class=\"hero\"><p></p></section>"),
        ]);
        assert!(c.similar_sections().is_empty());
    }

    #[test]
    fn test_class_frequencies() {
        let c = catalog(&[(
            "a.html",
            "<section class=\"wide dark\"></section>\
             <section class=\"wide\"></section>\
             <section class=\"narrow dark\"></section>",
        )]);
        // "wide" and "dark" tie; "wide" was seen first.
        let freq = c.class_frequencies();
        assert_eq!(freq[0], ("wide", 2));
        assert_eq!(freq[1], ("dark", 2));
        assert_eq!(freq[2], ("narrow", 1));
    }

    #[test]
    fn test_first_seen_in_is_first_file() {
        let c = catalog(&[
            ("dir/first.html", "<section class=\"x\"></section>"),
            ("dir/second.html", "<section class=\"x\"></section>"),
        ]);
        let g = c.get("classes:x").unwrap();
        assert_eq!(g.first_seen_in, PathBuf::from("dir/first.html"));
        assert_eq!(g.occurrence_file_names(), vec!["first.html", "second.html"]);
    }
}
