use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analyze::{ContentAnalysis, ContentHash};
use crate::catalog::{Catalog, Occurrence, SectionGroup};
use crate::error::CatalogError;
use crate::scan::SectionTag;

/// One occurrence as written to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceEntry {
    pub file: PathBuf,
    pub all_attributes: BTreeMap<String, String>,
    pub content_hash: ContentHash,
}

/// One unique-section group as written to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub signature_key: String,
    pub classes: Vec<String>,
    pub tag: SectionTag,
    pub content_hash: ContentHash,
    pub content_analysis: ContentAnalysis,
    pub occurrence_count: usize,
    pub first_seen_in: PathBuf,
    pub occurrences: Vec<OccurrenceEntry>,
}

impl From<&Occurrence> for OccurrenceEntry {
    fn from(occurrence: &Occurrence) -> Self {
        Self {
            file: occurrence.file.clone(),
            all_attributes: occurrence.all_attributes.clone(),
            content_hash: occurrence.content_hash.clone(),
        }
    }
}

impl From<&SectionGroup> for CatalogEntry {
    fn from(group: &SectionGroup) -> Self {
        Self {
            signature_key: group.key.clone(),
            classes: group.classes.clone(),
            tag: group.tag,
            content_hash: group.content_hash.clone(),
            content_analysis: group.content_analysis.clone(),
            occurrence_count: group.occurrence_count(),
            first_seen_in: group.first_seen_in.clone(),
            occurrences: group
                .occurrences
                .iter()
                .map(OccurrenceEntry::from)
                .collect(),
        }
    }
}

pub fn to_entries(catalog: &Catalog) -> Vec<CatalogEntry> {
    catalog.iter().map(CatalogEntry::from).collect()
}

/// Pretty-printed JSON array of every group, two-space indented.
pub fn to_json_string(catalog: &Catalog) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(&to_entries(catalog))?)
}

pub fn write_json(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    let json = to_json_string(catalog)?;
    std::fs::write(path, json).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a catalog previously written by [`write_json`].
pub fn read_json(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
