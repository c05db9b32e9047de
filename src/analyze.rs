use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::signature::ElementSignature;

/// Length of the hex fingerprint kept from the digest.
const HASH_LEN: usize = 8;

/// Short fingerprint of a section's descendant structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Digest composite keys in order, joined with `|`.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = keys
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("|");
        let digest = Sha256::digest(joined.as_bytes());
        let mut hex = format!("{:x}", digest);
        hex.truncate(HASH_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural breakdown of everything nested inside one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// One signature per descendant element, in document order.
    pub element_signatures: Vec<ElementSignature>,
    /// Composite key to occurrence count, in first-seen order.
    pub element_counts: IndexMap<String, usize>,
    /// Distinct descriptors, sorted.
    pub unique_children: Vec<String>,
    pub total_elements: usize,
    pub unique_elements: usize,
}

impl ContentAnalysis {
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::from_keys(self.element_signatures.iter().map(|s| s.composite_key()))
    }
}

/// Analyze every descendant element of `section` (the section itself excluded).
pub fn analyze_section(section: ElementRef<'_>) -> ContentAnalysis {
    let mut element_signatures = Vec::new();
    let mut element_counts: IndexMap<String, usize> = IndexMap::new();
    let mut unique_children = BTreeSet::new();

    // descendants() is pre-order and starts with the node itself.
    for element in section.descendants().skip(1).filter_map(ElementRef::wrap) {
        let signature = ElementSignature::from_element(element.value());
        let key = signature.composite_key();
        *element_counts.entry(key).or_insert(0) += 1;
        unique_children.insert(signature.descriptor());
        element_signatures.push(signature);
    }

    let total_elements = element_signatures.len();
    let unique_elements = element_counts.len();
    ContentAnalysis {
        element_signatures,
        element_counts,
        unique_children: unique_children.into_iter().collect(),
        total_elements,
        unique_elements,
    }
}
