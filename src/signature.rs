use indexmap::IndexMap;
use scraper::node::Element;
use serde::{Deserialize, Serialize};

/// Attributes that carry structural meaning and take part in a signature.
///
/// Order here is the order they appear in a descriptor.
pub const KEY_ATTRIBUTES: &[&str] = &["type", "role", "loading"];

/// Class names of an element in source order.
///
/// An absent or blank `class` attribute yields an empty list.
pub fn class_list(element: &Element) -> Vec<String> {
    element
        .attr("class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Return a sorted copy of a class list.
pub fn sorted_classes(classes: &[String]) -> Vec<String> {
    let mut sorted = classes.to_vec();
    sorted.sort();
    sorted
}

/// Normalized structural identity of a single element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSignature {
    /// Lowercase tag name.
    pub tag: String,
    /// Class names, sorted ascending.
    pub classes: Vec<String>,
    /// `type`, `role` and `loading` when present and non-empty, in that order.
    pub key_attributes: IndexMap<String, String>,
}

impl ElementSignature {
    pub fn from_element(element: &Element) -> Self {
        let mut classes = class_list(element);
        classes.sort();

        let key_attributes = KEY_ATTRIBUTES
            .iter()
            .filter_map(|&name| {
                element
                    .attr(name)
                    .filter(|value| !value.is_empty())
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();

        Self {
            tag: element.name().to_string(),
            classes,
            key_attributes,
        }
    }

    /// Counting key: `"{tag}.{classes}|{k:v ...}"` with attributes sorted by name.
    pub fn composite_key(&self) -> String {
        let mut attrs: Vec<(&String, &String)> = self.key_attributes.iter().collect();
        attrs.sort();
        let attrs = attrs
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}.{}|{}", self.tag, self.classes.join(" "), attrs)
    }

    /// Opening-tag rendering used in reports, e.g. `<img class="logo" loading="lazy">`.
    pub fn descriptor(&self) -> String {
        let mut out = format!("<{}", self.tag);
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        for (name, value) in &self.key_attributes {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        out
    }
}
