//! Namespace registry.
//!
//! Maps topic namespaces (vector index partitions) to their display labels
//! and classifier keywords. The registry is a fixed lookup table loaded from
//! configuration. Display labels are pinned here rather than derived by
//! title-casing the namespace key, so labels stay stable as namespaces grow.

use serde::{Deserialize, Serialize};

/// A single registered namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceEntry {
    /// Index partition key (e.g., "wine", "cvs-health")
    pub key: String,

    /// User-facing label reported in the `classified` response field
    /// (e.g., "Wine", "Healthcare-medicines")
    pub label: String,

    /// Keyword matched against lower-cased classifier output
    /// (e.g., "drinks", "healthcare")
    pub keyword: String,
}

/// Lookup table of known namespaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceRegistry {
    entries: Vec<NamespaceEntry>,
}

/// Label reported when no namespace was resolved.
pub const UNRESOLVED_LABEL: &str = "Other";

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                NamespaceEntry {
                    key: "wine".to_string(),
                    label: "Wine".to_string(),
                    keyword: "drinks".to_string(),
                },
                NamespaceEntry {
                    key: "cvs-health".to_string(),
                    label: "Healthcare-medicines".to_string(),
                    keyword: "healthcare".to_string(),
                },
            ],
        }
    }
}

impl NamespaceRegistry {
    /// Build a registry from explicit entries.
    pub fn from_entries(entries: Vec<NamespaceEntry>) -> Self {
        Self { entries }
    }

    /// All registered entries.
    pub fn entries(&self) -> &[NamespaceEntry] {
        &self.entries
    }

    /// Map raw classifier output to a namespace key.
    ///
    /// Matching is substring containment on the lower-cased output, so
    /// multi-word or decorated model replies still resolve. Unmatched
    /// output maps to `None`. The mapping is total and never fails.
    pub fn match_classification(&self, output: &str) -> Option<&str> {
        let lowered = output.to_lowercase();
        self.entries
            .iter()
            .find(|entry| lowered.contains(&entry.keyword))
            .map(|entry| entry.key.as_str())
    }

    /// Display label for a resolved namespace key.
    ///
    /// Unresolved (`None`) and unregistered keys both report
    /// [`UNRESOLVED_LABEL`].
    pub fn label_for(&self, namespace: Option<&str>) -> String {
        namespace
            .and_then(|key| self.entries.iter().find(|entry| entry.key == key))
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| UNRESOLVED_LABEL.to_string())
    }

    /// Classifier label words, in registry order (e.g., ["Drinks", "Healthcare"]).
    pub fn classifier_labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| {
                let mut chars = entry.keyword.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }
}
