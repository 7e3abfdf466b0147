//! Extracted string resources and the set that collects them.

use serde::{Deserialize, Serialize};

/// One localizable string extracted from a source file.
///
/// For HTML templates the key is the source text itself, so a translation
/// store can be queried directly with the extracted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub project: String,
    pub key: String,
    pub source: String,
    pub source_locale: String,
    pub path: String,
    pub datatype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 1-based line in the source file where the string was found.
    pub line: usize,
    /// Position of this resource among all resources extracted from the
    /// file, in document order. Preserved across key deduplication.
    pub index: usize,
}

/// An ordered collection of resources, deduplicated by key.
///
/// The first occurrence of a key wins; later duplicates are dropped but
/// still consume an index in the extraction order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationSet {
    resources: Vec<Resource>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource unless one with the same key is already present.
    pub fn add(&mut self, resource: Resource) {
        if self.get(&resource.key).is_none() {
            self.resources.push(resource);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.key == key)
    }

    pub fn get_by_source(&self, source: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.source == source)
    }

    pub fn size(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }
}
