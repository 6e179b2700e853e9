//! Library manifest: name → fragment file, dependencies, exports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One library's manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Fragment file name, relative to the resources directory.
    pub file: String,
    /// Libraries that must be included before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Symbols this library declares at the top level.
    #[serde(default)]
    pub exports: Vec<String>,
}

/// The full manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryManifest {
    #[serde(default)]
    pub libraries: BTreeMap<String, LibraryEntry>,
}

impl LibraryManifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error for malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LibraryEntry> {
        self.libraries.get(name)
    }

    /// Library names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.libraries.keys().map(String::as_str).collect()
    }
}
