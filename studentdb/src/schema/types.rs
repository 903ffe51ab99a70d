use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level schema definition parsed from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub version: u32,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionDefinition>,
}

/// Definition of a single collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDefinition {
    /// Field holding the store-assigned identifier. Never persisted inside the record body.
    #[serde(default = "default_key_path")]
    pub key_path: String,
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexDefinition>,
}

/// A secondary index over one top-level record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Indexed field; defaults to the index name
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

fn default_key_path() -> String {
    "id".to_string()
}

impl SchemaDefinition {
    pub fn collection(&self, name: &str) -> Option<&CollectionDefinition> {
        self.collections.get(name)
    }
}

impl CollectionDefinition {
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.get(name)
    }
}

impl IndexDefinition {
    /// The record field this index reads, given the index's own name.
    pub fn field<'a>(&'a self, index_name: &'a str) -> &'a str {
        self.key_path.as_deref().unwrap_or(index_name)
    }
}
