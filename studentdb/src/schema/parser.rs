use crate::error::{Result, StudentDbError};
use super::types::SchemaDefinition;
use std::path::Path;

/// Parse a schema YAML file into a SchemaDefinition
pub fn parse_schema(path: &Path) -> Result<SchemaDefinition> {
    let content = std::fs::read_to_string(path)?;
    parse_schema_str(&content)
}

/// Parse a schema YAML string into a SchemaDefinition
pub fn parse_schema_str(content: &str) -> Result<SchemaDefinition> {
    let schema: SchemaDefinition = serde_yaml::from_str(content)?;

    for (name, collection) in &schema.collections {
        if collection.key_path.is_empty() {
            return Err(StudentDbError::Schema(format!(
                "Collection '{name}' has an empty key_path"
            )));
        }
        for (index_name, index) in &collection.indexes {
            if index.field(index_name) == collection.key_path {
                return Err(StudentDbError::Schema(format!(
                    "Index '{name}.{index_name}' cannot cover the key path"
                )));
            }
        }
    }

    Ok(schema)
}
