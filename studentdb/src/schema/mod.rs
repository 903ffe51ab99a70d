mod parser;
mod types;

pub use parser::{parse_schema, parse_schema_str};
pub use types::{CollectionDefinition, IndexDefinition, SchemaDefinition};

use crate::error::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const STUDENTS: &str = "students";
pub const MARKS: &str = "marks";
pub const ATTENDANCE: &str = "attendance";

/// Index on `students.rollNumber`
pub const ROLL_NUMBER_INDEX: &str = "rollNumber";
/// Index on `marks.studentId` and `attendance.studentId`
pub const STUDENT_ID_INDEX: &str = "studentId";

/// Highest schema version this library can open.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// The built-in student records schema.
pub const DEFAULT_SCHEMA_YAML: &str = r#"
version: 1
collections:
  students:
    indexes:
      rollNumber: { unique: true }
  marks:
    indexes:
      studentId: {}
  attendance:
    indexes:
      studentId: {}
"#;

/// Parse the built-in schema
pub fn default_schema() -> Result<SchemaDefinition> {
    parse_schema_str(DEFAULT_SCHEMA_YAML)
}

/// Stable fingerprint of a schema's YAML text, recorded in the schema history.
pub fn hash_schema(yaml: &str) -> String {
    let mut hasher = DefaultHasher::new();
    yaml.trim().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
