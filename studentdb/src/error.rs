use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudentDbError {
    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Constraint violation: {collection}.{index} already contains {value}")]
    ConstraintViolation {
        collection: String,
        index: String,
        value: String,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

impl StudentDbError {
    pub(crate) fn not_found(collection: &str, id: impl ToString) -> Self {
        StudentDbError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StudentDbError::NotFound { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StudentDbError::ConstraintViolation { .. })
    }
}

pub type Result<T> = std::result::Result<T, StudentDbError>;
