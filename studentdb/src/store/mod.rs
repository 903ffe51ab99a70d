mod shared;

pub use shared::SharedStore;

use crate::error::{Result, StudentDbError};
use crate::model::RecordId;
use crate::schema::{
    default_schema, hash_schema, CollectionDefinition, SchemaDefinition, DEFAULT_SCHEMA_YAML,
    SUPPORTED_SCHEMA_VERSION,
};
use crate::system_db::{RecordRow, SystemDb};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The local record store.
/// Owns the SQLite connection, applies the schema on open, and hands out
/// collection handles for record operations.
pub struct Store {
    path: Option<PathBuf>,
    schema: SchemaDefinition,
    schema_yaml: String,
    db: SystemDb,
}

impl Store {
    /// Open (or create) the store file at `path` with the built-in schema.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_schema(path, default_schema()?, DEFAULT_SCHEMA_YAML)
    }

    /// Open a store file with a caller-provided schema.
    pub fn open_with_schema(
        path: &Path,
        schema: SchemaDefinition,
        schema_yaml: &str,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StudentDbError::StorageUnavailable(format!(
                        "cannot create data directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let db = SystemDb::open(path)?;
        let store = Store {
            path: Some(path.to_path_buf()),
            schema,
            schema_yaml: schema_yaml.to_string(),
            db,
        };
        store.boot()?;
        log::info!("Opened record store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory store with the built-in schema (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with_schema(default_schema()?, DEFAULT_SCHEMA_YAML)
    }

    pub fn open_in_memory_with_schema(schema: SchemaDefinition, schema_yaml: &str) -> Result<Self> {
        let store = Store {
            path: None,
            schema,
            schema_yaml: schema_yaml.to_string(),
            db: SystemDb::open_in_memory()?,
        };
        store.boot()?;
        Ok(store)
    }

    /// Boot lifecycle: refuse newer schemas, record schema changes, ensure collections
    fn boot(&self) -> Result<()> {
        let version = self.schema.version;
        if version > SUPPORTED_SCHEMA_VERSION {
            return Err(StudentDbError::StorageUnavailable(format!(
                "schema version {version} is newer than supported version {SUPPORTED_SCHEMA_VERSION}"
            )));
        }

        let current_hash = hash_schema(&self.schema_yaml);
        match self.db.get_last_schema()? {
            Some((stored, _)) if stored > SUPPORTED_SCHEMA_VERSION => {
                return Err(StudentDbError::StorageUnavailable(format!(
                    "store was written with schema version {stored}; this build supports {SUPPORTED_SCHEMA_VERSION}"
                )));
            }
            Some((_, hash)) if hash == current_hash => {}
            _ => self.db.record_schema(version, &current_hash, &self.schema_yaml)?,
        }

        self.create_collections()
    }

    /// Ensure every schema collection and index exists. Safe to call on every
    /// open; existing records are never touched except to backfill a newly
    /// declared index.
    pub fn create_collections(&self) -> Result<()> {
        self.atomically(|store| {
            for (name, definition) in &store.schema.collections {
                if store.db.ensure_collection(name, &definition.key_path)? {
                    log::info!("Created collection '{name}'");
                }
                for (index_name, index) in &definition.indexes {
                    let field = index.field(index_name);
                    if store
                        .db
                        .ensure_index(name, index_name, field, index.unique)?
                    {
                        log::info!("Created index '{name}.{index_name}' on '{field}'");
                        store.backfill_index(name, index_name, field, index.unique)?;
                    }
                }
            }
            Ok(())
        })
    }

    fn backfill_index(
        &self,
        collection: &str,
        index_name: &str,
        field: &str,
        unique: bool,
    ) -> Result<()> {
        for row in self.db.list_records(collection)? {
            let data: Value = serde_json::from_str(&row.data_json)?;
            if let Some(key) = index_key(&data, field)? {
                self.db
                    .insert_index_entry(collection, index_name, &key, row.id, unique)?;
            }
        }
        Ok(())
    }

    /// Run `f` as one all-or-nothing unit of work. Any error rolls back every
    /// write made inside it. Units nest: an inner unit joins the outer one.
    pub fn atomically<T>(&self, f: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        self.db.savepoint()?;
        let result = f(self).and_then(|value| self.db.release().map(|()| value));
        if let Err(e) = &result {
            // A failed commit leaves the savepoint open; close it before returning.
            if let Err(rollback_err) = self.db.rollback() {
                log::error!("Rollback failed after '{e}': {rollback_err}");
            }
        }
        result
    }

    /// Get a collection handle
    pub fn collection(&self, name: &str) -> Result<Collection<'_>> {
        let definition = self.schema.collection(name).ok_or_else(|| {
            StudentDbError::Schema(format!("Collection '{name}' not found in schema"))
        })?;
        Ok(Collection {
            store: self,
            name: name.to_string(),
            definition,
        })
    }

    /// Get the schema definition
    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Location of the store file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ── Typed API ───────────────────────────────────────────────────

    /// Insert a typed record. Returns the assigned identifier.
    pub fn insert_record<T: Serialize>(&self, collection: &str, record: &T) -> Result<RecordId> {
        self.collection(collection)?
            .insert(serde_json::to_value(record)?)
    }

    /// Get a typed record, `None` if no record has this identifier.
    pub fn get_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: RecordId,
    ) -> Result<Option<T>> {
        match self.collection(collection)?.get(id)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// All typed records of a collection, in insertion order.
    pub fn list_records<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.collection(collection)?
            .list()?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StudentDbError::from))
            .collect()
    }

    /// Typed records whose indexed field equals `key`, in insertion order.
    pub fn query_records<T: DeserializeOwned, K: Serialize>(
        &self,
        collection: &str,
        index: &str,
        key: &K,
    ) -> Result<Vec<T>> {
        let key = serde_json::to_value(key)?;
        self.collection(collection)?
            .query_by_index(index, &key)?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StudentDbError::from))
            .collect()
    }

    /// Replace a typed record. The record must carry an existing identifier.
    pub fn update_record<T: Serialize>(&self, collection: &str, record: &T) -> Result<()> {
        self.collection(collection)?
            .update(serde_json::to_value(record)?)
    }

    /// Number of records in a collection
    pub fn count(&self, collection: &str) -> Result<u64> {
        self.collection(collection)?.count()
    }

    /// Get status information: schema version and per-collection counts.
    pub fn status(&self) -> Result<Value> {
        let mut collections = serde_json::Map::new();
        for name in self.schema.collections.keys() {
            let count = self.db.count_records(name)?;
            let indexes: Vec<String> = self
                .db
                .list_indexes(name)?
                .into_iter()
                .map(|index| index.name)
                .collect();
            collections.insert(
                name.clone(),
                serde_json::json!({ "count": count, "indexes": indexes }),
            );
        }

        Ok(serde_json::json!({
            "schema_version": self.schema.version,
            "schema_hash": hash_schema(&self.schema_yaml),
            "path": self.path.as_ref().map(|p| p.display().to_string()),
            "collections": collections,
        }))
    }
}

/// A handle to a collection within a store.
/// Records are JSON objects; the key path field is injected on read and
/// never stored inside the record body.
pub struct Collection<'a> {
    store: &'a Store,
    name: String,
    definition: &'a CollectionDefinition,
}

impl<'a> Collection<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a record under a fresh identifier. Any identifier already present
    /// in the record is ignored. Returns the new identifier.
    pub fn insert(&self, record: Value) -> Result<RecordId> {
        let body = self.body_of(record)?;
        let id = self.store.atomically(|store| {
            let id = store.db.next_id(&self.name)?;
            self.check_unique(&body, None)?;
            store
                .db
                .insert_record(&self.name, id, &serde_json::to_string(&body)?)?;
            self.write_index_entries(&body, id)?;
            Ok(id)
        })?;
        log::debug!("Inserted {}/{id}", self.name);
        Ok(id)
    }

    /// Get a record by identifier
    pub fn get(&self, id: RecordId) -> Result<Option<Value>> {
        self.store
            .db
            .get_record(&self.name, id)?
            .map(|row| self.hydrate(row))
            .transpose()
    }

    /// List all records in this collection
    pub fn list(&self) -> Result<Vec<Value>> {
        self.store
            .db
            .list_records(&self.name)?
            .into_iter()
            .map(|row| self.hydrate(row))
            .collect()
    }

    /// All records whose indexed field equals `key`
    pub fn query_by_index(&self, index: &str, key: &Value) -> Result<Vec<Value>> {
        if self.definition.index(index).is_none() {
            return Err(StudentDbError::Schema(format!(
                "Index '{}.{index}' not found in schema",
                self.name
            )));
        }
        let key = serde_json::to_string(key)?;
        self.store
            .db
            .query_index(&self.name, index, &key)?
            .into_iter()
            .map(|row| self.hydrate(row))
            .collect()
    }

    /// Replace an existing record. Fails with `NotFound` if its identifier is unknown.
    pub fn update(&self, record: Value) -> Result<()> {
        let id = self.id_of(&record)?;
        let body = self.body_of(record)?;
        self.store.atomically(|store| {
            let json = serde_json::to_string(&body)?;
            if !store.db.replace_record(&self.name, id, &json)? {
                return Err(StudentDbError::not_found(&self.name, id));
            }
            store.db.delete_index_entries(&self.name, id)?;
            self.check_unique(&body, Some(id))?;
            self.write_index_entries(&body, id)
        })?;
        log::debug!("Updated {}/{id}", self.name);
        Ok(())
    }

    /// Delete a record and its index entries
    pub fn delete(&self, id: RecordId) -> Result<()> {
        self.store.atomically(|store| {
            if !store.db.delete_record(&self.name, id)? {
                return Err(StudentDbError::not_found(&self.name, id));
            }
            store.db.delete_index_entries(&self.name, id)
        })?;
        log::debug!("Deleted {}/{id}", self.name);
        Ok(())
    }

    /// Number of records in this collection
    pub fn count(&self) -> Result<u64> {
        self.store.db.count_records(&self.name)
    }

    fn key_path(&self) -> &str {
        &self.definition.key_path
    }

    fn id_of(&self, record: &Value) -> Result<RecordId> {
        record
            .get(self.key_path())
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                StudentDbError::Schema(format!(
                    "Record for '{}' has no integer '{}' field",
                    self.name,
                    self.key_path()
                ))
            })
    }

    /// Strip the key path from a record, leaving the stored body.
    fn body_of(&self, record: Value) -> Result<Value> {
        match record {
            Value::Object(mut fields) => {
                fields.remove(self.key_path());
                Ok(Value::Object(fields))
            }
            other => Err(StudentDbError::Schema(format!(
                "Records in '{}' must be JSON objects, got {other}",
                self.name
            ))),
        }
    }

    /// Rebuild a full record from a stored row.
    fn hydrate(&self, row: RecordRow) -> Result<Value> {
        let mut value: Value = serde_json::from_str(&row.data_json)?;
        if let Value::Object(fields) = &mut value {
            fields.insert(self.key_path().to_string(), Value::from(row.id));
        }
        Ok(value)
    }

    fn check_unique(&self, body: &Value, own_id: Option<RecordId>) -> Result<()> {
        for (index_name, index) in &self.definition.indexes {
            if !index.unique {
                continue;
            }
            let field = index.field(index_name);
            if let Some(key) = index_key(body, field)? {
                let owner = self.store.db.find_unique_owner(&self.name, index_name, &key)?;
                if owner.is_some() && owner != own_id {
                    return Err(StudentDbError::ConstraintViolation {
                        collection: self.name.clone(),
                        index: index_name.clone(),
                        value: display_key(body, field),
                    });
                }
            }
        }
        Ok(())
    }

    fn write_index_entries(&self, body: &Value, id: RecordId) -> Result<()> {
        for (index_name, index) in &self.definition.indexes {
            if let Some(key) = index_key(body, index.field(index_name))? {
                self.store
                    .db
                    .insert_index_entry(&self.name, index_name, &key, id, index.unique)?;
            }
        }
        Ok(())
    }
}

/// Encoded index key for `field`, or `None` when the record does not carry it.
fn index_key(body: &Value, field: &str) -> Result<Option<String>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::to_string(value)?)),
    }
}

fn display_key(body: &Value, field: &str) -> String {
    match body.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{parse_schema_str, ATTENDANCE, MARKS, STUDENTS};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn student(roll: &str) -> Value {
        json!({
            "name": format!("Student {roll}"),
            "rollNumber": roll,
            "email": format!("{roll}@example.com"),
            "class": "CS-A",
        })
    }

    #[test]
    fn test_open_creates_schema_collections() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.schema().collections.len(), 3);
        assert_eq!(store.collection(MARKS).unwrap().name(), MARKS);

        let status = store.status().unwrap();
        assert_eq!(status["schema_version"], 1);
        for name in [STUDENTS, MARKS, ATTENDANCE] {
            assert_eq!(status["collections"][name]["count"], 0);
        }
        assert_eq!(
            status["collections"][STUDENTS]["indexes"],
            json!(["rollNumber"])
        );
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();

        let first = students.insert(student("CS001")).unwrap();
        let second = students.insert(student("CS002")).unwrap();
        assert!(second > first);
        assert_eq!(students.count().unwrap(), 2);
    }

    #[test]
    fn test_get_injects_key_path() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();

        let id = students.insert(student("CS001")).unwrap();
        let record = students.get(id).unwrap().unwrap();
        assert_eq!(record["id"], id);
        assert_eq!(record["rollNumber"], "CS001");

        assert!(students.get(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_insert_ignores_supplied_id() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();

        let mut record = student("CS001");
        record["id"] = json!(42);
        let id = students.insert(record).unwrap();
        assert_eq!(id, 1);
        assert!(students.get(42).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_roll_number_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();
        students.insert(student("CS001")).unwrap();

        let err = students.insert(student("CS001")).unwrap_err();
        match err {
            StudentDbError::ConstraintViolation {
                collection,
                index,
                value,
            } => {
                assert_eq!(collection, STUDENTS);
                assert_eq!(index, "rollNumber");
                assert_eq!(value, "CS001");
            }
            other => panic!("expected constraint violation, got {other}"),
        }
        assert_eq!(students.count().unwrap(), 1);
    }

    #[test]
    fn test_rejected_insert_does_not_consume_id() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();
        students.insert(student("CS001")).unwrap();
        assert!(students.insert(student("CS001")).is_err());

        let next = students.insert(student("CS002")).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn test_query_by_index_in_insertion_order() {
        let store = Store::open_in_memory().unwrap();
        let marks = store.collection(MARKS).unwrap();

        for (student_id, kind) in [(1, "midterm"), (2, "midterm"), (1, "endsem")] {
            marks
                .insert(json!({ "studentId": student_id, "type": kind, "score": 1 }))
                .unwrap();
        }

        let rows = marks.query_by_index("studentId", &json!(1)).unwrap();
        let kinds: Vec<&str> = rows.iter().map(|r| r["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["midterm", "endsem"]);

        // Keys are typed: the string "1" is a different key from the number 1
        assert!(marks.query_by_index("studentId", &json!("1")).unwrap().is_empty());
    }

    #[test]
    fn test_query_unknown_index() {
        let store = Store::open_in_memory().unwrap();
        let marks = store.collection(MARKS).unwrap();
        assert!(matches!(
            marks.query_by_index("type", &json!("midterm")),
            Err(StudentDbError::Schema(_))
        ));
    }

    #[test]
    fn test_update_replaces_record_and_index() {
        let store = Store::open_in_memory().unwrap();
        let marks = store.collection(MARKS).unwrap();
        let id = marks
            .insert(json!({ "studentId": 1, "type": "fat1", "score": 10 }))
            .unwrap();

        marks
            .update(json!({ "id": id, "studentId": 2, "type": "fat1", "score": 20 }))
            .unwrap();

        assert!(marks.query_by_index("studentId", &json!(1)).unwrap().is_empty());
        let moved = marks.query_by_index("studentId", &json!(2)).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0]["score"], 20);
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let marks = store.collection(MARKS).unwrap();
        let err = marks
            .update(json!({ "id": 7, "studentId": 1, "score": 1 }))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(marks.count().unwrap(), 0);
    }

    #[test]
    fn test_update_without_identity() {
        let store = Store::open_in_memory().unwrap();
        let marks = store.collection(MARKS).unwrap();
        assert!(matches!(
            marks.update(json!({ "studentId": 1 })),
            Err(StudentDbError::Schema(_))
        ));
    }

    #[test]
    fn test_update_keeping_own_roll_number() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();
        let id = students.insert(student("CS001")).unwrap();

        let mut record = students.get(id).unwrap().unwrap();
        record["email"] = json!("new@example.com");
        students.update(record).unwrap();

        let other = students.insert(student("CS002")).unwrap();
        let mut clash = students.get(other).unwrap().unwrap();
        clash["rollNumber"] = json!("CS001");
        assert!(students.update(clash).unwrap_err().is_constraint_violation());

        // Failed update left the record untouched
        assert_eq!(students.get(other).unwrap().unwrap()["rollNumber"], "CS002");
    }

    #[test]
    fn test_delete_removes_index_entries() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();
        let id = students.insert(student("CS001")).unwrap();

        students.delete(id).unwrap();
        assert!(students.get(id).unwrap().is_none());
        assert!(students.delete(id).unwrap_err().is_not_found());

        // Roll number is free again
        students.insert(student("CS001")).unwrap();
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let students = store.collection(STUDENTS).unwrap();
        assert!(students.insert(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_collection_not_found() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.collection("teachers"),
            Err(StudentDbError::Schema(_))
        ));
    }

    #[test]
    fn test_atomically_rolls_back_on_error() {
        let store = Store::open_in_memory().unwrap();

        let result: Result<()> = store.atomically(|store| {
            store.insert_record(STUDENTS, &student("CS001"))?;
            store.insert_record(MARKS, &json!({ "studentId": 1, "score": 5 }))?;
            Err(StudentDbError::Other("boom".into()))
        });
        assert!(result.is_err());

        assert_eq!(store.count(STUDENTS).unwrap(), 0);
        assert_eq!(store.count(MARKS).unwrap(), 0);
    }

    #[test]
    fn test_create_collections_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        store.insert_record(STUDENTS, &student("CS001")).unwrap();

        store.create_collections().unwrap();
        store.create_collections().unwrap();

        assert_eq!(store.count(STUDENTS).unwrap(), 1);
        let next = store.insert_record(STUDENTS, &student("CS002")).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn test_data_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("studentdb.sqlite3");

        {
            let store = Store::open(&path).unwrap();
            store.insert_record(STUDENTS, &student("CS001")).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.count(STUDENTS).unwrap(), 1);
        let students: Vec<Value> = store.list_records(STUDENTS).unwrap();
        assert_eq!(students[0]["rollNumber"], "CS001");
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_new_index_is_backfilled_on_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("studentdb.sqlite3");

        let v1 = "version: 1\ncollections:\n  marks: {}\n";
        {
            let store =
                Store::open_with_schema(&path, parse_schema_str(v1).unwrap(), v1).unwrap();
            store
                .insert_record(MARKS, &json!({ "studentId": 5, "score": 1 }))
                .unwrap();
        }

        let v2 = "version: 1\ncollections:\n  marks:\n    indexes:\n      studentId: {}\n";
        let store = Store::open_with_schema(&path, parse_schema_str(v2).unwrap(), v2).unwrap();
        let rows: Vec<Value> = store.query_records(MARKS, "studentId", &5).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_failed_commit_closes_unit_of_work() {
        let store = Store::open_in_memory().unwrap();
        store
            .db
            .connection()
            .execute_batch(
                "PRAGMA foreign_keys = ON;
                 CREATE TABLE parent (id INTEGER PRIMARY KEY);
                 CREATE TABLE child (
                     parent_id INTEGER REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED
                 );",
            )
            .unwrap();

        // The dangling child row only fails at commit time
        let result = store.atomically(|store| {
            store.insert_record(STUDENTS, &student("CS001"))?;
            store
                .db
                .connection()
                .execute_batch("INSERT INTO child (parent_id) VALUES (99)")?;
            Ok(())
        });
        assert!(matches!(result, Err(StudentDbError::Sqlite(_))));

        assert!(store.db.connection().is_autocommit());
        assert_eq!(store.count(STUDENTS).unwrap(), 0);
        store.insert_record(STUDENTS, &student("CS001")).unwrap();
        assert_eq!(store.count(STUDENTS).unwrap(), 1);
    }

    #[test]
    fn test_recorded_newer_version_is_refused() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("studentdb.sqlite3");
        Store::open(&path).unwrap();

        SystemDb::open(&path)
            .unwrap()
            .record_schema(2, "written-by-newer-build", "version: 2\ncollections: {}\n")
            .unwrap();

        let result = Store::open(&path);
        assert!(matches!(result, Err(StudentDbError::StorageUnavailable(_))));
    }

    #[test]
    fn test_unopenable_path_is_storage_unavailable() {
        let tmp = TempDir::new().unwrap();
        let result = Store::open(tmp.path());
        assert!(matches!(result, Err(StudentDbError::StorageUnavailable(_))));
    }

    #[test]
    fn test_newer_schema_version_is_refused() {
        let yaml = "version: 2\ncollections: {}\n";
        let result = Store::open_in_memory_with_schema(parse_schema_str(yaml).unwrap(), yaml);
        assert!(matches!(result, Err(StudentDbError::StorageUnavailable(_))));
    }
}
