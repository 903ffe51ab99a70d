use crate::error::{Result, StudentDbError};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

/// The SQLite substrate behind the record store: collection catalog, key
/// generators, record bodies and secondary index entries.
pub struct SystemDb {
    conn: Connection,
}

/// A stored record body and its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub id: i64,
    pub data_json: String,
}

/// A declared index as recorded in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub name: String,
    pub key_path: String,
    pub unique: bool,
}

impl SystemDb {
    /// Open or create the database file at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            StudentDbError::StorageUnavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        let db = SystemDb { conn };
        db.initialize_tables()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StudentDbError::StorageUnavailable(e.to_string()))?;
        let db = SystemDb { conn };
        db.initialize_tables()?;
        Ok(db)
    }

    fn initialize_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS schema_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version INTEGER NOT NULL,
                hash TEXT NOT NULL,
                schema_yaml TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                key_path TEXT NOT NULL,
                next_id INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS indexes (
                collection TEXT NOT NULL,
                name TEXT NOT NULL,
                key_path TEXT NOT NULL,
                is_unique INTEGER NOT NULL,
                PRIMARY KEY (collection, name)
            );

            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id INTEGER NOT NULL,
                data_json TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE TABLE IF NOT EXISTS index_entries (
                collection TEXT NOT NULL,
                index_name TEXT NOT NULL,
                key TEXT NOT NULL,
                record_id INTEGER NOT NULL,
                is_unique INTEGER NOT NULL,
                PRIMARY KEY (collection, index_name, key, record_id)
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_index_entries_unique
                ON index_entries(collection, index_name, key) WHERE is_unique = 1;
            CREATE INDEX IF NOT EXISTS idx_index_entries_record
                ON index_entries(collection, record_id);
            ",
            )
            .map_err(|e| StudentDbError::StorageUnavailable(format!("cannot create tables: {e}")))?;
        Ok(())
    }

    // ── Schema State ─────────────────────────────────────────────────

    /// Get the most recently recorded schema as `(version, hash)`.
    pub fn get_last_schema(&self) -> Result<Option<(u32, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT version, hash FROM schema_history ORDER BY id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(result)
    }

    /// Record a newly applied schema.
    pub fn record_schema(&self, version: u32, hash: &str, yaml: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO schema_history (version, hash, schema_yaml) VALUES (?1, ?2, ?3)",
            params![version, hash, yaml],
        )?;
        Ok(())
    }

    // ── Collection Catalog ───────────────────────────────────────────

    /// Register a collection if missing. Returns true when it was created.
    pub fn ensure_collection(&self, name: &str, key_path: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO collections (name, key_path) VALUES (?1, ?2)",
            params![name, key_path],
        )?;
        Ok(changed > 0)
    }

    /// Names of all registered collections.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM collections ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Register an index if missing. Returns true when it was created.
    pub fn ensure_index(
        &self,
        collection: &str,
        name: &str,
        key_path: &str,
        unique: bool,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO indexes (collection, name, key_path, is_unique)
             VALUES (?1, ?2, ?3, ?4)",
            params![collection, name, key_path, unique],
        )?;
        Ok(changed > 0)
    }

    /// Indexes registered for a collection.
    pub fn list_indexes(&self, collection: &str) -> Result<Vec<IndexRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, key_path, is_unique FROM indexes WHERE collection = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok(IndexRow {
                name: row.get(0)?,
                key_path: row.get(1)?,
                unique: row.get(2)?,
            })
        })?;
        let mut indexes = Vec::new();
        for row in rows {
            indexes.push(row?);
        }
        Ok(indexes)
    }

    /// Take the next identifier from a collection's key generator.
    pub fn next_id(&self, collection: &str) -> Result<i64> {
        let id: i64 = self
            .conn
            .query_row(
                "SELECT next_id FROM collections WHERE name = ?1",
                params![collection],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StudentDbError::Schema(format!("Collection '{collection}' does not exist")))?;
        self.conn.execute(
            "UPDATE collections SET next_id = ?1 WHERE name = ?2",
            params![id + 1, collection],
        )?;
        Ok(id)
    }

    // ── Records ──────────────────────────────────────────────────────

    pub fn insert_record(&self, collection: &str, id: i64, data_json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO records (collection, id, data_json) VALUES (?1, ?2, ?3)",
            params![collection, id, data_json],
        )?;
        Ok(())
    }

    /// Replace a record body. Returns false when no such record exists.
    pub fn replace_record(&self, collection: &str, id: i64, data_json: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE records SET data_json = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection, id, data_json],
        )?;
        Ok(changed > 0)
    }

    pub fn get_record(&self, collection: &str, id: i64) -> Result<Option<RecordRow>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, data_json FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| {
                    Ok(RecordRow {
                        id: row.get(0)?,
                        data_json: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// All records of a collection in identifier order.
    pub fn list_records(&self, collection: &str) -> Result<Vec<RecordRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, data_json FROM records WHERE collection = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok(RecordRow {
                id: row.get(0)?,
                data_json: row.get(1)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Delete a record body. Returns false when no such record exists.
    pub fn delete_record(&self, collection: &str, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(changed > 0)
    }

    pub fn count_records(&self, collection: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ── Index Entries ────────────────────────────────────────────────

    /// The record currently holding `key` in a unique index, if any.
    pub fn find_unique_owner(
        &self,
        collection: &str,
        index_name: &str,
        key: &str,
    ) -> Result<Option<i64>> {
        let result = self
            .conn
            .query_row(
                "SELECT record_id FROM index_entries
                 WHERE collection = ?1 AND index_name = ?2 AND key = ?3 AND is_unique = 1",
                params![collection, index_name, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    pub fn insert_index_entry(
        &self,
        collection: &str,
        index_name: &str,
        key: &str,
        record_id: i64,
        unique: bool,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO index_entries (collection, index_name, key, record_id, is_unique)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![collection, index_name, key, record_id, unique],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    StudentDbError::ConstraintViolation {
                        collection: collection.to_string(),
                        index: index_name.to_string(),
                        value: key.to_string(),
                    }
                }
                other => StudentDbError::Sqlite(other),
            })?;
        Ok(())
    }

    /// Remove every index entry pointing at a record.
    pub fn delete_index_entries(&self, collection: &str, record_id: i64) -> Result<()> {
        self.conn.execute(
            "DELETE FROM index_entries WHERE collection = ?1 AND record_id = ?2",
            params![collection, record_id],
        )?;
        Ok(())
    }

    /// Records whose indexed key equals `key`, in identifier order.
    pub fn query_index(
        &self,
        collection: &str,
        index_name: &str,
        key: &str,
    ) -> Result<Vec<RecordRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.data_json FROM index_entries e
             JOIN records r ON r.collection = e.collection AND r.id = e.record_id
             WHERE e.collection = ?1 AND e.index_name = ?2 AND e.key = ?3
             ORDER BY r.id",
        )?;
        let rows = stmt.query_map(params![collection, index_name, key], |row| {
            Ok(RecordRow {
                id: row.get(0)?,
                data_json: row.get(1)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    // ── Savepoints ───────────────────────────────────────────────────

    /// Open a (possibly nested) unit of work.
    pub fn savepoint(&self) -> Result<()> {
        self.conn.execute_batch("SAVEPOINT studentdb")?;
        Ok(())
    }

    /// Commit the innermost unit of work into its parent.
    pub fn release(&self) -> Result<()> {
        self.conn.execute_batch("RELEASE studentdb")?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Undo and close the innermost unit of work.
    pub fn rollback(&self) -> Result<()> {
        self.conn
            .execute_batch("ROLLBACK TO studentdb; RELEASE studentdb")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_students() -> SystemDb {
        let db = SystemDb::open_in_memory().unwrap();
        db.ensure_collection("students", "id").unwrap();
        db.ensure_index("students", "rollNumber", "rollNumber", true)
            .unwrap();
        db
    }

    #[test]
    fn test_key_generator_is_monotonic() {
        let db = db_with_students();
        assert_eq!(db.next_id("students").unwrap(), 1);
        assert_eq!(db.next_id("students").unwrap(), 2);
        assert_eq!(db.next_id("students").unwrap(), 3);
    }

    #[test]
    fn test_next_id_unknown_collection() {
        let db = SystemDb::open_in_memory().unwrap();
        assert!(matches!(
            db.next_id("nope"),
            Err(StudentDbError::Schema(_))
        ));
    }

    #[test]
    fn test_ensure_collection_is_idempotent() {
        let db = db_with_students();
        assert!(!db.ensure_collection("students", "id").unwrap());
        assert!(!db
            .ensure_index("students", "rollNumber", "rollNumber", true)
            .unwrap());
        assert_eq!(db.list_collections().unwrap(), vec!["students".to_string()]);
        assert_eq!(db.list_indexes("students").unwrap().len(), 1);
    }

    #[test]
    fn test_insert_get_and_list_records() {
        let db = db_with_students();
        db.insert_record("students", 2, "{\"name\":\"B\"}").unwrap();
        db.insert_record("students", 1, "{\"name\":\"A\"}").unwrap();

        let one = db.get_record("students", 1).unwrap().unwrap();
        assert_eq!(one.data_json, "{\"name\":\"A\"}");
        assert!(db.get_record("students", 9).unwrap().is_none());

        let all = db.list_records("students").unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(db.count_records("students").unwrap(), 2);
    }

    #[test]
    fn test_replace_and_delete_missing_record() {
        let db = db_with_students();
        assert!(!db.replace_record("students", 1, "{}").unwrap());
        assert!(!db.delete_record("students", 1).unwrap());
    }

    #[test]
    fn test_unique_index_entry_rejects_duplicate() {
        let db = db_with_students();
        db.insert_index_entry("students", "rollNumber", "\"CS001\"", 1, true)
            .unwrap();
        assert_eq!(
            db.find_unique_owner("students", "rollNumber", "\"CS001\"")
                .unwrap(),
            Some(1)
        );

        let err = db
            .insert_index_entry("students", "rollNumber", "\"CS001\"", 2, true)
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_non_unique_index_query() {
        let db = SystemDb::open_in_memory().unwrap();
        db.ensure_collection("marks", "id").unwrap();
        for (id, student) in [(1, 1), (2, 2), (3, 1)] {
            db.insert_record("marks", id, "{}").unwrap();
            db.insert_index_entry("marks", "studentId", &student.to_string(), id, false)
                .unwrap();
        }

        let rows = db.query_index("marks", "studentId", "1").unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

        db.delete_index_entries("marks", 3).unwrap();
        assert_eq!(db.query_index("marks", "studentId", "1").unwrap().len(), 1);
    }

    #[test]
    fn test_schema_history() {
        let db = SystemDb::open_in_memory().unwrap();
        assert!(db.get_last_schema().unwrap().is_none());

        db.record_schema(1, "abc123", "version: 1").unwrap();
        db.record_schema(1, "def456", "version: 1\ncollections: {}")
            .unwrap();
        assert_eq!(
            db.get_last_schema().unwrap(),
            Some((1, "def456".to_string()))
        );
    }

    #[test]
    fn test_savepoint_rollback() {
        let db = db_with_students();

        db.savepoint().unwrap();
        db.insert_record("students", 1, "{}").unwrap();
        db.rollback().unwrap();
        assert_eq!(db.count_records("students").unwrap(), 0);

        db.savepoint().unwrap();
        db.insert_record("students", 1, "{}").unwrap();
        db.release().unwrap();
        assert_eq!(db.count_records("students").unwrap(), 1);
    }

    #[test]
    fn test_nested_savepoint_rolls_back_inner_only() {
        let db = db_with_students();

        db.savepoint().unwrap();
        db.insert_record("students", 1, "{}").unwrap();
        db.savepoint().unwrap();
        db.insert_record("students", 2, "{}").unwrap();
        db.rollback().unwrap();
        db.release().unwrap();

        let ids: Vec<i64> = db
            .list_records("students")
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }
}
