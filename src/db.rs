use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// A persisted translated value for one object's field in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub id: i64,
    pub content_type: String,
    pub object_id: String,
    pub field: String,
    pub language: String,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Initialize database connection and create tables
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        // Check if migration is needed
        let needs_migration = Self::needs_migration(&conn)?;

        if needs_migration {
            Self::run_migration(&conn)?;
        } else {
            // Create table with current schema (for fresh databases)
            conn.execute(
                "CREATE TABLE IF NOT EXISTS translations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    content_type TEXT NOT NULL,
                    object_id TEXT NOT NULL,
                    field TEXT NOT NULL,
                    language TEXT NOT NULL,
                    text TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (content_type, object_id, field, language)
                )",
                [],
            )
            .context("Failed to create translations table")?;
        }

        // Index on the pair the reconciler partitions by (safe to run always)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_translations_pair
             ON translations (content_type, field)",
            [],
        )
        .context("Failed to create pair index")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Check if database migration is needed
    fn needs_migration(conn: &Connection) -> Result<bool> {
        // Check if translations table exists
        let table_exists: bool = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='translations'",
            [],
            |row| row.get::<_, i64>(0).map(|count| count > 0),
        )?;

        if !table_exists {
            return Ok(false); // New database, no migration needed
        }

        // Check if updated_at column exists
        let column_exists: bool = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('translations') WHERE name='updated_at'",
            [],
            |row| row.get::<_, i64>(0).map(|count| count > 0),
        )?;

        Ok(!column_exists) // Need migration if updated_at doesn't exist
    }

    /// Run database migration from old schema to new schema
    fn run_migration(conn: &Connection) -> Result<()> {
        conn.execute("BEGIN TRANSACTION", [])?;

        match Self::run_migration_inner(conn) {
            Ok(_) => {
                conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(e) => {
                conn.execute("ROLLBACK", [])?;
                Err(e).context("Migration failed and was rolled back")
            }
        }
    }

    fn run_migration_inner(conn: &Connection) -> Result<()> {
        // Create new table with all columns
        conn.execute(
            "CREATE TABLE translations_new (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_type TEXT NOT NULL,
                object_id TEXT NOT NULL,
                field TEXT NOT NULL,
                language TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (content_type, object_id, field, language)
            )",
            [],
        )
        .context("Failed to create new translations table")?;

        // Copy existing data
        // Legacy rows were never touched after creation: updated_at = created_at
        conn.execute(
            "INSERT INTO translations_new (id, content_type, object_id, field, language, text, created_at, updated_at)
             SELECT id, content_type, object_id, field, language, text, created_at, created_at
             FROM translations",
            [],
        ).context("Failed to copy data to new table")?;

        // Drop old table
        conn.execute("DROP TABLE translations", [])
            .context("Failed to drop old table")?;

        // Rename new table
        conn.execute("ALTER TABLE translations_new RENAME TO translations", [])
            .context("Failed to rename table")?;

        Ok(())
    }

    /// Insert a translation or overwrite the text of an existing one.
    ///
    /// The record is keyed by (content type, object id, field, language);
    /// rewriting an existing key bumps `updated_at` and keeps `created_at`.
    pub fn upsert_translation(
        &self,
        content_type: &str,
        object_id: &str,
        field: &str,
        language: &str,
        text: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO translations (content_type, object_id, field, language, text, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT (content_type, object_id, field, language)
             DO UPDATE SET text = excluded.text, updated_at = excluded.updated_at",
            params![content_type, object_id, field, language, text, now],
        )
        .context("Failed to upsert translation")?;

        Ok(())
    }

    /// Get a single translation record, if one exists.
    pub fn get_translation(
        &self,
        content_type: &str,
        object_id: &str,
        field: &str,
        language: &str,
    ) -> Result<Option<TranslationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, content_type, object_id, field, language, text, created_at, updated_at
             FROM translations
             WHERE content_type = ?1 AND object_id = ?2 AND field = ?3 AND language = ?4",
        )?;

        let record = stmt
            .query_row(params![content_type, object_id, field, language], |row| {
                Self::record_from_row(row)
            })
            .optional()?;

        Ok(record)
    }

    /// Get all records for one object in one language.
    pub fn translations_for_object(
        &self,
        content_type: &str,
        object_id: &str,
        language: &str,
    ) -> Result<Vec<TranslationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, content_type, object_id, field, language, text, created_at, updated_at
             FROM translations
             WHERE content_type = ?1 AND object_id = ?2 AND language = ?3
             ORDER BY field",
        )?;

        let records = stmt
            .query_map(params![content_type, object_id, language], |row| {
                Self::record_from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get all records for a content type in one language.
    ///
    /// Used by the apply surface to fetch a whole batch of objects' records
    /// in a single query pass and group them in memory.
    pub fn translations_for_type(
        &self,
        content_type: &str,
        language: &str,
    ) -> Result<Vec<TranslationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, content_type, object_id, field, language, text, created_at, updated_at
             FROM translations
             WHERE content_type = ?1 AND language = ?2
             ORDER BY object_id, field",
        )?;

        let records = stmt
            .query_map(params![content_type, language], |row| {
                Self::record_from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Replace all of one object's translations in one language.
    ///
    /// Deletes the object's existing records for the language and inserts the
    /// given (field, text) entries inside a single transaction, so a failed
    /// renewal never leaves the object half-translated.
    pub fn replace_object_translations(
        &self,
        content_type: &str,
        object_id: &str,
        language: &str,
        entries: &[(String, String)],
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN TRANSACTION", [])?;

        let result =
            Self::replace_object_translations_inner(&conn, content_type, object_id, language, entries);

        match result {
            Ok(inserted) => {
                conn.execute("COMMIT", [])?;
                Ok(inserted)
            }
            Err(e) => {
                conn.execute("ROLLBACK", [])?;
                Err(e).context("Translation renewal failed and was rolled back")
            }
        }
    }

    fn replace_object_translations_inner(
        conn: &Connection,
        content_type: &str,
        object_id: &str,
        language: &str,
        entries: &[(String, String)],
    ) -> Result<usize> {
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "DELETE FROM translations
             WHERE content_type = ?1 AND object_id = ?2 AND language = ?3",
            params![content_type, object_id, language],
        )
        .context("Failed to delete old translations")?;

        for (field, text) in entries {
            conn.execute(
                "INSERT INTO translations (content_type, object_id, field, language, text, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![content_type, object_id, field, language, text, now],
            )
            .context("Failed to insert renewed translation")?;
        }

        Ok(entries.len())
    }

    /// The distinct (content type, field) pairs present in the store.
    ///
    /// This is the persisted universe the reconciler partitions against the
    /// manifest. Sorted for deterministic reporting.
    pub fn distinct_field_pairs(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT content_type, field FROM translations
             ORDER BY content_type, field",
        )?;

        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pairs)
    }

    /// Count records carrying a (content type, field) pair, across all
    /// objects and languages.
    pub fn count_for_pair(&self, content_type: &str, field: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM translations WHERE content_type = ?1 AND field = ?2",
        )?;
        let count: i64 = stmt.query_row(params![content_type, field], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete every record of each given (content type, field) pair.
    ///
    /// All pairs are removed inside one transaction; a reconciliation run
    /// either prunes everything it reported or nothing.
    pub fn delete_field_pairs(&self, pairs: &[(String, String)]) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN TRANSACTION", [])?;

        let mut deleted = 0usize;
        for (content_type, field) in pairs {
            let result = conn.execute(
                "DELETE FROM translations WHERE content_type = ?1 AND field = ?2",
                params![content_type, field],
            );
            match result {
                Ok(rows) => deleted += rows,
                Err(e) => {
                    conn.execute("ROLLBACK", [])?;
                    return Err(e).context("Failed to delete obsolete translations");
                }
            }
        }

        conn.execute("COMMIT", [])?;
        Ok(deleted)
    }

    /// Total number of translation records.
    pub fn record_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM translations")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Record counts grouped by language.
    pub fn language_counts(&self) -> Result<Vec<(String, usize)>> {
        self.grouped_counts("language")
    }

    /// Record counts grouped by content type.
    pub fn content_type_counts(&self) -> Result<Vec<(String, usize)>> {
        self.grouped_counts("content_type")
    }

    fn grouped_counts(&self, column: &str) -> Result<Vec<(String, usize)>> {
        // `column` is one of our own identifiers, never user input
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {col}, COUNT(*) FROM translations GROUP BY {col} ORDER BY {col}",
            col = column
        ))?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TranslationRecord> {
        Ok(TranslationRecord {
            id: row.get(0)?,
            content_type: row.get(1)?,
            object_id: row.get(2)?,
            field: row.get(3)?,
            language: row.get(4)?,
            text: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}
