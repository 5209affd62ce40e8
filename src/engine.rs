//! Sandbox databases that user queries run against.
//!
//! The [`DatabaseRegistry`] owns one in-memory SQLite connection per name.
//! A connection is created the first time its name is requested and the
//! fixture is applied exactly once; concurrent first requests for the same
//! name all receive the same connection.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DbError;

/// A scalar cell as returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Boolean(b) => write!(f, "{}", b),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One result set: column names plus row tuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub values: Vec<Vec<SqlValue>>,
}

impl QueryTable {
    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Display for QueryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }

        write!(f, "({} row{})", cells.len(), if cells.len() == 1 { "" } else { "s" })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub version: String,
}

/// A named sandbox connection.
pub struct SandboxDb {
    name: String,
    conn: Mutex<Connection>,
}

impl SandboxDb {
    fn new(name: &str, conn: Connection) -> Self {
        Self {
            name: name.to_string(),
            conn: Mutex::new(conn),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, sql: &str) -> rusqlite::Result<Vec<QueryTable>> {
        let conn = lock(&self.conn);
        let mut tables = Vec::new();
        let mut batch = Batch::new(&conn, sql);

        while let Some(mut stmt) = batch.next()? {
            if stmt.column_count() == 0 {
                stmt.execute([])?;
                continue;
            }

            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let width = columns.len();
            let mut values = Vec::new();

            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut tuple = Vec::with_capacity(width);
                for i in 0..width {
                    tuple.push(SqlValue::from(row.get_ref(i)?));
                }
                values.push(tuple);
            }

            if !values.is_empty() {
                tables.push(QueryTable { columns, values });
            }
        }

        Ok(tables)
    }

    fn table_names(&self) -> rusqlite::Result<Vec<String>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }
}

type Slot = Arc<Mutex<Option<Arc<SandboxDb>>>>;

/// Registry of named sandbox connections.
pub struct DatabaseRegistry {
    engine: OnceLock<Result<EngineInfo, String>>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Default for DatabaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseRegistry {
    pub fn new() -> Self {
        Self {
            engine: OnceLock::new(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Bring up the engine. Runs once; later calls return the cached outcome.
    pub fn initialize(&self) -> Result<&EngineInfo, DbError> {
        match self.engine.get_or_init(load_engine) {
            Ok(info) => Ok(info),
            Err(msg) => Err(DbError::EngineLoad(msg.clone())),
        }
    }

    pub fn get_or_create(&self, name: &str, schema: &str) -> Result<Arc<SandboxDb>, DbError> {
        self.initialize()?;

        // Take the per-name slot under the map lock, then create under the slot
        // lock so callers racing on one name wait for a single creation.
        let slot = lock(&self.slots).entry(name.to_string()).or_default().clone();
        let mut guard = lock(&slot);

        if let Some(db) = guard.as_ref() {
            return Ok(Arc::clone(db));
        }

        let conn = Connection::open_in_memory().map_err(|e| DbError::SchemaSetup {
            name: name.to_string(),
            source: e,
        })?;

        if !schema.trim().is_empty() {
            conn.execute_batch(schema).map_err(|e| {
                warn!(database = name, error = %e, "fixture failed to apply");
                DbError::SchemaSetup {
                    name: name.to_string(),
                    source: e,
                }
            })?;
        }

        let db = Arc::new(SandboxDb::new(name, conn));
        *guard = Some(Arc::clone(&db));
        debug!(database = name, "created sandbox");

        Ok(db)
    }

    pub fn execute(&self, name: &str, query: &str) -> Result<Vec<QueryTable>, DbError> {
        let db = self
            .lookup(name)
            .ok_or_else(|| DbError::QueryExecution(format!("no such database: {}", name)))?;

        db.run(query)
            .map_err(|e| DbError::QueryExecution(e.to_string()))
    }

    pub fn reset(&self, name: &str, schema: &str) -> Result<Arc<SandboxDb>, DbError> {
        let old = lock(&self.slots).remove(name);
        let old_db = match old {
            Some(slot) => {
                let taken = lock(&slot).take();
                taken
            }
            None => None,
        };

        if let Some(db) = old_db {
            match Arc::try_unwrap(db) {
                Ok(db) => {
                    let conn = db.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
                    if let Err((_, e)) = conn.close() {
                        debug!(database = name, error = %e, "ignoring close failure");
                    }
                }
                Err(_) => debug!(database = name, "sandbox still shared, dropping our handle"),
            }
        }

        info!(database = name, "resetting sandbox");
        self.get_or_create(name, schema)
    }

    pub fn list_tables(&self, name: &str) -> Vec<String> {
        let Some(db) = self.lookup(name) else {
            return Vec::new();
        };

        db.table_names().unwrap_or_else(|e| {
            warn!(database = name, error = %e, "listing tables failed");
            Vec::new()
        })
    }

    fn lookup(&self, name: &str) -> Option<Arc<SandboxDb>> {
        let slot = lock(&self.slots).get(name).cloned()?;
        let db = lock(&slot).clone();
        db
    }
}

fn load_engine() -> Result<EngineInfo, String> {
    let conn = Connection::open_in_memory().map_err(|e| e.to_string())?;
    let version: String = conn
        .query_row("SELECT sqlite_version()", [], |row| row.get(0))
        .map_err(|e| e.to_string())?;

    info!(version = %version, "sqlite engine ready");
    Ok(EngineInfo { version })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::thread;

    const TINY: &str = "CREATE TABLE t (a INTEGER, b TEXT); INSERT INTO t VALUES (1, 'x'), (2, NULL);";

    fn setup_registry() -> DatabaseRegistry {
        let registry = DatabaseRegistry::new();
        registry.get_or_create("tiny", TINY).unwrap();
        registry
    }

    mod init_tests {
        use super::*;

        #[test]
        fn initialize_reports_version() {
            let registry = DatabaseRegistry::new();
            let info = registry.initialize().unwrap();
            assert!(info.version.starts_with('3'));
        }

        #[test]
        fn initialize_is_cached() {
            let registry = DatabaseRegistry::new();
            let first = registry.initialize().unwrap() as *const EngineInfo;
            let second = registry.initialize().unwrap() as *const EngineInfo;
            assert_eq!(first, second);
        }
    }

    mod create_tests {
        use super::*;

        #[test]
        fn get_or_create_returns_same_connection() {
            let registry = DatabaseRegistry::new();
            let a = registry.get_or_create("x", TINY).unwrap();
            // Re-applying TINY would fail on the duplicate table, so this proves it ran once.
            let b = registry.get_or_create("x", TINY).unwrap();
            assert!(Arc::ptr_eq(&a, &b));
        }

        #[test]
        fn empty_schema_creates_blank_database() {
            let registry = DatabaseRegistry::new();
            registry.get_or_create("blank", "  ").unwrap();
            assert!(registry.lookup("blank").is_some());
            assert!(registry.list_tables("blank").is_empty());
        }

        #[test]
        fn bad_schema_is_not_registered() {
            let registry = DatabaseRegistry::new();
            let result = registry.get_or_create("bad", "CREATE TABLE (");
            assert!(matches!(result, Err(DbError::SchemaSetup { .. })));
            assert!(registry.lookup("bad").is_none());
        }

        #[test]
        fn racing_callers_share_one_connection() {
            let registry = Arc::new(DatabaseRegistry::new());
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    thread::spawn(move || registry.get_or_create("shared", TINY).unwrap())
                })
                .collect();

            let dbs: Vec<Arc<SandboxDb>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            for db in &dbs[1..] {
                assert!(Arc::ptr_eq(&dbs[0], db));
            }
        }
    }

    mod execute_tests {
        use super::*;

        #[test]
        fn select_returns_table() {
            let registry = setup_registry();
            let tables = registry.execute("tiny", "SELECT a, b FROM t ORDER BY a").unwrap();
            assert_eq!(tables.len(), 1);
            assert_eq!(tables[0].columns, vec!["a", "b"]);
            assert_eq!(
                tables[0].values,
                vec![
                    vec![SqlValue::Integer(1), SqlValue::Text("x".into())],
                    vec![SqlValue::Integer(2), SqlValue::Null],
                ]
            );
        }

        #[test]
        fn empty_select_yields_no_tables() {
            let registry = setup_registry();
            let tables = registry.execute("tiny", "SELECT * FROM t WHERE a > 10").unwrap();
            assert!(tables.is_empty());
        }

        #[test]
        fn statements_without_rows_yield_no_tables() {
            let registry = setup_registry();
            let tables = registry
                .execute("tiny", "INSERT INTO t VALUES (3, 'z'); UPDATE t SET b = 'y' WHERE a = 2")
                .unwrap();
            assert!(tables.is_empty());

            let count = registry.execute("tiny", "SELECT COUNT(*) FROM t").unwrap();
            assert_eq!(count[0].values[0][0], SqlValue::Integer(3));
        }

        #[test]
        fn multiple_selects_yield_multiple_tables() {
            let registry = setup_registry();
            let tables = registry
                .execute("tiny", "SELECT a FROM t; SELECT b FROM t WHERE a = 1;")
                .unwrap();
            assert_eq!(tables.len(), 2);
            assert_eq!(tables[1].values, vec![vec![SqlValue::Text("x".into())]]);
        }

        #[test]
        fn real_values_survive() {
            let registry = setup_registry();
            let tables = registry.execute("tiny", "SELECT AVG(a) FROM t").unwrap();
            assert_eq!(tables[0].values[0][0], SqlValue::Real(1.5));
        }

        #[test]
        fn invalid_query_carries_engine_message() {
            let registry = setup_registry();
            let err = registry.execute("tiny", "SELECT * FROM nope").unwrap_err();
            match err {
                DbError::QueryExecution(msg) => assert!(msg.contains("no such table: nope")),
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn unknown_database_fails() {
            let registry = DatabaseRegistry::new();
            let err = registry.execute("ghost", "SELECT 1").unwrap_err();
            assert!(matches!(err, DbError::QueryExecution(_)));
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn reset_restores_fixture() {
            let registry = setup_registry();
            registry.execute("tiny", "DELETE FROM t").unwrap();
            assert!(registry.execute("tiny", "SELECT * FROM t").unwrap().is_empty());

            registry.reset("tiny", TINY).unwrap();
            let tables = registry.execute("tiny", "SELECT * FROM t").unwrap();
            assert_eq!(tables[0].row_count(), 2);
        }

        #[test]
        fn reset_while_handle_is_held() {
            let registry = setup_registry();
            let held = registry.get_or_create("tiny", TINY).unwrap();
            let fresh = registry.reset("tiny", TINY).unwrap();
            assert!(!Arc::ptr_eq(&held, &fresh));
            assert_eq!(held.name(), "tiny");
        }

        #[test]
        fn reset_unknown_creates() {
            let registry = DatabaseRegistry::new();
            registry.reset("new", TINY).unwrap();
            assert!(registry.lookup("new").is_some());
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn list_tables_sorted() {
            let registry = DatabaseRegistry::new();
            registry
                .get_or_create("jobs", &fixtures::fixture_for("join-tables").unwrap())
                .unwrap();
            assert_eq!(registry.list_tables("jobs"), vec!["companies", "positions"]);
        }

        #[test]
        fn list_tables_unknown_is_empty() {
            let registry = DatabaseRegistry::new();
            assert!(registry.list_tables("ghost").is_empty());
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn table_renders_aligned() {
            let table = QueryTable {
                columns: vec!["id".into(), "name".into()],
                values: vec![
                    vec![SqlValue::Integer(1), SqlValue::Text("ASML".into())],
                    vec![SqlValue::Integer(10), SqlValue::Null],
                ],
            };
            let rendered = table.to_string();
            let lines: Vec<&str> = rendered.lines().collect();
            assert_eq!(lines[0], "id | name");
            assert_eq!(lines[1], "---+-----");
            assert_eq!(lines[2], "1  | ASML");
            assert_eq!(lines[3], "10 | NULL");
            assert_eq!(lines[4], "(2 rows)");
        }

        #[test]
        fn values_serialize_untagged() {
            let table = QueryTable {
                columns: vec!["a".into()],
                values: vec![vec![SqlValue::Null], vec![SqlValue::Integer(2)], vec![SqlValue::Text("s".into())]],
            };
            let json = serde_json::to_string(&table).unwrap();
            assert_eq!(json, r#"{"columns":["a"],"values":[[null],[2],["s"]]}"#);
            let back: QueryTable = serde_json::from_str(&json).unwrap();
            assert_eq!(back, table);
        }
    }
}
