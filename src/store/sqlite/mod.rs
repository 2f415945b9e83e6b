//! `SQLite` Store Implementation
//!
//! This module implements the [`Store`] trait for `SQLite` database files.
//!
//! # Implementation Notes
//! - Uses `rusqlite` (synchronous driver, no async needed)
//! - Stateless: a connection is opened, used and closed within each call
//! - `PRAGMA foreign_keys = ON` is set on every connection so that the
//!   `ON DELETE` actions of the schema take effect
//! - BLOB data is Base64-encoded for display

use rusqlite::{Connection, OpenFlags, Params, Row};
use std::path::{Path, PathBuf};

use crate::error::{Result, RosterError};
use crate::store::{
    ConnectionConfig, DatabaseType, EntityKind, ListQuery, NewEmployee, NewRole, Relation,
    ResultSet, Store, SEED_SQL,
};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    salary NUMERIC NOT NULL,
    department_id INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role_id INTEGER REFERENCES roles(id) ON DELETE SET NULL,
    manager_id INTEGER REFERENCES employees(id) ON DELETE SET NULL
);
";

/// `SQLite` store backed by a database file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    file: PathBuf,
}

impl SqliteStore {
    /// Create a store for the given database file
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// Create a store from a connection config
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        if config.engine != DatabaseType::SQLite {
            return Err(RosterError::validation(format!(
                "Expected SQLite engine, got {}",
                config.engine
            )));
        }

        let file = config
            .file
            .as_ref()
            .ok_or_else(|| RosterError::validation("SQLite requires 'file' parameter"))?;

        Ok(Self::new(file.clone()))
    }

    /// Path of the database file
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    fn connect(&self) -> Result<Connection> {
        open_connection(&self.file)
    }
}

impl Store for SqliteStore {
    async fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| RosterError::data_access(format!("Failed to create schema: {e}")))
    }

    async fn seed(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| RosterError::data_access(format!("Failed to begin transaction: {e}")))?;
        tx.execute_batch(SEED_SQL)
            .map_err(|e| RosterError::data_access(format!("Failed to insert sample data: {e}")))?;
        tx.commit()
            .map_err(|e| RosterError::data_access(format!("Failed to commit sample data: {e}")))
    }

    async fn fetch(&self, query: ListQuery) -> Result<ResultSet> {
        let conn = self.connect()?;

        match query {
            ListQuery::Departments => {
                query_result_set(&conn, "SELECT id, name FROM departments ORDER BY id", [])
            }
            ListQuery::Roles => query_result_set(
                &conn,
                "SELECT r.id, r.title, d.name AS department, r.salary
                 FROM roles r
                 JOIN departments d ON r.department_id = d.id
                 ORDER BY r.id",
                [],
            ),
            ListQuery::Employees => query_result_set(
                &conn,
                "SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department, r.salary,
                        m.first_name || ' ' || m.last_name AS manager
                 FROM employees e
                 LEFT JOIN roles r ON e.role_id = r.id
                 LEFT JOIN departments d ON r.department_id = d.id
                 LEFT JOIN employees m ON e.manager_id = m.id
                 ORDER BY e.id",
                [],
            ),
            ListQuery::Managers => query_result_set(
                &conn,
                "SELECT DISTINCT e.id, e.first_name, e.last_name
                 FROM employees e
                 JOIN employees m ON e.id = m.manager_id
                 ORDER BY e.id",
                [],
            ),
            ListQuery::EmployeesByManager(manager_id) => query_result_set(
                &conn,
                "SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department, r.salary
                 FROM employees e
                 LEFT JOIN roles r ON e.role_id = r.id
                 LEFT JOIN departments d ON r.department_id = d.id
                 WHERE e.manager_id = ?1
                 ORDER BY e.id",
                [manager_id],
            ),
        }
    }

    async fn add_department(&self, name: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("INSERT INTO departments (name) VALUES (?1)", [name])
            .map_err(|e| RosterError::data_access(format!("Failed to add department: {e}")))?;
        Ok(())
    }

    async fn add_role(&self, role: &NewRole) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO roles (title, salary, department_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![role.title, role.salary, role.department_id],
        )
        .map_err(|e| RosterError::data_access(format!("Failed to add role: {e}")))?;
        Ok(())
    }

    async fn add_employee(&self, employee: &NewEmployee) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO employees (first_name, last_name, role_id, manager_id)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                employee.first_name,
                employee.last_name,
                employee.role_id,
                employee.manager_id
            ],
        )
        .map_err(|e| RosterError::data_access(format!("Failed to add employee: {e}")))?;
        Ok(())
    }

    async fn update_employee_role(&self, employee_id: i64, role_id: i64) -> Result<u64> {
        let conn = self.connect()?;
        let changed = conn
            .execute("UPDATE employees SET role_id = ?1 WHERE id = ?2", [role_id, employee_id])
            .map_err(|e| {
                RosterError::data_access(format!("Failed to update employee role: {e}"))
            })?;
        Ok(changed as u64)
    }

    async fn lookup_dependents(&self, relation: Relation, parent_id: i64) -> Result<ResultSet> {
        let conn = self.connect()?;

        let sql = match relation {
            Relation::RolesInDepartment => {
                "SELECT id, title FROM roles WHERE department_id = ?1 ORDER BY id"
            }
            Relation::EmployeesInDepartment => {
                "SELECT e.id, e.first_name, e.last_name
                 FROM employees e
                 JOIN roles r ON e.role_id = r.id
                 WHERE r.department_id = ?1
                 ORDER BY e.id"
            }
            Relation::EmployeesWithRole => {
                "SELECT id, first_name, last_name FROM employees WHERE role_id = ?1 ORDER BY id"
            }
            Relation::DirectReports => {
                "SELECT id, first_name, last_name FROM employees WHERE manager_id = ?1 ORDER BY id"
            }
        };

        query_result_set(&conn, sql, [parent_id])
    }

    async fn delete_entity(&self, kind: EntityKind, id: i64) -> Result<u64> {
        let conn = self.connect()?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table_name());
        let changed = conn
            .execute(&sql, [id])
            .map_err(|e| RosterError::data_access(format!("Failed to delete {kind}: {e}")))?;
        Ok(changed as u64)
    }
}

/// Open a read-write `SQLite` connection with foreign keys enforced
fn open_connection(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;

    let conn = Connection::open_with_flags(path, flags)
        .map_err(|e| RosterError::data_access(format!("Failed to open SQLite database: {e}")))?;

    conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(|e| {
        RosterError::data_access(format!("Failed to enable foreign keys: {e}"))
    })?;

    Ok(conn)
}

/// Run a row-returning statement and collect it into a [`ResultSet`]
fn query_result_set<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<ResultSet> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| RosterError::data_access(format!("Failed to prepare query: {e}")))?;

    let column_names: Vec<String> = stmt.column_names().iter().map(|s| (*s).to_string()).collect();
    let column_count = column_names.len();
    let mut result = ResultSet::new(column_names)?;

    let mut rows = stmt
        .query(params)
        .map_err(|e| RosterError::data_access(format!("Failed to execute query: {e}")))?;

    while let Some(row) = rows
        .next()
        .map_err(|e| RosterError::data_access(format!("Failed to fetch row: {e}")))?
    {
        let values = row_to_json(column_count, row)
            .map_err(|e| RosterError::data_access(format!("Failed to read row: {e}")))?;
        result.push_row(values)?;
    }

    Ok(result)
}

/// Convert a `SQLite` row to positional JSON values
fn row_to_json(
    column_count: usize,
    row: &Row,
) -> std::result::Result<Vec<serde_json::Value>, rusqlite::Error> {
    (0..column_count).map(|idx| sqlite_value_to_json(row, idx)).collect()
}

/// Convert `SQLite` value to JSON value
fn sqlite_value_to_json(
    row: &Row,
    idx: usize,
) -> std::result::Result<serde_json::Value, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    let value_ref = row.get_ref(idx)?;

    Ok(match value_ref {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number), // NaN/Infinity as null
        ValueRef::Text(s) => {
            let text = std::str::from_utf8(s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            serde_json::Value::String(text.to_string())
        }
        ValueRef::Blob(b) => {
            use base64::Engine;
            serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
        }
    })
}
