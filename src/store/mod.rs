//! Data Store Trait and Core Types
//!
//! This module defines the data-access collaborator used by the menu, the
//! impact analyzer and the deletion workflow. Each backend (`PostgreSQL`,
//! `SQLite`) implements the [`Store`] trait.
//!
//! # Engine Isolation
//! Each store implementation is completely independent and carries its own SQL.
//! No shared SQL helpers or cross-engine abstractions, apart from the seed data
//! which is written in the common subset both dialects accept.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{Result, RosterError};

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

/// Supported database engine types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `PostgreSQL` database
    Postgres,
    /// `SQLite` database
    SQLite,
}

impl DatabaseType {
    /// Get the engine name as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::SQLite => "sqlite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection configuration for a store
///
/// Fields are engine-specific (e.g., `file` only applies to `SQLite`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database engine type
    pub engine: DatabaseType,

    /// Hostname (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Port number (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Username (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Password (for postgres)
    /// WARNING: Sensitive data, do not log or include in error messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Database name (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Database file path (for sqlite)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl ConnectionConfig {
    /// Create a new `PostgreSQL` connection config
    #[must_use]
    pub const fn postgres(
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    ) -> Self {
        Self {
            engine: DatabaseType::Postgres,
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            database: Some(database),
            file: None,
        }
    }

    /// Create a new `SQLite` connection config
    #[must_use]
    pub const fn sqlite(file: PathBuf) -> Self {
        Self {
            engine: DatabaseType::SQLite,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            file: Some(file),
        }
    }
}

/// Kind of entity managed by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Department,
    Role,
    Employee,
}

impl EntityKind {
    /// Table holding rows of this kind
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        match self {
            Self::Department => "departments",
            Self::Role => "roles",
            Self::Employee => "employees",
        }
    }

    /// Singular label used in messages
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Role => "role",
            Self::Employee => "employee",
        }
    }

    /// Plural label used in messages
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Department => "departments",
            Self::Role => "roles",
            Self::Employee => "employees",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Named lookup of rows that depend on a parent entity
///
/// The store owns the SQL behind each relation; callers only name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Roles belonging to a department
    RolesInDepartment,
    /// Employees holding any role of a department
    EmployeesInDepartment,
    /// Employees holding a role
    EmployeesWithRole,
    /// Employees reporting to a manager
    DirectReports,
}

impl Relation {
    /// Kind of the entity whose id keys this lookup
    #[must_use]
    pub const fn parent_kind(&self) -> EntityKind {
        match self {
            Self::RolesInDepartment | Self::EmployeesInDepartment => EntityKind::Department,
            Self::EmployeesWithRole => EntityKind::Role,
            Self::DirectReports => EntityKind::Employee,
        }
    }
}

/// Listing queries whose output is rendered as a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListQuery {
    /// `id, name`
    Departments,
    /// `id, title, department, salary`
    Roles,
    /// `id, first_name, last_name, title, department, salary, manager`
    Employees,
    /// Employees with at least one report: `id, first_name, last_name`
    Managers,
    /// Reports of one manager: `id, first_name, last_name, title, department, salary`
    EmployeesByManager(i64),
}

/// Parameters for a new role
#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub title: String,
    pub salary: f64,
    pub department_id: i64,
}

/// Parameters for a new employee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: i64,
    pub manager_id: Option<i64>,
}

/// Rectangular, column-labeled query result
///
/// Every row holds exactly one value per declared column, in column order.
/// Column order is the display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    /// Column names, unique within the set
    columns: Vec<String>,

    /// Rows of positional values aligned with `columns`
    rows: Vec<Vec<serde_json::Value>>,
}

impl ResultSet {
    /// Create an empty result set with the given columns
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(RosterError::validation(format!("Duplicate column '{column}'")));
            }
        }

        Ok(Self { columns, rows: Vec::new() })
    }

    /// Append a row; its arity must match the column count
    pub fn push_row(&mut self, row: Vec<serde_json::Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(RosterError::validation(format!(
                "Row has {} values but the result set declares {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`ResultSet::push_row`]
    pub fn with_row(mut self, row: Vec<serde_json::Value>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<serde_json::Value>] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`, if both exist
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&serde_json::Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}

/// Data-access collaborator
///
/// All reads are side-effect free. Mutations report the number of affected
/// rows; zero means the targeted row did not exist.
pub trait Store {
    /// Create the tables if they do not exist yet
    fn init_schema(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Insert the sample dataset
    fn seed(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Run a listing query
    fn fetch(
        &self,
        query: ListQuery,
    ) -> impl std::future::Future<Output = Result<ResultSet>> + Send;

    /// Add a department with the given name
    fn add_department(&self, name: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;

    /// Add a role to a department
    fn add_role(&self, role: &NewRole) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Add an employee
    fn add_employee(
        &self,
        employee: &NewEmployee,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Assign a role to an employee, returning the affected row count
    fn update_employee_role(
        &self,
        employee_id: i64,
        role_id: i64,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;

    /// Rows depending on `parent_id` through `relation`
    fn lookup_dependents(
        &self,
        relation: Relation,
        parent_id: i64,
    ) -> impl std::future::Future<Output = Result<ResultSet>> + Send;

    /// Delete one entity, returning the affected row count
    fn delete_entity(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}

/// Sample dataset shared by both engines
pub const SEED_SQL: &str = "
INSERT INTO departments (name) VALUES ('Engineering');
INSERT INTO departments (name) VALUES ('Finance');
INSERT INTO departments (name) VALUES ('Legal');
INSERT INTO departments (name) VALUES ('Sales');

INSERT INTO roles (title, salary, department_id)
    VALUES ('Software Engineer', 120000, (SELECT id FROM departments WHERE name = 'Engineering'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Lead Engineer', 150000, (SELECT id FROM departments WHERE name = 'Engineering'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Accountant', 125000, (SELECT id FROM departments WHERE name = 'Finance'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Account Manager', 160000, (SELECT id FROM departments WHERE name = 'Finance'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Lawyer', 190000, (SELECT id FROM departments WHERE name = 'Legal'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Legal Team Lead', 250000, (SELECT id FROM departments WHERE name = 'Legal'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Salesperson', 80000, (SELECT id FROM departments WHERE name = 'Sales'));
INSERT INTO roles (title, salary, department_id)
    VALUES ('Sales Lead', 100000, (SELECT id FROM departments WHERE name = 'Sales'));

INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('John', 'Doe', (SELECT id FROM roles WHERE title = 'Sales Lead'), NULL);
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Mike', 'Chan', (SELECT id FROM roles WHERE title = 'Salesperson'),
            (SELECT id FROM employees WHERE first_name = 'John' AND last_name = 'Doe'));
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Ashley', 'Rodriguez', (SELECT id FROM roles WHERE title = 'Lead Engineer'), NULL);
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Kevin', 'Tupik', (SELECT id FROM roles WHERE title = 'Software Engineer'),
            (SELECT id FROM employees WHERE first_name = 'Ashley' AND last_name = 'Rodriguez'));
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Kunal', 'Singh', (SELECT id FROM roles WHERE title = 'Account Manager'), NULL);
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Malia', 'Brown', (SELECT id FROM roles WHERE title = 'Accountant'),
            (SELECT id FROM employees WHERE first_name = 'Kunal' AND last_name = 'Singh'));
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Sarah', 'Lourd', (SELECT id FROM roles WHERE title = 'Legal Team Lead'), NULL);
INSERT INTO employees (first_name, last_name, role_id, manager_id)
    VALUES ('Tom', 'Allen', (SELECT id FROM roles WHERE title = 'Lawyer'),
            (SELECT id FROM employees WHERE first_name = 'Sarah' AND last_name = 'Lourd'));
";
