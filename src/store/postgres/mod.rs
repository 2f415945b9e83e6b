//! `PostgreSQL` Store Implementation
//!
//! This module implements the [`Store`] trait for `PostgreSQL` databases.
//!
//! # Implementation Notes
//! - Uses `tokio-postgres` (async driver, requires tokio runtime)
//! - One client per session; the connection driver is spawned on the runtime
//! - Ids are `BIGINT` so they bind directly as `i64`
//! - `NUMERIC` salaries are read back through a `::TEXT` cast
//! - BYTEA data is Base64-encoded for display

use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Row};

use crate::error::{Result, RosterError};
use crate::store::{
    ConnectionConfig, DatabaseType, EntityKind, ListQuery, NewEmployee, NewRole, Relation,
    ResultSet, Store, SEED_SQL,
};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS departments (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(30) NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS roles (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(30) NOT NULL,
    salary DECIMAL NOT NULL,
    department_id BIGINT NOT NULL REFERENCES departments(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS employees (
    id BIGSERIAL PRIMARY KEY,
    first_name VARCHAR(30) NOT NULL,
    last_name VARCHAR(30) NOT NULL,
    role_id BIGINT REFERENCES roles(id) ON DELETE SET NULL,
    manager_id BIGINT REFERENCES employees(id) ON DELETE SET NULL
);
";

/// `PostgreSQL` store holding one client for the session
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect using the given config
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        if config.engine != DatabaseType::Postgres {
            return Err(RosterError::validation(format!(
                "Expected PostgreSQL engine, got {}",
                config.engine
            )));
        }

        let pg_config = build_pg_config(config)?;

        let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
            RosterError::data_access(format!("Failed to connect to PostgreSQL: {e}"))
        })?;

        // Connection errors are not logged in detail to prevent credential leakage
        tokio::spawn(async move {
            if connection.await.is_err() {
                tracing::warn!("PostgreSQL connection closed with an error");
            }
        });

        Ok(Self { client })
    }

    async fn query_result_set(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<ResultSet> {
        let stmt = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| RosterError::data_access(format!("Failed to prepare query: {e}")))?;

        let column_names: Vec<String> =
            stmt.columns().iter().map(|c| c.name().to_string()).collect();

        let rows = self
            .client
            .query(&stmt, params)
            .await
            .map_err(|e| RosterError::data_access(format!("Failed to execute query: {e}")))?;

        let mut result = ResultSet::new(column_names)?;
        for row in rows {
            result.push_row(row_to_json(&row)?)?;
        }

        Ok(result)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)], what: &str) -> Result<u64> {
        self.client
            .execute(sql, params)
            .await
            .map_err(|e| RosterError::data_access(format!("Failed to {what}: {e}")))
    }
}

impl Store for PostgresStore {
    async fn init_schema(&self) -> Result<()> {
        self.client
            .batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| RosterError::data_access(format!("Failed to create schema: {e}")))
    }

    async fn seed(&self) -> Result<()> {
        self.client
            .batch_execute(&format!("BEGIN;\n{SEED_SQL}\nCOMMIT;"))
            .await
            .map_err(|e| RosterError::data_access(format!("Failed to insert sample data: {e}")))
    }

    async fn fetch(&self, query: ListQuery) -> Result<ResultSet> {
        match query {
            ListQuery::Departments => {
                self.query_result_set("SELECT id, name FROM departments ORDER BY id", &[]).await
            }
            ListQuery::Roles => {
                self.query_result_set(
                    "SELECT r.id, r.title, d.name AS department, r.salary::TEXT AS salary
                     FROM roles r
                     JOIN departments d ON r.department_id = d.id
                     ORDER BY r.id",
                    &[],
                )
                .await
            }
            ListQuery::Employees => {
                self.query_result_set(
                    "SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department,
                            r.salary::TEXT AS salary,
                            m.first_name || ' ' || m.last_name AS manager
                     FROM employees e
                     LEFT JOIN roles r ON e.role_id = r.id
                     LEFT JOIN departments d ON r.department_id = d.id
                     LEFT JOIN employees m ON e.manager_id = m.id
                     ORDER BY e.id",
                    &[],
                )
                .await
            }
            ListQuery::Managers => {
                self.query_result_set(
                    "SELECT DISTINCT e.id, e.first_name, e.last_name
                     FROM employees e
                     JOIN employees m ON e.id = m.manager_id
                     ORDER BY e.id",
                    &[],
                )
                .await
            }
            ListQuery::EmployeesByManager(manager_id) => {
                self.query_result_set(
                    "SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department,
                            r.salary::TEXT AS salary
                     FROM employees e
                     LEFT JOIN roles r ON e.role_id = r.id
                     LEFT JOIN departments d ON r.department_id = d.id
                     WHERE e.manager_id = $1
                     ORDER BY e.id",
                    &[&manager_id],
                )
                .await
            }
        }
    }

    async fn add_department(&self, name: &str) -> Result<()> {
        self.execute("INSERT INTO departments (name) VALUES ($1)", &[&name], "add department")
            .await?;
        Ok(())
    }

    async fn add_role(&self, role: &NewRole) -> Result<()> {
        self.execute(
            "INSERT INTO roles (title, salary, department_id) VALUES ($1, $2::FLOAT8, $3)",
            &[&role.title, &role.salary, &role.department_id],
            "add role",
        )
        .await?;
        Ok(())
    }

    async fn add_employee(&self, employee: &NewEmployee) -> Result<()> {
        self.execute(
            "INSERT INTO employees (first_name, last_name, role_id, manager_id)
             VALUES ($1, $2, $3, $4)",
            &[&employee.first_name, &employee.last_name, &employee.role_id, &employee.manager_id],
            "add employee",
        )
        .await?;
        Ok(())
    }

    async fn update_employee_role(&self, employee_id: i64, role_id: i64) -> Result<u64> {
        self.execute(
            "UPDATE employees SET role_id = $1 WHERE id = $2",
            &[&role_id, &employee_id],
            "update employee role",
        )
        .await
    }

    async fn lookup_dependents(&self, relation: Relation, parent_id: i64) -> Result<ResultSet> {
        let sql = match relation {
            Relation::RolesInDepartment => {
                "SELECT id, title FROM roles WHERE department_id = $1 ORDER BY id"
            }
            Relation::EmployeesInDepartment => {
                "SELECT e.id, e.first_name, e.last_name
                 FROM employees e
                 JOIN roles r ON e.role_id = r.id
                 WHERE r.department_id = $1
                 ORDER BY e.id"
            }
            Relation::EmployeesWithRole => {
                "SELECT id, first_name, last_name FROM employees WHERE role_id = $1 ORDER BY id"
            }
            Relation::DirectReports => {
                "SELECT id, first_name, last_name FROM employees WHERE manager_id = $1 ORDER BY id"
            }
        };

        self.query_result_set(sql, &[&parent_id]).await
    }

    async fn delete_entity(&self, kind: EntityKind, id: i64) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table_name());
        self.execute(&sql, &[&id], &format!("delete {kind}")).await
    }
}

/// Build `PostgreSQL` connection config from `ConnectionConfig`
fn build_pg_config(config: &ConnectionConfig) -> Result<Config> {
    let host = config
        .host
        .as_ref()
        .ok_or_else(|| RosterError::validation("PostgreSQL requires 'host' parameter"))?;

    let port = config
        .port
        .ok_or_else(|| RosterError::validation("PostgreSQL requires 'port' parameter"))?;

    let user = config
        .user
        .as_ref()
        .ok_or_else(|| RosterError::validation("PostgreSQL requires 'user' parameter"))?;

    let database = config
        .database
        .as_ref()
        .ok_or_else(|| RosterError::validation("PostgreSQL requires 'database' parameter"))?;

    let mut pg_config = Config::new();
    pg_config.host(host).port(port).user(user).dbname(database);

    if let Some(password) = &config.password {
        pg_config.password(password);
    }

    Ok(pg_config)
}

/// Convert a `PostgreSQL` row to positional JSON values
fn row_to_json(row: &Row) -> Result<Vec<serde_json::Value>> {
    (0..row.len()).map(|idx| postgres_value_to_json(row, idx)).collect()
}

/// Convert `PostgreSQL` value to JSON value
fn postgres_value_to_json(row: &Row, idx: usize) -> Result<serde_json::Value> {
    use tokio_postgres::types::Type;

    let col_type = row.columns()[idx].type_().clone();

    let conversion_error =
        |e: tokio_postgres::Error| RosterError::data_access(format!("Failed to read column {idx}: {e}"));

    let value = match col_type {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(conversion_error)?
            .map(serde_json::Value::Bool),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(conversion_error)?
            .map(|v| serde_json::Value::Number(v.into())),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(conversion_error)?
            .map(|v| serde_json::Value::Number(v.into())),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(conversion_error)?
            .map(|v| serde_json::Value::Number(v.into())),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(conversion_error)?
            .and_then(|v| serde_json::Number::from_f64(f64::from(v)))
            .map(serde_json::Value::Number),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(conversion_error)?
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx).map_err(conversion_error)?.map(|b| {
            use base64::Engine;
            serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
        }),
        // Text types and anything else the queries cast to text
        _ => row
            .try_get::<_, Option<String>>(idx)
            .map_err(conversion_error)?
            .map(serde_json::Value::String),
    };

    Ok(value.unwrap_or(serde_json::Value::Null))
}
