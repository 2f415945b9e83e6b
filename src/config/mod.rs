//! Configuration Management
//!
//! This module handles loading and saving named database connections.
//!
//! # Configuration Locations
//! - Local: `.roster/config.json` (per working directory, team-shareable)
//! - Global: `~/.config/roster/connections.json` (per-user)
//!
//! # Resolution Precedence
//! 1. Explicit `--sqlite <file>` on the command line (handled by the binary)
//! 2. Named connection (`--connection <name>`) from the merged registry
//! 3. The registry's default connection
//!
//! Local entries override global entries of the same name, and a local default
//! overrides the global one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, RosterError};
use crate::store::ConnectionConfig;

/// Connection registry as stored in a config file
///
/// ```json
/// {
///   "connections": {
///     "local": { "engine": "sqlite", "file": "roster.db" },
///     "office": { "engine": "postgres", "host": "db", "port": 5432,
///                 "user": "hr", "database": "employees", "password_env": "ROSTER_PW" }
///   },
///   "default": "local"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRegistry {
    /// Named connections
    #[serde(default)]
    pub connections: BTreeMap<String, StoredConnection>,

    /// Name of the default connection (must exist in `connections`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Stored connection configuration
///
/// Like `ConnectionConfig`, but the password may come from an environment
/// variable instead of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConnection {
    /// Connection configuration
    #[serde(flatten)]
    pub config: ConnectionConfig,

    /// Environment variable holding the password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

impl StoredConnection {
    /// Resolve environment variables into a usable `ConnectionConfig`
    pub fn resolve(&self) -> Result<ConnectionConfig> {
        let mut config = self.config.clone();

        if let Some(env_var) = &self.password_env {
            let password = std::env::var(env_var).map_err(|_| {
                RosterError::config_error(format!(
                    "Environment variable {env_var} not found for password"
                ))
            })?;
            config.password = Some(password);
        }

        Ok(config)
    }
}

/// Configuration file location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Local config: `.roster/config.json`
    Local,
    /// Global config: `~/.config/roster/connections.json`
    Global,
}

/// Get path to local config file (`.roster/config.json`)
pub fn local_config_path() -> Result<PathBuf> {
    let current_dir = std::env::current_dir().map_err(|e| {
        RosterError::config_error(format!("Could not determine current directory: {e}"))
    })?;

    Ok(current_dir.join(".roster").join("config.json"))
}

/// Get path to global config file (`~/.config/roster/connections.json`)
pub fn global_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| RosterError::config_error("Could not determine user config directory"))?;

    Ok(config_dir.join("roster").join("connections.json"))
}

/// Path of the config file for `location`
pub fn config_path(location: ConfigLocation) -> Result<PathBuf> {
    match location {
        ConfigLocation::Local => local_config_path(),
        ConfigLocation::Global => global_config_path(),
    }
}

/// Load a registry from a config file; a missing file is an empty registry
pub fn load_registry(path: &Path) -> Result<ConnectionRegistry> {
    if !path.exists() {
        return Ok(ConnectionRegistry::default());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| RosterError::config_error(format!("Could not read config file: {e}")))?;

    serde_json::from_str(&contents)
        .map_err(|e| RosterError::config_error(format!("Invalid config file format: {e}")))
}

/// Save a registry to a config file, creating parent directories
pub fn save_registry(path: &Path, registry: &ConnectionRegistry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RosterError::config_error(format!("Could not create config directory: {e}"))
        })?;
    }

    let contents = serde_json::to_string_pretty(registry)
        .map_err(|e| RosterError::config_error(format!("Could not serialize config: {e}")))?;

    fs::write(path, contents)
        .map_err(|e| RosterError::config_error(format!("Could not write config file: {e}")))
}

/// Merge two registries; `local` wins on name clashes and on the default
#[must_use]
pub fn merge(global: ConnectionRegistry, local: ConnectionRegistry) -> ConnectionRegistry {
    let mut merged = global;
    merged.connections.extend(local.connections);
    if local.default.is_some() {
        merged.default = local.default;
    }
    merged
}

/// Load the merged view of the local and global config files
pub fn load_with_precedence() -> Result<ConnectionRegistry> {
    let global = load_registry(&global_config_path()?)?;
    let local = load_registry(&local_config_path()?)?;
    Ok(merge(global, local))
}

/// Resolve a connection from `registry` by name, or its default
pub fn resolve_from(registry: &ConnectionRegistry, name: Option<&str>) -> Result<ConnectionConfig> {
    let available = || registry.connections.keys().cloned().collect::<Vec<_>>();

    let conn_name = match name {
        Some(n) => n,
        None => registry.default.as_deref().ok_or_else(|| {
            RosterError::config_error(format!(
                "No default connection set. Available connections: {:?}. \
                 Run 'roster connect' or pass --sqlite <file>.",
                available()
            ))
        })?,
    };

    let stored = registry.connections.get(conn_name).ok_or_else(|| {
        RosterError::config_error(format!(
            "Connection '{conn_name}' not found. Available connections: {:?}",
            available()
        ))
    })?;

    stored.resolve()
}

/// Resolve a connection by name (or the default) from the merged config files
pub fn resolve_connection(name: Option<&str>) -> Result<ConnectionConfig> {
    resolve_from(&load_with_precedence()?, name)
}

/// Add or replace `name` in `registry`; the first connection becomes the default
pub fn insert_connection(registry: &mut ConnectionRegistry, name: String, stored: StoredConnection) {
    let is_first_connection = registry.connections.is_empty();
    registry.connections.insert(name.clone(), stored);
    if is_first_connection || registry.default.is_none() {
        registry.default = Some(name);
    }
}

/// Save a connection to the config file at `location`
pub fn save_connection(name: String, stored: StoredConnection, location: ConfigLocation) -> Result<PathBuf> {
    let path = config_path(location)?;
    let mut registry = load_registry(&path)?;
    insert_connection(&mut registry, name, stored);
    save_registry(&path, &registry)?;
    Ok(path)
}
