//! Roster - Employee Directory Manager
//!
//! Roster manages departments, roles and employees stored in a relational
//! database, through an interactive terminal menu or one-shot subcommands.
//!
//! # Core Principles
//! - Destructive actions show their impact and require explicit confirmation
//! - Each database engine carries its own SQL (no query abstraction layer)
//! - Logs go to stderr; stdout carries tables and messages only
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`output`] - Classified console messages
//! - [`table`] - Plain-text table rendering
//! - [`store`] - Data store trait, core types and engine implementations
//! - [`impact`] - Dependency table and impact analysis
//! - [`workflow`] - Analyze, warn, confirm and delete
//! - [`prompt`] - Console interaction
//! - [`menu`] - Interactive menu loop
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod impact;
pub mod menu;
pub mod output;
pub mod prompt;
pub mod store;
pub mod table;
pub mod workflow;

// Re-export commonly used types for convenience
pub use config::{
    resolve_connection, save_connection, ConfigLocation, ConnectionRegistry, StoredConnection,
};
pub use error::{Result, RosterError};
pub use impact::{analyze, DependencyEdge, ImpactReport, Severity, DEPENDENCY_TABLE};
pub use menu::{MenuAction, MenuCoordinator};
pub use output::{Message, MessageClass};
pub use prompt::{Console, TerminalConsole};
pub use store::{
    ConnectionConfig, DatabaseType, EntityKind, ListQuery, NewEmployee, NewRole, Relation,
    ResultSet, Store,
};
pub use table::render;
pub use workflow::{DeletionOutcome, DeletionWorkflow};
