//! Roster CLI Entry Point
//!
//! Subcommands:
//! - `menu` - Interactive menu (the default when no subcommand is given)
//! - `init` - Create the tables, optionally loading sample data
//! - `list` - Print one listing as a table or JSON
//! - `delete` - Delete one entity after showing its impact
//! - `connect` - Save a named connection
//!
//! Tables and messages go to stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};

use roster::config::{self, ConfigLocation, StoredConnection};
use roster::{
    ConnectionConfig, DatabaseType, DeletionOutcome, DeletionWorkflow, EntityKind, ListQuery,
    MenuCoordinator, Store, TerminalConsole, DEPENDENCY_TABLE,
};

/// Roster - manage departments, roles and employees
#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Interactive employee directory backed by PostgreSQL or SQLite")]
#[command(version)]
struct Cli {
    /// Named connection to use (defaults to the configured default)
    #[arg(long, global = true)]
    connection: Option<String>,

    /// Use this SQLite database file instead of a named connection
    #[arg(long, global = true, conflicts_with = "connection")]
    sqlite: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu
    Menu,

    /// Create the tables if they do not exist
    Init {
        /// Also insert the sample dataset
        #[arg(long)]
        seed: bool,
    },

    /// Print a listing
    List {
        entity: ListArg,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete an entity after showing its impact and confirming
    Delete { kind: KindArg, id: i64 },

    /// Save a named connection
    Connect {
        /// Name to save the connection under
        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        engine: EngineArg,

        /// Database file (sqlite)
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Read the password from this environment variable at connect time
        #[arg(long, conflicts_with = "password")]
        password_env: Option<String>,

        #[arg(long)]
        database: Option<String>,

        /// Save to the per-user config instead of `.roster/config.json`
        #[arg(long)]
        global: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListArg {
    Departments,
    Roles,
    Employees,
    Managers,
}

impl From<ListArg> for ListQuery {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::Departments => Self::Departments,
            ListArg::Roles => Self::Roles,
            ListArg::Employees => Self::Employees,
            ListArg::Managers => Self::Managers,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Department,
    Role,
    Employee,
}

impl From<KindArg> for EntityKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Department => Self::Department,
            KindArg::Role => Self::Role,
            KindArg::Employee => Self::Employee,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    Postgres,
    Sqlite,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.to_lowercase())),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    if let Err(err) = run(cli).await {
        println!("ERROR: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Menu);
    roster::impact::validate_edges(DEPENDENCY_TABLE)?;

    if let Commands::Connect {
        name,
        engine,
        file,
        host,
        port,
        user,
        password,
        password_env,
        database,
        global,
    } = command
    {
        let config = match engine {
            EngineArg::Sqlite => {
                ConnectionConfig::sqlite(file.context("--file is required for sqlite")?)
            }
            EngineArg::Postgres => ConnectionConfig {
                engine: DatabaseType::Postgres,
                host: Some(host.unwrap_or_else(|| "localhost".to_string())),
                port: Some(port.unwrap_or(5432)),
                user: Some(user.context("--user is required for postgres")?),
                password,
                database: Some(database.context("--database is required for postgres")?),
                file: None,
            },
        };
        let location = if global { ConfigLocation::Global } else { ConfigLocation::Local };
        let path = config::save_connection(
            name.clone(),
            StoredConnection { config, password_env },
            location,
        )?;
        println!("Saved connection '{name}' to {}", path.display());
        return Ok(());
    }

    let config = match cli.sqlite {
        Some(file) => ConnectionConfig::sqlite(file),
        None => config::resolve_connection(cli.connection.as_deref())?,
    };
    tracing::debug!(engine = %config.engine, "Resolved connection");

    match config.engine {
        DatabaseType::SQLite => with_sqlite(&config, command).await,
        DatabaseType::Postgres => with_postgres(&config, command).await,
    }
}

#[cfg(feature = "sqlite")]
async fn with_sqlite(config: &ConnectionConfig, command: Commands) -> anyhow::Result<()> {
    let store = roster::store::sqlite::SqliteStore::from_config(config)?;
    execute(&store, command).await
}

#[cfg(not(feature = "sqlite"))]
async fn with_sqlite(_config: &ConnectionConfig, _command: Commands) -> anyhow::Result<()> {
    bail!("roster was built without SQLite support")
}

#[cfg(feature = "postgres")]
async fn with_postgres(config: &ConnectionConfig, command: Commands) -> anyhow::Result<()> {
    let store = roster::store::postgres::PostgresStore::connect(config).await?;
    execute(&store, command).await
}

#[cfg(not(feature = "postgres"))]
async fn with_postgres(_config: &ConnectionConfig, _command: Commands) -> anyhow::Result<()> {
    bail!("roster was built without PostgreSQL support")
}

async fn execute<S: Store>(store: &S, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Menu => {
            store.init_schema().await?;
            let mut console = TerminalConsole::new();
            MenuCoordinator::new(store, &mut console).run().await?;
        }
        Commands::Init { seed } => {
            store.init_schema().await?;
            if seed {
                store.seed().await?;
            }
            println!("Database initialized");
        }
        Commands::List { entity, json } => {
            let rows = store.fetch(entity.into()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{}", roster::render(&rows));
            }
        }
        Commands::Delete { kind, id } => {
            let mut console = TerminalConsole::new();
            let outcome =
                DeletionWorkflow::default().run(store, &mut console, kind.into(), id).await;
            if let DeletionOutcome::Error(err) = outcome {
                return Err(err.into());
            }
            println!("{}", outcome.message());
        }
        Commands::Connect { .. } => bail!("connect does not use a database connection"),
    }
    Ok(())
}
