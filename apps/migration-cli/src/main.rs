use backend::config::{DbConfig, DbKind};
use backend::connect_db;
use clap::{Parser, ValueEnum};
use migration::{get_latest_migration_version, migrate, MigrationCommand};
use tracing::{error, info};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Command {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl From<Command> for MigrationCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Up => MigrationCommand::Up,
            Command::Down => MigrationCommand::Down,
            Command::Fresh => MigrationCommand::Fresh,
            Command::Reset => MigrationCommand::Reset,
            Command::Refresh => MigrationCommand::Refresh,
            Command::Status => MigrationCommand::Status,
        }
    }
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Ticket backend database migration tool")]
struct Args {
    /// Migration command to run
    #[arg(value_enum)]
    command: Command,

    /// Database URL. Defaults to DATABASE_URL, or a Postgres URL built from DB_*.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_env_filter("migration=info,backend=info,sqlx=warn")
        .init();

    let args = Args::parse();

    let db = match args.database_url {
        Some(url) => DbConfig::from_url(url),
        None => match DbConfig::from_lookup(|key| std::env::var(key).ok()) {
            Ok(db) => db,
            Err(e) => {
                error!(error = %e, "No database configured");
                std::process::exit(2);
            }
        },
    };

    // Each CLI run would get a new, empty in-memory database.
    if db.kind() == DbKind::SqliteMemory {
        error!("In-memory SQLite is not supported; use a Postgres URL or a SQLite file");
        std::process::exit(2);
    }

    let conn = match connect_db(&db).await {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = %e, "Could not connect");
            std::process::exit(1);
        }
    };

    let command = MigrationCommand::from(args.command);
    if let Err(e) = migrate(&conn, command).await {
        error!(error = %e, command = ?args.command, "Migration failed");
        std::process::exit(1);
    }

    let latest = get_latest_migration_version(&conn)
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| "none".to_string());
    info!(
        command = ?args.command,
        db = %db.sanitized_url(),
        latest = %latest,
        "Migration finished"
    );
}
