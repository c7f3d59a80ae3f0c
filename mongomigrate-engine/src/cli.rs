use std::path::PathBuf;

use clap::Parser;
use mongodb::Client;
use mongomigrate_cli::{CreateError, MigrateSubcommands, create_migration_file};
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::{Context, EngineError, MigratorTrait, store::MongoStore};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("connection string `{0}` names no database")]
    MissingDatabase(String),
}

#[derive(Parser)]
#[command(version)]
pub struct Cli {
    #[arg(
        global = true,
        short = 'u',
        long,
        env = "MONGODB_URL",
        help = "MongoDB connection string, including the database",
        default_value = "mongodb://localhost:27017/test"
    )]
    database_url: String,

    #[arg(
        global = true,
        short = 'c',
        long,
        env = "MIGRATIONS_COLLECTION",
        help = "Collection holding the migration records",
        default_value = "migrations"
    )]
    collection: String,

    #[arg(
        global = true,
        short = 'm',
        long,
        env = "MIGRATIONS_DIR",
        help = "Directory with the migration source files",
        default_value = "./migrations"
    )]
    migrations: PathBuf,

    #[command(subcommand)]
    command: Option<MigrateSubcommands>,
}

pub async fn run_migrate<M>(_: M) -> Result<(), CliError>
where
    M: MigratorTrait,
{
    dispatch::<M>(Cli::parse()).await
}

async fn dispatch<M>(cli: Cli) -> Result<(), CliError>
where
    M: MigratorTrait,
{
    // scaffolding needs no database connection
    if let Some(MigrateSubcommands::Create { title }) = &cli.command {
        let name = create_migration_file(&cli.migrations, title.as_deref()).await?;
        println!("New migration created: {name}");
        return Ok(());
    }

    let client = Client::with_uri_str(&cli.database_url).await?;
    let database = client
        .default_database()
        .ok_or_else(|| CliError::MissingDatabase(cli.database_url.clone()))?;
    let store = MongoStore::from_database(&database, &cli.collection);
    let mut ctx = Context::new();
    ctx.insert_resource(database);

    match cli.command {
        Some(MigrateSubcommands::Up { allow_out_of_order }) => {
            M::up(&ctx, &store, &cli.migrations, allow_out_of_order).await?
        }
        Some(MigrateSubcommands::Down) => M::down(&ctx, &store, &cli.migrations).await?,
        Some(MigrateSubcommands::Status) => {
            for (name, status) in M::status(&store, &cli.migrations).await? {
                println!("Migration `{name}`, status: `{status}`");
            }
        }
        Some(MigrateSubcommands::Create { .. }) => unreachable!("handled above"),
        None => M::up(&ctx, &store, &cli.migrations, false).await?,
    }
    Ok(())
}

/// Entry point for a migration runner binary. Initializes logging, runs
/// the requested command and exits non-zero on failure.
pub async fn run_cli<M>(migrator: M)
where
    M: MigratorTrait,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run_migrate(migrator).await {
        error!("{err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            error!("caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
