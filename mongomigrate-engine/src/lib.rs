use std::{fmt::Debug, path::PathBuf};

use thiserror::Error;

mod cli;
mod context;
mod plan;
mod runner;
mod source;

#[cfg(test)]
pub(crate) mod testutil;

pub use cli::{Cli, CliError, run_cli, run_migrate};
pub use context::{Context, ContextError, Resource};
pub use runner::{MigrationStatus, MigratorTrait, apply, rollback, status};
pub use source::MigrationSource;

pub use mongomigrate_cli::{CreateError, MigrateSubcommands, create_migration_file};
pub use mongomigrate_store as store;
pub use mongomigrate_store::{MemoryStore, MongoStore, RecordStore, StoreError};

/// One reversible schema or data change.
///
/// Both steps default to no-ops so a migration may implement only the
/// direction it cares about.
#[async_trait::async_trait]
pub trait MigrationTrait: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn apply(&self, _ctx: &Context) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn revert(&self, _ctx: &Context) -> Result<(), MigrationError> {
        Ok(())
    }
}

/// Errors surfaced by user migration code.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("migrations directory `{0}` not found")]
    SourceNotFound(PathBuf),
    #[error("migration `{0}` is missing from the migrations directory or not registered")]
    ModuleNotFound(String),
    #[error("no batch to roll back")]
    NothingToRollback,
    #[error("saving migration state failed")]
    Persistence {
        /// Step about to run when the checkpoint failed, if any.
        migration: Option<String>,
        #[source]
        source: StoreError,
    },
    #[error("migration `{name}` failed")]
    MigrationFailed {
        name: String,
        #[source]
        source: MigrationError,
    },
    #[error("rollback of migration `{name}` failed")]
    RollbackFailed {
        name: String,
        #[source]
        source: MigrationError,
    },
    #[error("migration `{name}` failed ({cause}) and compensation also failed")]
    CompensationFailed {
        name: String,
        cause: MigrationError,
        #[source]
        source: Box<EngineError>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for EngineError {
    fn from(source: StoreError) -> Self {
        Self::Persistence {
            migration: None,
            source,
        }
    }
}
