pub mod commands;

pub use commands::{CreateError, MigrateSubcommands, create_migration_file};
