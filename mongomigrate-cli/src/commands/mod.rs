mod create;

use clap::Subcommand;

pub use create::{CreateError, create_migration_file};

fn parse_migration_title(raw: &str) -> Result<String, String> {
    if raw.contains('-') {
        Err(String::from("must not contain a hyphen (\"-\")"))
    } else {
        Ok(raw.trim().to_lowercase().replace(" ", "_"))
    }
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum MigrateSubcommands {
    #[command(about = "Apply pending migrations")]
    Up {
        #[arg(long, help = "also apply migrations older than the newest applied one")]
        allow_out_of_order: bool,
    },
    #[command(about = "Revert the most recent batch")]
    Down,
    #[command(about = "Show migration status")]
    Status,
    #[command(about = "Generate a new migration file")]
    Create {
        #[arg(required = false, value_parser = parse_migration_title)]
        title: Option<String>,
    },
}
