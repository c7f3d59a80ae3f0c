use mongomigrate::{MigrationTrait, MigratorTrait};

mod version_20260830_120000_create_posts;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(version_20260830_120000_create_posts::Migration)]
    }
}

// run with: cargo run -- -u mongodb://localhost:27017/blog -m src up
#[tokio::main]
async fn main() {
    mongomigrate::run_cli(Migrator).await;
}
