use std::path::Path;

use chrono::Utc;
use quote::quote;
use syn::parse2;
use thiserror::Error;
use tokio::fs;
use tokio_stream::{StreamExt, wrappers::ReadDirStream};

const MIGRATION_FILE_PREFIX: &str = "version";
const DATE_FILE_FMT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parser(#[from] syn::Error),
}

fn base_name() -> String {
    format!(
        "{}_{}",
        MIGRATION_FILE_PREFIX,
        Utc::now().format(DATE_FILE_FMT)
    )
}

/// Appends a counter to `base` until the composed name is free. Two
/// migrations created within the same second must not share a name.
fn unique_name(existing: &[String], base: &str, title: Option<&str>) -> String {
    let compose = |counter: usize| {
        let mut name = if counter == 0 {
            base.to_string()
        } else {
            format!("{base}_{counter}")
        };
        if let Some(title) = title {
            name.push('_');
            name.push_str(title);
        }
        name
    };

    let mut counter = 0;
    loop {
        let name = compose(counter);
        if !existing.contains(&name) {
            return name;
        }
        counter += 1;
    }
}

fn migration_template(name: &str) -> Result<String, CreateError> {
    let tokens = quote! {
        use mongomigrate::{Context, MigrationError, MigrationTrait};

        const NAME: &str = #name;

        #[derive(Debug)]
        pub struct Migration;

        #[async_trait::async_trait]
        impl MigrationTrait for Migration {
            fn name(&self) -> &str {
                NAME
            }

            async fn apply(&self, _ctx: &Context) -> Result<(), MigrationError> {
                todo!()
            }

            async fn revert(&self, _ctx: &Context) -> Result<(), MigrationError> {
                todo!()
            }
        }
    };
    Ok(prettyplease::unparse(&parse2(tokens)?))
}

/// Writes a fresh migration module into `folder` and returns its name.
pub async fn create_migration_file(
    folder: impl AsRef<Path>,
    title: Option<&str>,
) -> Result<String, CreateError> {
    let folder = folder.as_ref();
    fs::create_dir_all(folder).await?;

    let mut existing = Vec::new();
    let mut entries = ReadDirStream::new(fs::read_dir(folder).await?);
    while let Some(entry) = entries.next().await {
        let file_name = entry?.file_name();
        if let Some(stem) = file_name
            .into_string()
            .ok()
            .and_then(|name| name.strip_suffix(".rs").map(ToOwned::to_owned))
        {
            existing.push(stem);
        }
    }

    let name = unique_name(&existing, &base_name(), title);
    fs::write(
        folder.join(format!("{name}.rs")),
        migration_template(&name)?,
    )
    .await?;
    Ok(name)
}
