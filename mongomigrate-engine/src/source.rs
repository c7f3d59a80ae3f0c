use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{EngineError, MigrationTrait};

/// The migrations directory fused with the modules registered on the
/// migrator.
///
/// The directory listing is the source of truth for presence and order;
/// a name only becomes runnable once a registered module matches its
/// file stem.
pub struct MigrationSource {
    dir: PathBuf,
    modules: HashMap<String, Arc<dyn MigrationTrait>>,
}

impl MigrationSource {
    pub fn new(dir: impl AsRef<Path>, modules: Vec<Box<dyn MigrationTrait>>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            modules: modules
                .into_iter()
                .map(|module| (module.name().to_owned(), Arc::from(module)))
                .collect(),
        }
    }

    pub(crate) fn module(&self, name: &str) -> Option<Arc<dyn MigrationTrait>> {
        self.modules.get(name).cloned()
    }

    /// Registered migration names present on disk, sorted lexicographically.
    pub async fn list(&self) -> Result<Vec<String>, EngineError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::SourceNotFound(self.dir.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if self.modules.contains_key(stem) {
                names.push(stem.to_owned());
            }
        }
        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{TestMigration, write_sources};
    use tempfile::tempdir;

    #[tokio::test]
    async fn lists_registered_files_sorted() {
        let dir = tempdir().unwrap();
        write_sources(dir.path(), &["2", "10", "1", "3"]);

        let source = MigrationSource::new(
            dir.path(),
            vec![
                TestMigration::ok("1"),
                TestMigration::ok("2"),
                TestMigration::ok("3"),
                TestMigration::ok("10"),
            ],
        );
        // lexicographic, not numeric
        assert_eq!(source.list().await.unwrap(), vec!["1", "10", "2", "3"]);
    }

    #[tokio::test]
    async fn ignores_unregistered_and_non_rust_files() {
        let dir = tempdir().unwrap();
        write_sources(dir.path(), &["1", "2"]);
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("3.rs"), "").unwrap();

        let source = MigrationSource::new(dir.path(), vec![TestMigration::ok("1")]);
        assert_eq!(source.list().await.unwrap(), vec!["1"]);
    }

    #[tokio::test]
    async fn missing_directory_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let source = MigrationSource::new(&missing, vec![]);
        assert!(matches!(
            source.list().await,
            Err(EngineError::SourceNotFound(path)) if path == missing
        ));
    }
}
