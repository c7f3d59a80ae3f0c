use std::path::Path;

use crate::{Context, MigrationError, MigrationTrait};

/// Scriptable migration for exercising the runner.
#[derive(Debug)]
pub(crate) struct TestMigration {
    name: String,
    apply_ok: bool,
    revert_ok: bool,
}

impl TestMigration {
    pub(crate) fn ok(name: &str) -> Box<dyn MigrationTrait> {
        Box::new(Self {
            name: name.into(),
            apply_ok: true,
            revert_ok: true,
        })
    }

    pub(crate) fn failing_apply(name: &str) -> Box<dyn MigrationTrait> {
        Box::new(Self {
            name: name.into(),
            apply_ok: false,
            revert_ok: true,
        })
    }

    pub(crate) fn failing_revert(name: &str) -> Box<dyn MigrationTrait> {
        Box::new(Self {
            name: name.into(),
            apply_ok: true,
            revert_ok: false,
        })
    }
}

#[async_trait::async_trait]
impl MigrationTrait for TestMigration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, _ctx: &Context) -> Result<(), MigrationError> {
        if self.apply_ok {
            Ok(())
        } else {
            Err(MigrationError::Other(format!("apply of `{}` refused", self.name)))
        }
    }

    async fn revert(&self, _ctx: &Context) -> Result<(), MigrationError> {
        if self.revert_ok {
            Ok(())
        } else {
            Err(MigrationError::Other(format!("revert of `{}` refused", self.name)))
        }
    }
}

/// Drops placeholder `<name>.rs` files into `dir`.
pub(crate) fn write_sources(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(format!("{name}.rs")), "// migration body lives in code\n")
            .expect("write migration source");
    }
}
