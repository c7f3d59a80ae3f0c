use std::{path::Path, sync::Arc};

use chrono::Utc;
use mongomigrate_store::{
    Batch, BatchRef, BatchStatus, ControlDocument, Direction, RecordStore, StoreError,
};
use tracing::{debug, info, warn};

use crate::{Context, EngineError, MigrationError, MigrationTrait, plan, source::MigrationSource};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationStatus {
    Pending,
    Applied,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Pending => "Pending",
                Self::Applied => "Applied",
            }
        )
    }
}

/// Implemented by the user's migrator to register migration modules.
///
/// The default methods are the whole public surface of the engine; a
/// migrator normally only provides `migrations`.
#[async_trait::async_trait]
pub trait MigratorTrait: Send {
    fn migrations() -> Vec<Box<dyn MigrationTrait>>;

    fn source(dir: impl AsRef<Path>) -> MigrationSource {
        MigrationSource::new(dir, Self::migrations())
    }

    async fn up(
        ctx: &Context,
        store: &dyn RecordStore,
        dir: &Path,
        allow_out_of_order: bool,
    ) -> Result<(), EngineError> {
        apply(ctx, store, &Self::source(dir), allow_out_of_order).await
    }

    async fn down(ctx: &Context, store: &dyn RecordStore, dir: &Path) -> Result<(), EngineError> {
        rollback(ctx, store, &Self::source(dir)).await
    }

    async fn status(
        store: &dyn RecordStore,
        dir: &Path,
    ) -> Result<Vec<(String, MigrationStatus)>, EngineError> {
        status(store, &Self::source(dir)).await
    }
}

/// Applies every pending migration in one new batch.
///
/// If a step fails the batch is marked `Failed` and rolled back before
/// this returns, so a failed run never leaves work half applied.
pub async fn apply(
    ctx: &Context,
    store: &dyn RecordStore,
    source: &MigrationSource,
    allow_out_of_order: bool,
) -> Result<(), EngineError> {
    let on_disk = source.list().await?;
    let control = ensure_control(store).await?;
    let names = plan::up_names(&on_disk, &control.migrations, allow_out_of_order);
    let steps = resolve(source, &on_disk, &names)?;
    info!(count = steps.len(), "applying migrations");

    match run_batch(ctx, store, control, steps, BatchMode::Apply).await {
        Ok(()) => Ok(()),
        Err(BatchFailure::Engine(err)) => Err(err),
        Err(BatchFailure::Step { name, cause }) => {
            warn!(migration = %name, "migration failed, rolling the batch back");
            match rollback(ctx, store, source).await {
                Ok(()) => Err(EngineError::MigrationFailed { name, source: cause }),
                Err(err) => Err(EngineError::CompensationFailed {
                    name,
                    cause,
                    source: Box::new(err),
                }),
            }
        }
    }
}

/// Reverts the most recent batch.
///
/// A failed `up` batch is compensated by reverting only its applied
/// prefix; a failed `down` batch is resumed at the step it stopped on;
/// otherwise the batch at the chain tail is reversed in full.
pub async fn rollback(
    ctx: &Context,
    store: &dyn RecordStore,
    source: &MigrationSource,
) -> Result<(), EngineError> {
    let on_disk = source.list().await?;
    let control = ensure_control(store).await?;

    let tail = match &control.batch {
        Some(reference) => store.batch(reference.id).await?,
        None => None,
    };
    let failed = match &control.last_batch {
        Some(reference) => store.find_failed(reference.id).await?,
        None => None,
    };
    let target = failed.or(tail).ok_or(EngineError::NothingToRollback)?;

    let names = plan::down_names(&target);
    let steps = resolve(source, &on_disk, &names)?;
    info!(count = steps.len(), batch = %target.id, "reverting migrations");

    let mode = if target.status == BatchStatus::Failed && target.direction == Direction::Down {
        BatchMode::Resume(target)
    } else {
        BatchMode::Rollback {
            tail: target.prev_batch.clone(),
        }
    };

    run_batch(ctx, store, control, steps, mode)
        .await
        .map_err(|failure| match failure {
            BatchFailure::Step { name, cause } => EngineError::RollbackFailed { name, source: cause },
            BatchFailure::Engine(err) => err,
        })
}

/// Every migration on disk with whether it is currently applied.
pub async fn status(
    store: &dyn RecordStore,
    source: &MigrationSource,
) -> Result<Vec<(String, MigrationStatus)>, EngineError> {
    let on_disk = source.list().await?;
    let alive = store
        .control()
        .await?
        .map(|control| control.migrations)
        .unwrap_or_default();
    Ok(on_disk
        .into_iter()
        .map(|name| {
            let status = if alive.contains(&name) {
                MigrationStatus::Applied
            } else {
                MigrationStatus::Pending
            };
            (name, status)
        })
        .collect())
}

struct Step {
    name: String,
    module: Arc<dyn MigrationTrait>,
}

enum BatchMode {
    Apply,
    Rollback { tail: Option<BatchRef> },
    Resume(Batch),
}

enum BatchFailure {
    Step { name: String, cause: MigrationError },
    Engine(EngineError),
}

async fn ensure_control(store: &dyn RecordStore) -> Result<ControlDocument, EngineError> {
    match store.control().await? {
        Some(control) => Ok(control),
        None => {
            debug!("creating control document");
            Ok(store.save_control(&ControlDocument::default()).await?)
        }
    }
}

fn resolve(
    source: &MigrationSource,
    on_disk: &[String],
    names: &[String],
) -> Result<Vec<Step>, EngineError> {
    names
        .iter()
        .map(|name| {
            if !on_disk.contains(name) {
                return Err(EngineError::ModuleNotFound(name.clone()));
            }
            let module = source
                .module(name)
                .ok_or_else(|| EngineError::ModuleNotFound(name.clone()))?;
            Ok(Step {
                name: name.clone(),
                module,
            })
        })
        .collect()
}

fn step_names(steps: &[Step]) -> Vec<String> {
    steps.iter().map(|step| step.name.clone()).collect()
}

fn persistence(steps: &[Step], index: usize, source: StoreError) -> BatchFailure {
    BatchFailure::Engine(EngineError::Persistence {
        migration: steps.get(index).map(|step| step.name.clone()),
        source,
    })
}

/// Runs the steps of one batch, checkpointing the batch record and the
/// control document before every step so a crash at any point leaves a
/// resumable state.
async fn run_batch(
    ctx: &Context,
    store: &dyn RecordStore,
    mut control: ControlDocument,
    steps: Vec<Step>,
    mode: BatchMode,
) -> Result<(), BatchFailure> {
    let mut batch = match mode {
        BatchMode::Apply => {
            let batch = Batch::new(Direction::Up, step_names(&steps), control.batch.clone());
            control.batch = Some(batch.reference());
            batch
        }
        BatchMode::Rollback { tail } => {
            let batch = Batch::new(Direction::Down, step_names(&steps), control.batch.clone());
            control.batch = tail;
            batch
        }
        // a resumed batch keeps its record, ids and history intact
        BatchMode::Resume(batch) => batch,
    };
    control.last_batch = Some(batch.reference());

    let mut index = 0;
    loop {
        batch = store
            .save_batch(&batch)
            .await
            .map_err(|err| persistence(&steps, index, err))?;
        control = store
            .save_control(&control)
            .await
            .map_err(|err| persistence(&steps, index, err))?;

        let Some(step) = steps.get(index) else {
            batch.status = BatchStatus::Completed;
            store
                .save_batch(&batch)
                .await
                .map_err(|err| persistence(&steps, index, err))?;
            return Ok(());
        };

        debug!(migration = %step.name, direction = %batch.direction, "running step");
        let result = match batch.direction {
            Direction::Up => step.module.apply(ctx).await,
            Direction::Down => step.module.revert(ctx).await,
        };

        match result {
            Ok(()) => {
                batch.at = Utc::now();
                batch.migration = Some(step.name.clone());
                if let Some(last) = control.last_batch.as_mut() {
                    last.at = batch.at;
                }
                match batch.direction {
                    Direction::Up => {
                        if let Some(tail) = control.batch.as_mut() {
                            tail.at = batch.at;
                        }
                        control.migrations.push(step.name.clone());
                    }
                    Direction::Down => {
                        control.migrations.pop();
                    }
                }
                index += 1;
            }
            Err(cause) => {
                batch.status = BatchStatus::Failed;
                let name = step.name.clone();
                store
                    .save_batch(&batch)
                    .await
                    .map_err(|err| persistence(&steps, index, err))?;
                return Err(BatchFailure::Step { name, cause });
            }
        }
    }
}
