//! Pure planning over the on-disk listing and the persisted records.

use mongomigrate_store::{Batch, BatchStatus, Direction};

/// Index of the newest on-disk migration that is not past the alive tail.
///
/// Everything at or before this index is considered already covered by
/// history; `None` when nothing is alive.
fn superseded_index(on_disk: &[String], alive: &[String]) -> Option<usize> {
    let last_alive = alive.last()?;
    on_disk.iter().rposition(|name| name <= last_alive)
}

/// Names to apply, in order.
///
/// By default only names newer than the alive tail run, so a file that
/// sorts before an already applied one is skipped. With
/// `allow_out_of_order` every on-disk name not in the alive list runs.
pub(crate) fn up_names(on_disk: &[String], alive: &[String], allow_out_of_order: bool) -> Vec<String> {
    match superseded_index(on_disk, alive) {
        None => on_disk.to_vec(),
        Some(_) if allow_out_of_order => on_disk
            .iter()
            .filter(|name| !alive.contains(name))
            .cloned()
            .collect(),
        Some(index) => on_disk[index + 1..].to_vec(),
    }
}

/// Names to revert for this batch, in execution order.
///
/// A failed `up` batch reverses only its applied prefix; a failed `down`
/// batch resumes at the step after the last one that succeeded; a
/// completed batch reverses in full.
pub(crate) fn down_names(batch: &Batch) -> Vec<String> {
    match (batch.status, batch.direction) {
        (BatchStatus::Failed, Direction::Up) => {
            let applied = match last_step_index(batch) {
                Some(index) => &batch.migrations[..=index],
                None => &[],
            };
            applied.iter().rev().cloned().collect()
        }
        (BatchStatus::Failed, Direction::Down) => {
            let next = last_step_index(batch).map(|index| index + 1).unwrap_or(0);
            batch.migrations[next..].to_vec()
        }
        _ => batch.migrations.iter().rev().cloned().collect(),
    }
}

fn last_step_index(batch: &Batch) -> Option<usize> {
    let last = batch.migration.as_deref()?;
    batch.migrations.iter().position(|name| name == last)
}
