use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use uuid::Uuid;

use crate::{
    generic::{RecordStore, StoreError},
    records::{Batch, BatchStatus, ControlDocument},
};

#[derive(Debug, Default)]
struct Inner {
    control: Option<ControlDocument>,
    batches: HashMap<Uuid, Batch>,
    order: Vec<Uuid>,
    fail_saves: bool,
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every save returns `StoreError::Unavailable` without
    /// touching the stored records.
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn control_document(&self) -> Option<ControlDocument> {
        self.lock().control.clone()
    }

    /// All batches ever saved, in first-save order.
    pub fn batches(&self) -> Vec<Batch> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.batches.get(id).cloned())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }

    fn check_available(inner: &Inner) -> Result<(), StoreError> {
        if inner.fail_saves {
            Err(StoreError::Unavailable("save failure injected".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn control(&self) -> Result<Option<ControlDocument>, StoreError> {
        Ok(self.lock().control.clone())
    }

    async fn save_control(
        &self,
        control: &ControlDocument,
    ) -> Result<ControlDocument, StoreError> {
        let mut inner = self.lock();
        Self::check_available(&inner)?;
        inner.control = Some(control.clone());
        Ok(control.clone())
    }

    async fn batch(&self, id: Uuid) -> Result<Option<Batch>, StoreError> {
        Ok(self.lock().batches.get(&id).cloned())
    }

    async fn save_batch(&self, batch: &Batch) -> Result<Batch, StoreError> {
        let mut inner = self.lock();
        Self::check_available(&inner)?;
        if !inner.batches.contains_key(&batch.id) {
            inner.order.push(batch.id);
        }
        inner.batches.insert(batch.id, batch.clone());
        Ok(batch.clone())
    }

    async fn find_failed(&self, id: Uuid) -> Result<Option<Batch>, StoreError> {
        Ok(self
            .lock()
            .batches
            .get(&id)
            .filter(|batch| batch.status == BatchStatus::Failed)
            .cloned())
    }
}
