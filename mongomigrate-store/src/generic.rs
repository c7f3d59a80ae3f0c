use thiserror::Error;
use uuid::Uuid;

use crate::records::{Batch, ControlDocument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error(transparent)]
    Serialize(#[from] mongodb::bson::ser::Error),
    #[error(transparent)]
    Deserialize(#[from] mongodb::bson::de::Error),
    #[error("record `{0}` could not be read back after save")]
    LostRecord(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for the control document and the batch records.
///
/// Saves are upserts keyed by id and return the reloaded record, so a save
/// followed by a read in the same process observes the write.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn control(&self) -> Result<Option<ControlDocument>, StoreError>;

    async fn save_control(&self, control: &ControlDocument)
    -> Result<ControlDocument, StoreError>;

    async fn batch(&self, id: Uuid) -> Result<Option<Batch>, StoreError>;

    async fn save_batch(&self, batch: &Batch) -> Result<Batch, StoreError>;

    /// The batch with this id, only if its status is `Failed`.
    async fn find_failed(&self, id: Uuid) -> Result<Option<Batch>, StoreError>;
}
