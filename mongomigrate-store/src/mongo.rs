use mongodb::{
    Collection, Database,
    bson::{Document, doc, from_document, to_document},
    options::ReplaceOptions,
};
use uuid::Uuid;

use crate::{
    generic::{RecordStore, StoreError},
    records::{Batch, CONTROL_DOC_ID, ControlDocument},
};

/// Both record kinds live in one collection, the control document under its
/// fixed `_id` and batches under their UUID string ids.
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    pub fn from_database(database: &Database, collection: &str) -> Self {
        Self::new(database.collection(collection))
    }

    async fn upsert(&self, filter: Document, record: Document) -> Result<(), StoreError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection.replace_one(filter, record, options).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for MongoStore {
    async fn control(&self) -> Result<Option<ControlDocument>, StoreError> {
        self.collection
            .find_one(doc! { "_id": CONTROL_DOC_ID }, None)
            .await?
            .map(from_document)
            .transpose()
            .map_err(Into::into)
    }

    async fn save_control(
        &self,
        control: &ControlDocument,
    ) -> Result<ControlDocument, StoreError> {
        self.upsert(doc! { "_id": CONTROL_DOC_ID }, to_document(control)?)
            .await?;
        self.control()
            .await?
            .ok_or_else(|| StoreError::LostRecord(CONTROL_DOC_ID.into()))
    }

    async fn batch(&self, id: Uuid) -> Result<Option<Batch>, StoreError> {
        self.collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?
            .map(from_document)
            .transpose()
            .map_err(Into::into)
    }

    async fn save_batch(&self, batch: &Batch) -> Result<Batch, StoreError> {
        self.upsert(doc! { "_id": batch.id.to_string() }, to_document(batch)?)
            .await?;
        self.batch(batch.id)
            .await?
            .ok_or_else(|| StoreError::LostRecord(batch.id.to_string()))
    }

    async fn find_failed(&self, id: Uuid) -> Result<Option<Batch>, StoreError> {
        self.collection
            .find_one(doc! { "_id": id.to_string(), "status": "Failed" }, None)
            .await?
            .map(from_document)
            .transpose()
            .map_err(Into::into)
    }
}
