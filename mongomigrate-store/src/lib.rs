pub mod generic;
pub mod memory;
pub mod mongo;
pub mod records;

pub use generic::{RecordStore, StoreError};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use records::{Batch, BatchRef, BatchStatus, CONTROL_DOC_ID, ControlDocument, Direction};
