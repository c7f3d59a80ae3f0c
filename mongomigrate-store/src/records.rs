use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed `_id` of the singleton control document.
pub const CONTROL_DOC_ID: &str = "__control_doc__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Up => "up",
                Self::Down => "down",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Pending => "Pending",
                Self::Completed => "Completed",
                Self::Failed => "Failed",
            }
        )
    }
}

/// Lightweight pointer to a batch record, embedded in other records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub at: DateTime<Utc>,
}

/// Singleton record holding what is currently applied.
///
/// `migrations` is the authoritative alive list. `batch` points at the last
/// fully consistent `up` batch (the tail of the history chain); `last_batch`
/// at the most recently attempted batch, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlDocument {
    pub migrations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_batch: Option<BatchRef>,
}

/// One persisted execution attempt. Batches are permanent audit history and
/// are never deleted; `prev_batch` links them into a chain, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub direction: Direction,
    /// Names planned for this batch, in execution order.
    pub migrations: Vec<String>,
    /// Last migration that finished successfully, `None` until one does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<String>,
    pub status: BatchStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub at: DateTime<Utc>,
    /// The batch this one continues (`up`) or reverses (`down`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_batch: Option<BatchRef>,
}

impl Batch {
    pub fn new(direction: Direction, migrations: Vec<String>, prev_batch: Option<BatchRef>) -> Self {
        Self {
            id: Uuid::now_v7(),
            direction,
            migrations,
            migration: None,
            status: BatchStatus::Pending,
            at: Utc::now(),
            prev_batch,
        }
    }

    pub fn reference(&self) -> BatchRef {
        BatchRef {
            id: self.id,
            at: self.at,
        }
    }
}
