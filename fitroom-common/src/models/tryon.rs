use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::GarmentSlot;

/// Task state. The synchronous generation flow creates tasks already in a
/// terminal state; PENDING only exists for rows written by older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s {
            "PENDING" => Some(TaskStatus::Pending),
            "SUCCEEDED" => Some(TaskStatus::Succeeded),
            "FAILED" => Some(TaskStatus::Failed),
            _ => None,
        }
    }
}

/// One garment as it was staged at submission time. A frozen copy:
/// later profile mutation never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentSnapshotEntry {
    pub slot: GarmentSlot,
    pub garment_id: Option<String>,
    pub garment_url: String,
    pub slot_type: String,
    pub shop_contact_qr_url: Option<String>,
}

/// One persisted generation attempt. Immutable after creation except for
/// `output_image_url`, which the relocator overwrites with the durable URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryOnTask {
    pub task_id: String,
    pub user_id: Uuid,
    pub person_image_url: String,
    pub garments: Vec<GarmentSnapshotEntry>,
    pub status: TaskStatus,
    pub output_image_url: Option<String>,
    pub model_id: Option<String>,
    pub prompt: Option<String>,
    pub request_id: Option<String>,
    pub submit_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryOnTask {
    /// Task ids derive from the generation timestamp; the random suffix
    /// keeps two submissions in the same millisecond distinct. Uniqueness
    /// is ultimately enforced by the unique index on `tryon_tasks.task_id`.
    pub fn generate_task_id(at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("tryon-{}-{}", at.timestamp_millis(), &suffix[..4])
    }
}

/// A slot the submission consumed, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedGarment {
    pub slot: GarmentSlot,
    pub garment_url: String,
    pub garment_id: Option<String>,
}

/// Provisional submission result. `image_url` still points at the
/// provider's ephemeral hosting; relocation repairs it in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryOnOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    pub image_url: String,
    pub consumed_garments: Vec<ConsumedGarment>,
    pub model_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
