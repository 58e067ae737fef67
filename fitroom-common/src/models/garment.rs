use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog garment. Profiles reference these by id as a soft reference;
/// a dangling id just means "no shop contact available".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Garment {
    pub garment_id: String,
    pub shop_id: Option<String>,
    pub shop_name: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub shop_qr_image_url: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
