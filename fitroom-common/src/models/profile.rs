use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in the profile's avatar gallery. `avatar_id` was absent on
/// legacy rows and is back-filled lazily by the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarImage {
    #[serde(default)]
    pub avatar_id: Option<String>,
    pub url: String,
}

impl AvatarImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            avatar_id: Some(Self::generate_id()),
            url: url.into(),
        }
    }

    /// Ids are timestamp-prefixed so a gallery sorts roughly by upload time.
    pub fn generate_id() -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        format!("avatar-{}-{}", millis, &suffix[..8])
    }
}

/// The eight named garment slots a profile can stage for try-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentSlot {
    Top,
    Bottom,
    Outerwear,
    Headwear,
    Shoes,
    Bag,
    Accessories,
    Other,
}

impl GarmentSlot {
    /// Declared assembly order. Garment images are appended to a generation
    /// request in this order, never in user-specified order.
    pub const ORDERED: [GarmentSlot; 8] = [
        GarmentSlot::Top,
        GarmentSlot::Bottom,
        GarmentSlot::Outerwear,
        GarmentSlot::Headwear,
        GarmentSlot::Shoes,
        GarmentSlot::Bag,
        GarmentSlot::Accessories,
        GarmentSlot::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentSlot::Top => "top",
            GarmentSlot::Bottom => "bottom",
            GarmentSlot::Outerwear => "outerwear",
            GarmentSlot::Headwear => "headwear",
            GarmentSlot::Shoes => "shoes",
            GarmentSlot::Bag => "bag",
            GarmentSlot::Accessories => "accessories",
            GarmentSlot::Other => "other",
        }
    }

    /// Human-readable label used in prompts and task snapshots.
    pub fn label(&self) -> &'static str {
        match self {
            GarmentSlot::Top => "top garment",
            GarmentSlot::Bottom => "bottom garment",
            GarmentSlot::Outerwear => "outerwear",
            GarmentSlot::Headwear => "headwear",
            GarmentSlot::Shoes => "shoes",
            GarmentSlot::Bag => "bag",
            GarmentSlot::Accessories => "accessories",
            GarmentSlot::Other => "other clothing",
        }
    }
}

/// A single staged garment: an image URL plus an optional soft reference
/// into the garment catalog. The catalog id is never assumed to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub url: Option<String>,
    pub garment_id: Option<String>,
}

impl SlotEntry {
    pub fn is_empty(&self) -> bool {
        self.url.as_deref().map_or(true, |u| u.trim().is_empty())
    }
}

/// Fixed named fields, not a list. The latest data-shape revision of the
/// profile keeps one column pair per slot; iteration goes through
/// [`GarmentSlot::ORDERED`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentSlots {
    pub top: SlotEntry,
    pub bottom: SlotEntry,
    pub outerwear: SlotEntry,
    pub headwear: SlotEntry,
    pub shoes: SlotEntry,
    pub bag: SlotEntry,
    pub accessories: SlotEntry,
    pub other: SlotEntry,
}

impl GarmentSlots {
    pub fn get(&self, slot: GarmentSlot) -> &SlotEntry {
        match slot {
            GarmentSlot::Top => &self.top,
            GarmentSlot::Bottom => &self.bottom,
            GarmentSlot::Outerwear => &self.outerwear,
            GarmentSlot::Headwear => &self.headwear,
            GarmentSlot::Shoes => &self.shoes,
            GarmentSlot::Bag => &self.bag,
            GarmentSlot::Accessories => &self.accessories,
            GarmentSlot::Other => &self.other,
        }
    }

    pub fn get_mut(&mut self, slot: GarmentSlot) -> &mut SlotEntry {
        match slot {
            GarmentSlot::Top => &mut self.top,
            GarmentSlot::Bottom => &mut self.bottom,
            GarmentSlot::Outerwear => &mut self.outerwear,
            GarmentSlot::Headwear => &mut self.headwear,
            GarmentSlot::Shoes => &mut self.shoes,
            GarmentSlot::Bag => &mut self.bag,
            GarmentSlot::Accessories => &mut self.accessories,
            GarmentSlot::Other => &mut self.other,
        }
    }

    /// Non-empty slots in declared order.
    pub fn populated(&self) -> Vec<(GarmentSlot, &SlotEntry)> {
        GarmentSlot::ORDERED
            .iter()
            .filter_map(|&slot| {
                let entry = self.get(slot);
                if entry.is_empty() { None } else { Some((slot, entry)) }
            })
            .collect()
    }

    /// Empties both the url and garment_id of every slot.
    pub fn clear_all(&mut self) {
        *self = GarmentSlots::default();
    }
}

/// A user's try-on subject: avatar gallery, body attributes and the
/// staged garment slots. One per user, long-lived and repeatedly mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProfile {
    pub user_id: Uuid,
    pub model_name: String,
    pub avatar_images: Vec<AvatarImage>,
    pub current_avatar_url: Option<String>,
    pub current_tryon_image_url: Option<String>,
    pub gender: Option<String>,
    pub age_stage: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub body_feature: Option<String>,
    pub suitable_weather: Option<String>,
    pub shooting_style: Option<String>,
    pub mood: Option<String>,
    pub style_preference: Option<String>,
    pub description: String,
    pub enabled: bool,
    pub slots: GarmentSlots,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModelProfile {
    /// Blank enabled profile for a user; callers fill in attributes.
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            model_name: String::new(),
            avatar_images: Vec::new(),
            current_avatar_url: None,
            current_tryon_image_url: None,
            gender: None,
            age_stage: None,
            height_cm: None,
            weight_kg: None,
            body_feature: None,
            suitable_weather: None,
            shooting_style: None,
            mood: None,
            style_preference: None,
            description: String::new(),
            enabled: true,
            slots: GarmentSlots::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `url` matches a gallery entry. `current_avatar_url` must only
    /// ever be assigned from the gallery; this is the check, there is no
    /// foreign key backing it.
    pub fn has_avatar_url(&self, url: &str) -> bool {
        self.avatar_images.iter().any(|img| img.url == url)
    }
}
