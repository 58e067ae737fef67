// File: fitroom-common/src/models/mod.rs
pub mod garment;
pub mod profile;
pub mod tryon;

pub use garment::Garment;
pub use profile::{AvatarImage, GarmentSlot, GarmentSlots, ModelProfile, SlotEntry};
pub use tryon::{ConsumedGarment, GarmentSnapshotEntry, TaskStatus, TryOnOutcome, TryOnTask};
