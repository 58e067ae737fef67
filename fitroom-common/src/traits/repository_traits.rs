use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::garment::Garment;
use crate::models::profile::{AvatarImage, ModelProfile};
use crate::models::tryon::TryOnTask;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_by_user(&self, user_id: Uuid) -> Result<Option<ModelProfile>, Error>;
    async fn create(&self, profile: &ModelProfile) -> Result<(), Error>;
    async fn update(&self, profile: &ModelProfile) -> Result<(), Error>;

    /// Empties url and garment_id of every slot for the user.
    async fn clear_garment_slots(&self, user_id: Uuid) -> Result<(), Error>;

    /// Point update of the last-result pointer.
    async fn set_current_tryon_image(&self, user_id: Uuid, url: &str) -> Result<(), Error>;

    async fn set_current_avatar(&self, user_id: Uuid, url: &str) -> Result<(), Error>;

    /// Replaces the stored gallery wholesale (used for id back-fill and
    /// add/remove operations).
    async fn save_avatar_gallery(
        &self,
        user_id: Uuid,
        gallery: &[AvatarImage],
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait TryOnTaskRepository: Send + Sync {
    async fn insert(&self, task: &TryOnTask) -> Result<(), Error>;

    async fn get(&self, user_id: Uuid, task_id: &str) -> Result<Option<TryOnTask>, Error>;

    /// Overwrites the output URL of one task, keyed by task id and user id.
    /// Returns false when no such row exists (the task may belong to another
    /// user, or was never written).
    async fn update_output_url(
        &self,
        user_id: Uuid,
        task_id: &str,
        url: &str,
    ) -> Result<bool, Error>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TryOnTask>, Error>;

    /// Succeeded tasks with a stored result image, newest completion first.
    async fn list_succeeded(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TryOnTask>, Error>;
}

#[async_trait]
pub trait GarmentRepository: Send + Sync {
    async fn find_by_id(&self, garment_id: &str) -> Result<Option<Garment>, Error>;
}
