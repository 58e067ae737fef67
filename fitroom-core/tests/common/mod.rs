// tests/common/mod.rs (shared test-only mocks and fixtures)

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use fitroom_common::models::garment::Garment;
use fitroom_common::models::profile::{AvatarImage, ModelProfile};
use fitroom_common::models::tryon::TryOnTask;
use fitroom_common::traits::repository_traits::{
    GarmentRepository, ProfileRepository, TryOnTaskRepository,
};
use fitroom_common::Error;
use fitroom_core::config::ProfileTemplate;
use fitroom_core::http::HttpFetcher;
use fitroom_core::platforms::doubao::{GenerationProvider, GenerationRequest, GenerationResult};
use fitroom_core::services::tryon_service::TryOnSettings;
use fitroom_core::storage::{ObjectStore, StoredObject};

mockall::mock! {
    pub ProfileRepo {}

    #[async_trait]
    impl ProfileRepository for ProfileRepo {
        async fn get_by_user(&self, user_id: Uuid) -> Result<Option<ModelProfile>, Error>;
        async fn create(&self, profile: &ModelProfile) -> Result<(), Error>;
        async fn update(&self, profile: &ModelProfile) -> Result<(), Error>;
        async fn clear_garment_slots(&self, user_id: Uuid) -> Result<(), Error>;
        async fn set_current_tryon_image(&self, user_id: Uuid, url: &str) -> Result<(), Error>;
        async fn set_current_avatar(&self, user_id: Uuid, url: &str) -> Result<(), Error>;
        async fn save_avatar_gallery(
            &self,
            user_id: Uuid,
            gallery: &[AvatarImage],
        ) -> Result<(), Error>;
    }
}

mockall::mock! {
    pub TaskRepo {}

    #[async_trait]
    impl TryOnTaskRepository for TaskRepo {
        async fn insert(&self, task: &TryOnTask) -> Result<(), Error>;
        async fn get(&self, user_id: Uuid, task_id: &str) -> Result<Option<TryOnTask>, Error>;
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
        async fn list_succeeded(
            &self,
            user_id: Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<TryOnTask>, Error>;
    }
}

mockall::mock! {
    pub GarmentRepo {}

    #[async_trait]
    impl GarmentRepository for GarmentRepo {
        async fn find_by_id(&self, garment_id: &str) -> Result<Option<Garment>, Error>;
    }
}

mockall::mock! {
    pub Provider {}

    #[async_trait]
    impl GenerationProvider for Provider {
        async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, Error>;
    }
}

mockall::mock! {
    pub Store {}

    #[async_trait]
    impl ObjectStore for Store {
        async fn put(&self, bytes: &[u8], cloud_path: &str) -> Result<StoredObject, Error>;
    }
}

mockall::mock! {
    pub Fetcher {}

    #[async_trait]
    impl HttpFetcher for Fetcher {
        async fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, Error>;
    }
}

pub fn test_template() -> ProfileTemplate {
    ProfileTemplate {
        model_name: "My model".into(),
        avatar_url: "https://assets.test/model/default-avatar.png".into(),
        tryon_image_url: "https://assets.test/model/default-tryon.png".into(),
        gender: "female".into(),
        age_stage: "young adult".into(),
        height_cm: 165,
        weight_kg: 50,
        body_feature: "standard".into(),
        suitable_weather: "all seasons".into(),
        shooting_style: "fashion".into(),
        mood: "happy".into(),
        style_preference: "minimalist".into(),
    }
}

pub fn test_settings() -> TryOnSettings {
    TryOnSettings {
        model: "doubao-seedream-4-0-250828".into(),
        size: "2K".into(),
        watermark: false,
        download_timeout: Duration::from_secs(5),
    }
}

/// Enabled profile with a valid avatar and empty slots.
pub fn base_profile(user_id: Uuid) -> ModelProfile {
    let mut profile = ModelProfile::new(user_id);
    profile.avatar_images = vec![AvatarImage::new("https://x/avatar.png")];
    profile.current_avatar_url = Some("https://x/avatar.png".into());
    profile
}
