//! Profile and avatar-gallery management.
//!
//! The profile is long-lived: catalog-browsing flows stage garments into
//! its slots, upload flows append to its avatar gallery, and the try-on
//! orchestrator consumes and clears the slots.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::config::ProfileTemplate;
use crate::Error;
use fitroom_common::models::profile::{AvatarImage, ModelProfile};
use fitroom_common::traits::repository_traits::ProfileRepository;

pub struct ProfileService {
    profile_repo: Arc<dyn ProfileRepository>,
    template: ProfileTemplate,
}

impl ProfileService {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>, template: ProfileTemplate) -> Self {
        Self {
            profile_repo,
            template,
        }
    }

    /// Builds a fresh profile from the default template.
    pub fn default_profile(template: &ProfileTemplate, user_id: Uuid) -> ModelProfile {
        let mut profile = ModelProfile::new(user_id);
        profile.model_name = template.model_name.clone();
        profile.avatar_images = vec![AvatarImage::new(template.avatar_url.clone())];
        profile.current_avatar_url = Some(template.avatar_url.clone());
        profile.current_tryon_image_url = Some(template.tryon_image_url.clone());
        profile.gender = Some(template.gender.clone());
        profile.age_stage = Some(template.age_stage.clone());
        profile.height_cm = Some(template.height_cm);
        profile.weight_kg = Some(template.weight_kg);
        profile.body_feature = Some(template.body_feature.clone());
        profile.suitable_weather = Some(template.suitable_weather.clone());
        profile.shooting_style = Some(template.shooting_style.clone());
        profile.mood = Some(template.mood.clone());
        profile.style_preference = Some(template.style_preference.clone());
        profile
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<ModelProfile>, Error> {
        self.profile_repo.get_by_user(user_id).await
    }

    /// Fetches the user's profile, creating one from the template on first
    /// use. The recovery path the orchestrator relies on.
    pub async fn get_or_create_profile(&self, user_id: Uuid) -> Result<ModelProfile, Error> {
        if let Some(profile) = self.profile_repo.get_by_user(user_id).await? {
            return Ok(profile);
        }

        info!("no profile for user {}; provisioning default", user_id);
        let profile = Self::default_profile(&self.template, user_id);
        self.profile_repo
            .create(&profile)
            .await
            .map_err(|e| Error::Provisioning(format!("cannot auto-provision profile: {}", e)))?;
        Ok(profile)
    }

    /// Appends an uploaded avatar to the gallery, making it current when no
    /// current avatar is set yet.
    pub async fn add_avatar(&self, user_id: Uuid, url: &str) -> Result<AvatarImage, Error> {
        if url.trim().is_empty() {
            return Err(Error::Validation("avatar URL must not be empty".to_string()));
        }

        let mut profile = self.get_or_create_profile(user_id).await?;
        let avatar = AvatarImage::new(url);
        profile.avatar_images.push(avatar.clone());
        self.profile_repo
            .save_avatar_gallery(user_id, &profile.avatar_images)
            .await?;

        if profile.current_avatar_url.as_deref().unwrap_or("").is_empty() {
            self.profile_repo.set_current_avatar(user_id, url).await?;
        }
        Ok(avatar)
    }

    /// Gallery listing, back-filling ids missing on legacy entries and
    /// persisting the repaired gallery when anything changed.
    pub async fn list_avatars(&self, user_id: Uuid) -> Result<Vec<AvatarImage>, Error> {
        let mut profile = self
            .profile_repo
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no profile for user {}", user_id)))?;

        let mut backfilled = false;
        for img in &mut profile.avatar_images {
            if img.avatar_id.is_none() {
                img.avatar_id = Some(AvatarImage::generate_id());
                backfilled = true;
            }
        }
        if backfilled {
            self.profile_repo
                .save_avatar_gallery(user_id, &profile.avatar_images)
                .await?;
        }
        Ok(profile.avatar_images)
    }

    /// The current avatar must point at a gallery entry; this is where that
    /// invariant is checked.
    pub async fn set_current_avatar(&self, user_id: Uuid, url: &str) -> Result<(), Error> {
        let profile = self
            .profile_repo
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no profile for user {}", user_id)))?;

        if !profile.has_avatar_url(url) {
            return Err(Error::Validation(
                "avatar URL is not in the profile's gallery".to_string(),
            ));
        }
        self.profile_repo.set_current_avatar(user_id, url).await
    }

    /// Removes a gallery entry by id. The current avatar and the last
    /// remaining image are protected.
    pub async fn delete_avatar(&self, user_id: Uuid, avatar_id: &str) -> Result<(), Error> {
        let mut profile = self
            .profile_repo
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no profile for user {}", user_id)))?;

        let Some(target) = profile
            .avatar_images
            .iter()
            .find(|img| img.avatar_id.as_deref() == Some(avatar_id))
            .cloned()
        else {
            return Err(Error::NotFound(format!("no avatar with id {}", avatar_id)));
        };

        if profile.current_avatar_url.as_deref() == Some(target.url.as_str()) {
            return Err(Error::Validation(
                "cannot delete the avatar currently in use; switch avatars first".to_string(),
            ));
        }
        if profile.avatar_images.len() <= 1 {
            return Err(Error::Validation(
                "at least one avatar image must remain".to_string(),
            ));
        }

        profile
            .avatar_images
            .retain(|img| img.avatar_id.as_deref() != Some(avatar_id));
        self.profile_repo
            .save_avatar_gallery(user_id, &profile.avatar_images)
            .await
    }

    pub async fn set_current_tryon_image(&self, user_id: Uuid, url: &str) -> Result<(), Error> {
        if url.trim().is_empty() {
            return Err(Error::Validation(
                "try-on image URL must not be empty".to_string(),
            ));
        }
        self.profile_repo
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no profile for user {}", user_id)))?;
        self.profile_repo.set_current_tryon_image(user_id, url).await
    }

    /// Attribute merge: only the caller-supplied fields change, the gallery
    /// and slots are untouched.
    pub async fn update_attributes(
        &self,
        user_id: Uuid,
        update: ProfileAttributeUpdate,
    ) -> Result<ModelProfile, Error> {
        let mut profile = self
            .profile_repo
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no profile for user {}", user_id)))?;

        if let Some(name) = update.model_name {
            profile.model_name = name;
        }
        if let Some(v) = update.gender {
            profile.gender = Some(v);
        }
        if let Some(v) = update.age_stage {
            profile.age_stage = Some(v);
        }
        if let Some(v) = update.height_cm {
            profile.height_cm = Some(v);
        }
        if let Some(v) = update.weight_kg {
            profile.weight_kg = Some(v);
        }
        if let Some(v) = update.body_feature {
            profile.body_feature = Some(v);
        }
        if let Some(v) = update.suitable_weather {
            profile.suitable_weather = Some(v);
        }
        if let Some(v) = update.shooting_style {
            profile.shooting_style = Some(v);
        }
        if let Some(v) = update.mood {
            profile.mood = Some(v);
        }
        if let Some(v) = update.style_preference {
            profile.style_preference = Some(v);
        }
        if let Some(v) = update.description {
            profile.description = v;
        }

        self.profile_repo.update(&profile).await?;
        Ok(profile)
    }
}

/// Caller-supplied partial attribute update; `None` means "leave as is".
#[derive(Debug, Default, Clone)]
pub struct ProfileAttributeUpdate {
    pub model_name: Option<String>,
    pub gender: Option<String>,
    pub age_stage: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub body_feature: Option<String>,
    pub suitable_weather: Option<String>,
    pub shooting_style: Option<String>,
    pub mood: Option<String>,
    pub style_preference: Option<String>,
    pub description: Option<String>,
}
