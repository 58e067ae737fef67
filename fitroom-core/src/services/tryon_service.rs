//! Try-on submission orchestration.
//!
//! Turns "user requests a try-on" into a persisted task plus a mutated
//! profile. The caller gets the provider's ephemeral result immediately;
//! making it durable happens in a detached background relocation whose
//! outcome never reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::{AppConfig, ProfileTemplate};
use crate::http::HttpFetcher;
use crate::platforms::doubao::{
    GenerationProvider, GenerationRequest, ImageRef, MAX_GARMENT_IMAGES,
};
use crate::services::profile_service::ProfileService;
use crate::services::prompt_builder::build_tryon_prompt;
use crate::storage::ObjectStore;
use crate::tasks::relocate_result::{spawn_relocation, RelocationDeps, RelocationJob};
use crate::Error;
use fitroom_common::models::profile::{GarmentSlot, SlotEntry};
use fitroom_common::models::tryon::{
    ConsumedGarment, GarmentSnapshotEntry, TaskStatus, TryOnOutcome, TryOnTask,
};
use fitroom_common::traits::repository_traits::{
    GarmentRepository, ProfileRepository, TryOnTaskRepository,
};

/// Generation parameters the orchestrator stamps onto every request.
#[derive(Debug, Clone)]
pub struct TryOnSettings {
    pub model: String,
    pub size: String,
    pub watermark: bool,
    pub download_timeout: Duration,
}

impl From<&AppConfig> for TryOnSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            model: cfg.doubao.model.clone(),
            size: cfg.doubao.size.clone(),
            watermark: cfg.doubao.watermark,
            download_timeout: cfg.download_timeout,
        }
    }
}

pub struct TryOnService {
    profile_repo: Arc<dyn ProfileRepository>,
    task_repo: Arc<dyn TryOnTaskRepository>,
    garment_repo: Arc<dyn GarmentRepository>,
    provider: Arc<dyn GenerationProvider>,
    object_store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn HttpFetcher>,
    profiles: ProfileService,
    settings: TryOnSettings,
}

impl TryOnService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        task_repo: Arc<dyn TryOnTaskRepository>,
        garment_repo: Arc<dyn GarmentRepository>,
        provider: Arc<dyn GenerationProvider>,
        object_store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn HttpFetcher>,
        template: ProfileTemplate,
        settings: TryOnSettings,
    ) -> Self {
        let profiles = ProfileService::new(profile_repo.clone(), template);
        Self {
            profile_repo,
            task_repo,
            garment_repo,
            provider,
            object_store,
            fetcher,
            profiles,
            settings,
        }
    }

    /// Submits a try-on for the user's current profile state. All inputs
    /// are derived server-side; there is no request body.
    ///
    /// Sequencing is strict: validation, generation call, task write,
    /// profile mutation (result pointer, then slot clear), relocator
    /// spawn. Any failure up to and including the generation call aborts
    /// with nothing persisted.
    pub async fn submit_try_on(&self, user_id: Uuid) -> Result<TryOnOutcome, Error> {
        // Precondition 1: an enabled profile, auto-provisioned when absent.
        let profile = self.profiles.get_or_create_profile(user_id).await?;
        if !profile.enabled {
            return Err(Error::Validation(
                "the model profile is disabled".to_string(),
            ));
        }

        // Precondition 2: usable avatar URL.
        let person_image_url = match profile.current_avatar_url.as_deref() {
            Some(u) if is_valid_http_url(u) => u.to_string(),
            Some(u) => {
                return Err(Error::Validation(format!(
                    "current avatar URL is not a valid http(s) URL: {}",
                    u
                )));
            }
            None => {
                return Err(Error::Validation(
                    "the profile has no current avatar URL".to_string(),
                ));
            }
        };

        // Preconditions 3 and 4: 1..=14 garments with valid URLs.
        let candidates: Vec<(GarmentSlot, SlotEntry)> = profile
            .slots
            .populated()
            .into_iter()
            .map(|(slot, entry)| (slot, entry.clone()))
            .collect();
        let valid = validate_garment_candidates(candidates)?;

        // Opportunistic catalog resolution; any failure means "no QR code".
        let mut garments = Vec::with_capacity(valid.len());
        for (slot, entry) in &valid {
            let garment_url = entry.url.clone().unwrap_or_default();
            let shop_contact_qr_url = match entry.garment_id.as_deref() {
                Some(id) => self.resolve_shop_qr(id).await,
                None => None,
            };
            garments.push(GarmentSnapshotEntry {
                slot: *slot,
                garment_id: entry.garment_id.clone(),
                garment_url,
                slot_type: slot.label().to_string(),
                shop_contact_qr_url,
            });
        }

        let prompt = build_tryon_prompt(&profile, &garments);

        // Person image first, then garments in declared slot order.
        let mut image = Vec::with_capacity(garments.len() + 1);
        image.push(person_image_url.clone());
        image.extend(garments.iter().map(|g| g.garment_url.clone()));

        let request = GenerationRequest {
            model: self.settings.model.clone(),
            prompt: prompt.clone(),
            image,
            size: self.settings.size.clone(),
            watermark: self.settings.watermark,
            response_format: "url".to_string(),
        };

        // Fatal on any provider failure; nothing has been persisted yet.
        let result = self.provider.generate(&request).await?;

        let ephemeral_url = match &result.image {
            ImageRef::Url(u) => u.clone(),
            ImageRef::Inline(b64) => format!("data:image/png;base64,{}", b64),
        };

        let now = Utc::now();
        let task = TryOnTask {
            task_id: TryOnTask::generate_task_id(result.created_at),
            user_id,
            person_image_url,
            garments: garments.clone(),
            status: TaskStatus::Succeeded,
            output_image_url: Some(ephemeral_url.clone()),
            model_id: result.model_id.clone(),
            prompt: Some(prompt),
            request_id: result.request_id.clone(),
            submit_time: now,
            end_time: Some(now),
            error_code: None,
            error_message: None,
            created_at: now,
        };
        self.task_repo.insert(&task).await?;

        // Task row exists; a crash past this point leaves garments merely
        // stale, never lost. Result pointer first, then the slot clear.
        self.profile_repo
            .set_current_tryon_image(user_id, &ephemeral_url)
            .await?;
        self.profile_repo.clear_garment_slots(user_id).await?;

        info!(
            "try-on task {} created for user {} ({} garments)",
            task.task_id,
            user_id,
            garments.len()
        );

        // Detached on purpose: the response below never waits on this and
        // never observes its failure.
        let _handle = spawn_relocation(
            RelocationJob {
                task_id: task.task_id.clone(),
                user_id,
                image: result.image.clone(),
            },
            RelocationDeps {
                task_repo: self.task_repo.clone(),
                profile_repo: self.profile_repo.clone(),
                object_store: self.object_store.clone(),
                fetcher: self.fetcher.clone(),
                download_timeout: self.settings.download_timeout,
            },
        );

        Ok(TryOnOutcome {
            task_id: task.task_id,
            status: TaskStatus::Succeeded,
            image_url: ephemeral_url,
            consumed_garments: garments
                .iter()
                .map(|g| ConsumedGarment {
                    slot: g.slot,
                    garment_url: g.garment_url.clone(),
                    garment_id: g.garment_id.clone(),
                })
                .collect(),
            model_id: result.model_id,
            created_at: result.created_at,
        })
    }

    async fn resolve_shop_qr(&self, garment_id: &str) -> Option<String> {
        match self.garment_repo.find_by_id(garment_id).await {
            Ok(Some(garment)) => garment.shop_qr_image_url,
            Ok(None) => {
                debug!("garment {} not found in catalog; no QR code", garment_id);
                None
            }
            Err(e) => {
                warn!("catalog lookup for garment {} failed: {:?}", garment_id, e);
                None
            }
        }
    }
}

/// Drops candidates whose URL fails validation (with a warning), then
/// enforces the 1..=14 bounds. The count check runs before any provider
/// call ever happens.
fn validate_garment_candidates(
    candidates: Vec<(GarmentSlot, SlotEntry)>,
) -> Result<Vec<(GarmentSlot, SlotEntry)>, Error> {
    let mut valid = Vec::with_capacity(candidates.len());
    for (slot, entry) in candidates {
        match entry.url.as_deref() {
            Some(u) if is_valid_http_url(u) => valid.push((slot, entry)),
            Some(u) => {
                warn!("dropping {} slot: invalid garment URL {}", slot.as_str(), u);
            }
            None => {
                warn!("dropping {} slot: no garment URL", slot.as_str());
            }
        }
    }

    if valid.is_empty() {
        return Err(Error::Validation(
            "at least one garment slot with a valid URL is required".to_string(),
        ));
    }
    if valid.len() > MAX_GARMENT_IMAGES {
        return Err(Error::Validation(format!(
            "too many garments: {} exceeds the provider limit of {}",
            valid.len(),
            MAX_GARMENT_IMAGES
        )));
    }
    Ok(valid)
}

/// Absolute http(s) URL with a host.
fn is_valid_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}
