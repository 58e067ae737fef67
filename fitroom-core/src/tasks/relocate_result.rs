//! Background relocation of generated images into durable storage.
//!
//! Provider-hosted result URLs expire. After a submission has already been
//! answered, this task pulls the image bytes (or decodes the inline
//! payload), uploads them to the durable object store, and reconciles the
//! task row and the profile's result pointer with the durable URL.
//!
//! Best-effort by contract: every failure here is logged and swallowed,
//! the records simply keep their ephemeral URL, and no caller is ever
//! notified. Relocations for different tasks run concurrently; each one
//! only ever point-updates its own task row.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use tracing::{info, warn};
use uuid::Uuid;

use crate::http::HttpFetcher;
use crate::platforms::doubao::ImageRef;
use crate::storage::{build_cloud_path, ObjectStore};
use crate::Error;
use fitroom_common::traits::repository_traits::{ProfileRepository, TryOnTaskRepository};

pub struct RelocationJob {
    pub task_id: String,
    pub user_id: Uuid,
    pub image: ImageRef,
}

pub struct RelocationDeps {
    pub task_repo: Arc<dyn TryOnTaskRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub object_store: Arc<dyn ObjectStore>,
    pub fetcher: Arc<dyn HttpFetcher>,
    pub download_timeout: Duration,
}

/// Launches a relocation detached from the request path. The handle is
/// returned for tests; the orchestrator intentionally does not join it.
pub fn spawn_relocation(job: RelocationJob, deps: RelocationDeps) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match relocate_result(&job, &deps).await {
            Ok(url) => {
                info!("task {} result relocated to {}", job.task_id, url);
            }
            Err(e) => {
                warn!(
                    "relocation for task {} failed; records keep the ephemeral URL: {:?}",
                    job.task_id, e
                );
            }
        }
    })
}

/// One relocation attempt: obtain bytes, upload, reconcile. Errors
/// propagate to the caller (`spawn_relocation` is where they get
/// swallowed).
pub async fn relocate_result(job: &RelocationJob, deps: &RelocationDeps) -> Result<String, Error> {
    let bytes = match &job.image {
        ImageRef::Inline(b64) => BASE64_STANDARD.decode(b64.as_bytes())?,
        ImageRef::Url(url) => deps.fetcher.fetch_bytes(url, deps.download_timeout).await?,
    };

    let filename = format!("{}.png", job.task_id);
    let cloud_path = build_cloud_path("tryon-results", &filename);
    let stored = deps.object_store.put(&bytes, &cloud_path).await?;

    // Point update keyed by task id and user id, never a blind overwrite.
    let updated = deps
        .task_repo
        .update_output_url(job.user_id, &job.task_id, &stored.file_url)
        .await?;
    if !updated {
        warn!(
            "task {} not found during reconciliation; leaving profile untouched",
            job.task_id
        );
        return Ok(stored.file_url);
    }

    // The profile pointer is an accepted race: a newer submission may have
    // moved it already, and the last relocation to finish wins.
    deps.profile_repo
        .set_current_tryon_image(job.user_id, &stored.file_url)
        .await?;

    Ok(stored.file_url)
}
