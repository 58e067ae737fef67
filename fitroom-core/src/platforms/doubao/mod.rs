// File: src/platforms/doubao/mod.rs
//
// Client for the Doubao/Ark synchronous multi-image generation endpoint.
// The provider accepts a person image plus up to 14 garment images and
// returns the composed result either as a hosted URL (ephemeral, expires
// within hours) or as inline base64, depending on response_format.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DoubaoConfig;
use fitroom_common::error::ProviderErrorKind;
use crate::Error;

/// Provider hard limit on garment images per request (person image excluded).
pub const MAX_GARMENT_IMAGES: usize = 14;

/// A generated image as the provider handed it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Ephemeral provider-hosted URL.
    Url(String),
    /// Inline base64-encoded image bytes.
    Inline(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    /// Person image first, then garment images in declared slot order.
    pub image: Vec<String>,
    pub size: String,
    pub watermark: bool,
    pub response_format: String,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub image: ImageRef,
    pub model_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub request_id: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, Error>;
}

#[derive(Debug, Deserialize)]
struct WireImage {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: Option<String>,
    created: Option<i64>,
    data: Option<Vec<WireImage>>,
    request_id: Option<String>,
    error: Option<WireError>,
}

pub struct DoubaoClient {
    client: reqwest::Client,
    config: DoubaoConfig,
}

impl DoubaoClient {
    pub fn new(config: DoubaoConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn classify_status(status: reqwest::StatusCode, detail: String) -> Error {
        let kind = match status.as_u16() {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimited,
            400 => ProviderErrorKind::InvalidRequest,
            _ => ProviderErrorKind::Upstream,
        };
        Error::provider(kind, detail)
    }
}

#[async_trait]
impl GenerationProvider for DoubaoClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, Error> {
        let url = format!("{}/images/generations", self.config.api_base);
        debug!(
            "submitting generation: model={} images={}",
            request.model,
            request.image.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: WireResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                warn!("unparseable provider response ({}): {}", status, e);
                return Err(Error::provider(
                    ProviderErrorKind::Malformed,
                    format!("unparseable response (HTTP {})", status),
                ));
            }
        };

        if let Some(err) = parsed.error {
            let detail = format!(
                "{}: {}",
                err.code.unwrap_or_else(|| "unknown".to_string()),
                err.message.unwrap_or_default()
            );
            return Err(Self::classify_status(status, detail));
        }
        if !status.is_success() {
            return Err(Self::classify_status(status, format!("HTTP {}", status)));
        }

        let data = parsed.data.unwrap_or_default();
        let first = data.into_iter().next().ok_or_else(|| {
            Error::provider(ProviderErrorKind::EmptyResult, "provider returned no images")
        })?;

        let image = match (first.url, first.b64_json) {
            (Some(u), _) if !u.is_empty() => ImageRef::Url(u),
            (_, Some(b)) if !b.is_empty() => ImageRef::Inline(b),
            _ => {
                return Err(Error::provider(
                    ProviderErrorKind::Malformed,
                    "result image carried neither url nor b64_json",
                ));
            }
        };

        let created_at = parsed
            .created
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(GenerationResult {
            image,
            model_id: parsed.model,
            created_at,
            request_id: parsed.request_id,
        })
    }
}
