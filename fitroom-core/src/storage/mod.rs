// fitroom-core/src/storage/mod.rs
//
// Durable object storage for generated images. The provider's hosting is
// ephemeral; anything we want to keep gets re-uploaded here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::TokenCache;
use crate::Error;

/// A successfully stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub file_id: String,
    pub cloud_path: String,
    pub file_url: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bytes: &[u8], cloud_path: &str) -> Result<StoredObject, Error>;
}

/// Date-partitioned, collision-resistant path:
/// `category/yyyy/mm/dd/{millis}-{random}-{filename}`.
pub fn build_cloud_path(category: &str, filename: &str) -> String {
    let now = Utc::now();
    let millis = now.timestamp_millis();
    let random: u32 = rand::rng().random_range(0..1_000_000_000);
    format!(
        "{}/{}/{:02}/{:02}/{}-{}-{}",
        category,
        now.year(),
        now.month(),
        now.day(),
        millis,
        random,
        filename
    )
}

#[derive(Debug, Deserialize)]
struct UploadTicket {
    errcode: i64,
    errmsg: Option<String>,
    url: Option<String>,
    token: Option<String>,
    authorization: Option<String>,
    file_id: Option<String>,
}

/// Uploads into the WeChat cloud environment's object storage: fetch an
/// upload ticket (authenticated through the token cache), then POST the
/// bytes as a multipart form to the ticket's COS endpoint.
pub struct WechatCloudStorage {
    client: reqwest::Client,
    env_id: String,
    token_cache: Arc<TokenCache>,
}

impl WechatCloudStorage {
    pub fn new(env_id: impl Into<String>, token_cache: Arc<TokenCache>) -> Self {
        Self {
            client: reqwest::Client::new(),
            env_id: env_id.into(),
            token_cache,
        }
    }

    async fn fetch_upload_ticket(&self, cloud_path: &str) -> Result<UploadTicket, Error> {
        let access_token = self.token_cache.get().await?;
        let ticket: UploadTicket = self
            .client
            .post(format!(
                "https://api.weixin.qq.com/tcb/uploadfile?access_token={}",
                access_token
            ))
            .json(&json!({
                "env": self.env_id,
                "path": cloud_path,
            }))
            .send()
            .await?
            .json()
            .await?;

        if ticket.errcode != 0 {
            return Err(Error::Storage(format!(
                "upload ticket refused: {} {}",
                ticket.errcode,
                ticket.errmsg.as_deref().unwrap_or("")
            )));
        }
        Ok(ticket)
    }
}

#[async_trait]
impl ObjectStore for WechatCloudStorage {
    async fn put(&self, bytes: &[u8], cloud_path: &str) -> Result<StoredObject, Error> {
        let ticket = self.fetch_upload_ticket(cloud_path).await?;

        let upload_url = ticket
            .url
            .ok_or_else(|| Error::Storage("upload ticket missing url".to_string()))?;
        let file_id = ticket
            .file_id
            .ok_or_else(|| Error::Storage("upload ticket missing file_id".to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("key", cloud_path.to_string())
            .text("Signature", ticket.authorization.unwrap_or_default())
            .text("x-cos-security-token", ticket.token.unwrap_or_default())
            .text("x-cos-meta-fileid", file_id.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes.to_vec()).file_name("file"),
            );

        let response = self.client.post(&upload_url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "object upload failed: HTTP {}",
                response.status()
            )));
        }

        debug!("stored {} bytes at {}", bytes.len(), cloud_path);
        // The WeChat file_id doubles as a fetchable URL.
        Ok(StoredObject {
            file_url: file_id.clone(),
            file_id,
            cloud_path: cloud_path.to_string(),
        })
    }
}
