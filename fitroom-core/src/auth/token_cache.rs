//! Cached short-lived API tokens.
//!
//! An explicit service instance rather than module-level mutable state:
//! the clock is injected so expiry is testable, and concurrent callers
//! hitting an expired cache share one in-flight refresh via a
//! `futures_util` shared future instead of each issuing their own.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::Error;

/// Tokens are refreshed this many seconds before their reported expiry.
const EXPIRY_SKEW_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// A token as fetched from the upstream issuer, before the cache applies
/// its expiry skew.
#[derive(Debug, Clone)]
pub struct FetchedToken {
    pub token: String,
    pub expires_in_secs: i64,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedToken, Error>;
}

struct CacheState {
    token: Option<AccessToken>,
    in_flight: Option<Shared<BoxFuture<'static, Result<FetchedToken, String>>>>,
}

pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            state: Mutex::new(CacheState {
                token: None,
                in_flight: None,
            }),
        }
    }

    /// Returns the cached token, or refreshes it. When several callers
    /// arrive with an expired cache, only one fetch goes upstream; the
    /// rest await the same shared future.
    pub async fn get(&self) -> Result<String, Error> {
        let fut = {
            let mut state = self.state.lock().await;
            if let Some(tok) = &state.token {
                if tok.expires_at > self.clock.now() {
                    return Ok(tok.token.clone());
                }
            }
            match &state.in_flight {
                Some(f) => f.clone(),
                None => {
                    debug!("token cache miss; starting refresh");
                    let source = self.source.clone();
                    let f = async move { source.fetch().await.map_err(|e| e.to_string()) }
                        .boxed()
                        .shared();
                    state.in_flight = Some(f.clone());
                    f
                }
            }
        };

        let fetched = fut.clone().await;

        let mut state = self.state.lock().await;
        // A slow waiter can resume after its refresh was replaced by a newer
        // one; it must not clear (or overwrite the token of) that newer
        // refresh. Only the refresh this caller actually awaited counts.
        let was_current = state.in_flight.as_ref().is_some_and(|f| f.ptr_eq(&fut));
        if was_current {
            state.in_flight = None;
        }
        match fetched {
            Ok(t) => {
                if was_current {
                    let skewed = (t.expires_in_secs - EXPIRY_SKEW_SECS).max(0);
                    state.token = Some(AccessToken {
                        token: t.token.clone(),
                        expires_at: self.clock.now() + ChronoDuration::seconds(skewed),
                    });
                }
                Ok(t.token)
            }
            Err(e) => Err(Error::Auth(e)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WechatTokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

/// Fetches client-credential tokens from the WeChat API.
pub struct WechatTokenSource {
    client: reqwest::Client,
    app_id: String,
    app_secret: String,
}

impl WechatTokenSource {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }
}

#[async_trait]
impl TokenSource for WechatTokenSource {
    async fn fetch(&self) -> Result<FetchedToken, Error> {
        let resp: WechatTokenResponse = self
            .client
            .get("https://api.weixin.qq.com/cgi-bin/token")
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(code) = resp.errcode {
            if code != 0 {
                return Err(Error::Auth(format!(
                    "access_token fetch failed: {} {}",
                    code,
                    resp.errmsg.unwrap_or_default()
                )));
            }
        }

        let token = resp
            .access_token
            .ok_or_else(|| Error::Auth("access_token missing from response".to_string()))?;
        Ok(FetchedToken {
            token,
            expires_in_secs: resp.expires_in.unwrap_or(7200),
        })
    }
}
