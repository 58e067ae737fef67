//! Environment-driven configuration. Loaded once at startup with
//! `dotenv` and passed by value into the components that need it.

use std::time::Duration;

use dotenv::dotenv;

use crate::Error;

/// Generation-provider settings.
#[derive(Debug, Clone)]
pub struct DoubaoConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub size: String,
    pub watermark: bool,
    pub request_timeout: Duration,
}

/// WeChat credentials used by the token cache and the durable object store.
#[derive(Debug, Clone)]
pub struct WechatConfig {
    pub app_id: String,
    pub app_secret: String,
    pub cloud_env_id: String,
}

/// Template applied when a user submits a try-on without ever having
/// created a profile. The avatar URLs point at fixed assets in the
/// durable store.
#[derive(Debug, Clone)]
pub struct ProfileTemplate {
    pub model_name: String,
    pub avatar_url: String,
    pub tryon_image_url: String,
    pub gender: String,
    pub age_stage: String,
    pub height_cm: i32,
    pub weight_kg: i32,
    pub body_feature: String,
    pub suitable_weather: String,
    pub shooting_style: String,
    pub mood: String,
    pub style_preference: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub doubao: DoubaoConfig,
    pub wechat: WechatConfig,
    pub profile_template: ProfileTemplate,
    pub download_timeout: Duration,
}

fn required(key: &str) -> Result<String, Error> {
    std::env::var(key).map_err(|_| Error::Config(format!("missing env var {}", key)))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Error> {
        dotenv().ok();

        let request_timeout_secs: u64 = optional("DOUBAO_TIMEOUT_SECS", "60")
            .parse()
            .map_err(|_| Error::Config("DOUBAO_TIMEOUT_SECS must be an integer".into()))?;
        let download_timeout_secs: u64 = optional("RESULT_DOWNLOAD_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|_| Error::Config("RESULT_DOWNLOAD_TIMEOUT_SECS must be an integer".into()))?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            doubao: DoubaoConfig {
                api_base: optional("DOUBAO_API_BASE", "https://ark.cn-beijing.volces.com/api/v3"),
                api_key: required("DOUBAO_API_KEY")?,
                model: optional("DOUBAO_MODEL", "doubao-seedream-4-0-250828"),
                size: optional("DOUBAO_IMAGE_SIZE", "2K"),
                watermark: optional("DOUBAO_WATERMARK", "false") == "true",
                request_timeout: Duration::from_secs(request_timeout_secs),
            },
            wechat: WechatConfig {
                app_id: required("WECHAT_APP_ID")?,
                app_secret: required("WECHAT_APP_SECRET")?,
                cloud_env_id: required("WECHAT_CLOUD_ENV_ID")?,
            },
            profile_template: ProfileTemplate::from_env(),
            download_timeout: Duration::from_secs(download_timeout_secs),
        })
    }
}

impl ProfileTemplate {
    fn from_env() -> Self {
        Self {
            model_name: optional("DEFAULT_MODEL_NAME", "My model"),
            avatar_url: optional(
                "DEFAULT_MODEL_AVATAR_URL",
                "https://assets.fitroom.example/model/personavatar2.png",
            ),
            tryon_image_url: optional(
                "DEFAULT_MODEL_TRYON_URL",
                "https://assets.fitroom.example/model/person2.png",
            ),
            gender: "female".to_string(),
            age_stage: "young adult".to_string(),
            height_cm: 165,
            weight_kg: 50,
            body_feature: "standard".to_string(),
            suitable_weather: "all seasons".to_string(),
            shooting_style: "fashion".to_string(),
            mood: "happy".to_string(),
            style_preference: "minimalist".to_string(),
        }
    }
}
