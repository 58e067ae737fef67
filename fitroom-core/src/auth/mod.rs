// fitroom-core/src/auth/mod.rs

pub mod token_cache;

pub use token_cache::{AccessToken, Clock, SystemClock, TokenCache, TokenSource, WechatTokenSource};
