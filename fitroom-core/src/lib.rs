// src/lib.rs

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod logging;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod tasks;

pub use db::Database;
pub use fitroom_common::error::Error;
pub use http::{DefaultHttpFetcher, HttpFetcher};
