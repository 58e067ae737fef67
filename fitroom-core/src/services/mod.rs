// fitroom-core/src/services/mod.rs

pub mod profile_service;
pub mod prompt_builder;
pub mod tryon_service;

pub use profile_service::ProfileService;
pub use tryon_service::TryOnService;
