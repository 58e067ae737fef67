// src/repositories/postgres/mod.rs

pub mod garment;
pub mod profile;
pub mod tryon_task;

pub use garment::PostgresGarmentRepository;
pub use profile::PostgresProfileRepository;
pub use tryon_task::PostgresTryOnTaskRepository;
