// fitroom-core/src/repositories/mod.rs
pub mod postgres;

pub use postgres::{
    PostgresGarmentRepository, PostgresProfileRepository, PostgresTryOnTaskRepository,
};
