// fitroom-core/src/platforms/mod.rs

pub mod doubao;

pub use doubao::{DoubaoClient, GenerationProvider, GenerationRequest, GenerationResult, ImageRef};
