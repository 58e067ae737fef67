// fitroom-core/src/tasks/mod.rs

pub mod relocate_result;
