//! Orchestration: per-file engine, batch loop, format map, result saving.

pub mod batch;
pub mod engine;
pub mod formats;
pub mod output;
