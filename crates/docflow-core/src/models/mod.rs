//! Data models shared across the pipeline.

pub mod chunk;
pub mod config;
pub mod marks;
pub mod persist;
pub mod record;
pub mod target;
