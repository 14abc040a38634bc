// src/core/mod.rs
pub mod chain;
pub mod hieroglyph;
pub mod media;
pub mod sampler;
pub mod state;
pub mod types;
