// src/lib.rs

pub mod analytics;
pub mod config;
pub mod core;
pub mod error;
pub mod learning;
pub mod persistence;
pub mod registry;
pub mod responder;
pub mod validator;

pub use crate::core::chain::MarkovChain;
pub use crate::core::types::MediaKind;
pub use crate::registry::CommunityRegistry;
