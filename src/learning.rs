// File: src/learning.rs
use crate::core::{media::{self, MediaSets}, state::StateTable};
use log::debug;

/// Applies observed messages to a community's table and media sets together,
/// and retracts them again on deletion.
#[derive(Debug, Default)]
pub struct LearningEngine;

impl LearningEngine {
    pub fn new() -> Self {
        Self
    }

    /// Links are filed by extension before the text is learned; every message,
    /// link or not, feeds the transition table.
    pub fn learn(&self, table: &mut StateTable, media: &mut MediaSets, message: &str) {
        if media::looks_like_url(message) {
            if let Some(kind) = media.insert(message) {
                debug!("Filed {} link {}", kind, message);
            }
        }
        table.learn(message);
    }

    pub fn unlearn(&self, table: &mut StateTable, media: &mut MediaSets, message: &str) {
        if media::looks_like_url(message) && media.remove(message) {
            debug!("Forgot link {}", message);
        }
        table.unlearn(message);
    }
}
