// File: src/analytics.rs
use crate::core::chain::MarkovChain;
use crate::core::state::StateTable;
use crate::core::types::{EdgeCount, MediaKind};
use serde::{Deserialize, Serialize};

/// Weight applied to vocabulary plus frequent edges.
const COMPLEXITY_FACTOR: f64 = 0.3;

/// A relative, unitless measure of how much the table has learned.
pub fn complexity_score(table: &StateTable, threshold: EdgeCount) -> f64 {
    let breadth = table.vocabulary_size() + table.edges_above_threshold(threshold);
    COMPLEXITY_FACTOR * breadth as f64
}

/// Read-only summary of one community's model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAnalytics {
    pub complexity_score: f64,
    pub words: usize,
    pub gifs: usize,
    pub images: usize,
    pub videos: usize,
    pub reply_rate: u32,
}

pub fn snapshot(chain: &MarkovChain, threshold: EdgeCount) -> ChainAnalytics {
    let media = chain.media();
    ChainAnalytics {
        complexity_score: complexity_score(chain.state(), threshold),
        words: chain.state().vocabulary_size(),
        gifs: media.len(MediaKind::Gif),
        images: media.len(MediaKind::Image),
        videos: media.len(MediaKind::Video),
        reply_rate: chain.reply_rate,
    }
}
