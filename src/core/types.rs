// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A whitespace-delimited word as it appeared in a message, case preserved.
pub type Token = String;

/// Occurrence count of an edge. Signed because unlearning never prunes,
/// so a count can be driven to zero or below.
pub type EdgeCount = i64;

/// The three media categories a learned link can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Gif,
    Image,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Gif, MediaKind::Image, MediaKind::Video];

    /// Plural label used in replies, e.g. "gifs".
    pub fn plural(&self) -> &'static str {
        match self {
            MediaKind::Gif => "gifs",
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    /// The reply used when no live link of this kind is known.
    pub fn none_found(&self) -> String {
        format!("I got no valid {} in my brain", self.plural())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Gif => "gif",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        f.write_str(name)
    }
}
