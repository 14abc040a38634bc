// File: src/core/media.rs
use crate::core::types::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Only strings starting with this are ever treated as links.
pub const URL_PREFIX: &str = "https:";

const EXTENSIONS: [(&str, MediaKind); 7] = [
    (".gif", MediaKind::Gif),
    (".png", MediaKind::Image),
    (".jpg", MediaKind::Image),
    (".jpeg", MediaKind::Image),
    (".webp", MediaKind::Image),
    (".mp4", MediaKind::Video),
    (".mov", MediaKind::Video),
];

pub fn looks_like_url(message: &str) -> bool {
    message.starts_with(URL_PREFIX)
}

/// Classifies a link by its literal, case-sensitive trailing extension.
pub fn classify(url: &str) -> Option<MediaKind> {
    if !looks_like_url(url) {
        return None;
    }
    EXTENSIONS
        .iter()
        .find(|(ext, _)| url.ends_with(ext))
        .map(|&(_, kind)| kind)
}

/// Links learned for one community, split by category.
/// A link lands in exactly one set, chosen by `classify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaSets {
    gifs: HashSet<String>,
    images: HashSet<String>,
    videos: HashSet<String>,
}

impl MediaSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MediaKind) -> &HashSet<String> {
        match kind {
            MediaKind::Gif => &self.gifs,
            MediaKind::Image => &self.images,
            MediaKind::Video => &self.videos,
        }
    }

    fn get_mut(&mut self, kind: MediaKind) -> &mut HashSet<String> {
        match kind {
            MediaKind::Gif => &mut self.gifs,
            MediaKind::Image => &mut self.images,
            MediaKind::Video => &mut self.videos,
        }
    }

    /// Stores the link if it classifies. Returns the category it went to.
    pub fn insert(&mut self, url: &str) -> Option<MediaKind> {
        let kind = classify(url)?;
        self.get_mut(kind).insert(url.to_string());
        Some(kind)
    }

    /// Removes the link from its category. Returns true if it was present.
    pub fn remove(&mut self, url: &str) -> bool {
        match classify(url) {
            Some(kind) => self.get_mut(kind).remove(url),
            None => false,
        }
    }

    pub fn len(&self, kind: MediaKind) -> usize {
        self.get(kind).len()
    }

    /// Owned copy of one category, for validating outside the model lock.
    pub fn candidates(&self, kind: MediaKind) -> Vec<String> {
        self.get(kind).iter().cloned().collect()
    }
}
