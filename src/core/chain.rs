use crate::analytics::{self, ChainAnalytics};
use crate::core::hieroglyph::{Hieroglyphs, Stylizer};
use crate::core::media::MediaSets;
use crate::core::state::StateTable;
use crate::core::types::{EdgeCount, MediaKind};
use crate::learning::LearningEngine;
use crate::persistence::MessageStore;
use crate::validator::{get_valid_random, MediaValidator};
use log::warn;
use rand::Rng;
use std::sync::Arc;

pub const DEFAULT_REPLY_RATE: u32 = 10;
const DEFAULT_STYLE_ODDS: u32 = 200;

// One community's model: the transition table, its media links and the
// externally managed reply rate. Callers serialize access per community.
pub struct MarkovChain {
    community_id: String,
    state: StateTable,
    media: MediaSets,
    pub reply_rate: u32,
    learning_engine: LearningEngine,
    stylizer: Option<Arc<dyn Stylizer>>,
    style_odds: u32,
}

impl MarkovChain {
    pub fn new(community_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            state: StateTable::new(),
            media: MediaSets::new(),
            reply_rate: DEFAULT_REPLY_RATE,
            learning_engine: LearningEngine::new(),
            stylizer: Some(Arc::new(Hieroglyphs::new())),
            style_odds: DEFAULT_STYLE_ODDS,
        }
    }

    /// Swaps the cosmetic transform `talk` applies with probability 1/odds.
    /// `None` or odds of 0 turn it off.
    pub fn with_stylizer(mut self, stylizer: Option<Arc<dyn Stylizer>>, odds: u32) -> Self {
        self.stylizer = stylizer;
        self.style_odds = odds;
        self
    }

    pub fn community_id(&self) -> &str {
        &self.community_id
    }

    pub fn state(&self) -> &StateTable {
        &self.state
    }

    pub fn media(&self) -> &MediaSets {
        &self.media
    }

    /// Bulk-loads previously stored messages, in order.
    pub fn provide_data<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for message in messages {
            self.update_state(message.as_ref());
        }
    }

    pub fn update_state(&mut self, message: &str) {
        self.learning_engine
            .learn(&mut self.state, &mut self.media, message);
    }

    /// Retracts a message from the table and media sets only.
    pub fn forget(&mut self, message: &str) {
        self.learning_engine
            .unlearn(&mut self.state, &mut self.media, message);
    }

    /// Forgets a message in memory, then asks the store to drop its copies.
    ///
    /// The in-memory retraction happens whatever the store reports; the
    /// return value is the store's answer alone.
    pub fn delete(&mut self, message: &str, store: &dyn MessageStore) -> bool {
        self.forget(message);

        match store.delete_occurrences(message, &self.community_id) {
            Ok(found) => found,
            Err(e) => {
                warn!("Could not delete stored message for {}: {}", self.community_id, e);
                false
            }
        }
    }

    pub fn generate_text(&self, seed: &str, max_length: usize) -> String {
        self.state
            .generate_text(seed, max_length, &mut rand::thread_rng())
    }

    /// Free-form text from a random seed. `None` when nothing was learned yet.
    pub fn talk(&self, max_length: usize) -> Option<String> {
        self.talk_with_rng(max_length, &mut rand::thread_rng())
    }

    pub fn talk_with_rng<R: Rng + ?Sized>(&self, max_length: usize, rng: &mut R) -> Option<String> {
        let seed = self.state.random_seed(rng)?;
        let sentence = clean(&self.state.generate_text(seed, max_length, rng));

        let roll_hit = self.style_odds > 0 && rng.gen_range(1..=self.style_odds) == self.style_odds;
        match &self.stylizer {
            Some(stylizer) if roll_hit => Some(stylizer.apply(&sentence)),
            _ => Some(sentence),
        }
    }

    /// Continues `seed_phrase` from its last word: the phrase comes back with
    /// that word replaced by up to `max_length + 1` generated tokens.
    pub fn generate_from(&self, seed_phrase: &str, max_length: usize) -> Option<String> {
        self.generate_from_with_rng(seed_phrase, max_length, &mut rand::thread_rng())
    }

    pub fn generate_from_with_rng<R: Rng + ?Sized>(
        &self,
        seed_phrase: &str,
        max_length: usize,
        rng: &mut R,
    ) -> Option<String> {
        if self.state.is_empty() {
            return None;
        }
        let phrase = seed_phrase.trim_end();
        let seed = phrase.split_whitespace().last()?;
        let head = &phrase[..phrase.len() - seed.len()];
        Some(format!("{}{}", head, self.state.generate_text(seed, max_length, rng)))
    }

    /// A live link of the requested kind, or that kind's "none found" reply.
    pub async fn get_media(&self, kind: MediaKind, validator: &dyn MediaValidator) -> String {
        get_valid_random(validator, self.media.candidates(kind), kind).await
    }

    pub fn analytics(&self, threshold: EdgeCount) -> ChainAnalytics {
        analytics::snapshot(self, threshold)
    }
}

/// Drops literal `\n` escapes and surrounding whitespace.
fn clean(text: &str) -> String {
    text.replace("\\n", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hieroglyph::back_to_alphabet;
    use crate::error::StoreError;
    use crate::validator::testing::ScriptedValidator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A store that refuses every deletion.
    struct RefusingStore;

    impl MessageStore for RefusingStore {
        fn append_message(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn load_all(&self, _: &str) -> Result<Option<Vec<String>>, StoreError> {
            Ok(None)
        }
        fn delete_occurrences(&self, _: &str, community: &str) -> Result<bool, StoreError> {
            Err(StoreError::InvalidCommunityId(community.to_string()))
        }
        fn delete_community(&self, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn has_data(&self, _: &str) -> bool {
            false
        }
        fn reply_rate(&self, _: &str) -> Result<Option<u32>, StoreError> {
            Ok(None)
        }
        fn save_reply_rate(&self, _: u32, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn plain(id: &str) -> MarkovChain {
        MarkovChain::new(id).with_stylizer(None, 0)
    }

    #[test]
    fn test_talk_on_empty_model() {
        assert!(plain("g").talk(10).is_none());
        assert!(plain("g").generate_from("hello there", 10).is_none());
    }

    #[test]
    fn test_talk_strips_escapes() {
        let mut chain = plain("g");
        chain.update_state("hi\\n there\\n");
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let text = chain.talk_with_rng(5, &mut rng).unwrap();
            assert!(!text.contains("\\n"));
            assert!(text == "hi there" || text == "there");
        }
    }

    #[test]
    fn test_talk_always_styled_at_odds_one() {
        let mut chain = MarkovChain::new("g").with_stylizer(Some(Arc::new(Hieroglyphs)), 1);
        chain.update_state("hello world");
        let mut rng = StdRng::seed_from_u64(4);
        let text = chain.talk_with_rng(3, &mut rng).unwrap();
        assert!(!text.chars().any(|c| c.is_ascii_alphabetic()));
        let restored = back_to_alphabet(&text);
        assert!(restored == "hello world" || restored == "world");
    }

    #[test]
    fn test_generate_from_replaces_last_word() {
        let mut chain = plain("g");
        chain.provide_data(["the cat sat", "the cat ran", "the dog sat"]);
        let mut rng = StdRng::seed_from_u64(12);

        let text = chain.generate_from_with_rng("what about the", 1, &mut rng).unwrap();
        assert!(text == "what about the cat" || text == "what about the dog", "{text}");

        // The seed occurring earlier in the phrase is left alone.
        let text = chain.generate_from_with_rng("cat and cat", 1, &mut rng).unwrap();
        assert!(text == "cat and cat sat" || text == "cat and cat ran", "{text}");

        // Unknown last word: phrase comes back unchanged.
        let text = chain.generate_from_with_rng("hello zebra", 4, &mut rng).unwrap();
        assert_eq!(text, "hello zebra");

        assert!(chain.generate_from_with_rng("   ", 4, &mut rng).is_none());
    }

    #[test]
    fn test_delete_mutates_even_when_store_fails() {
        let mut chain = plain("g");
        chain.provide_data(["the cat sat", "https://a.com/x.gif"]);
        assert!(!chain.delete("the cat sat", &RefusingStore));
        assert!(!chain.delete("https://a.com/x.gif", &RefusingStore));
        assert_eq!(chain.state().count("the", "cat"), Some(0));
        assert_eq!(chain.media().len(MediaKind::Gif), 0);
    }

    #[tokio::test]
    async fn test_get_media_leaves_set_untouched() {
        let mut chain = plain("g");
        chain.update_state("https://a.com/1.gif");
        let validator = ScriptedValidator::default();

        let reply = chain.get_media(MediaKind::Gif, &validator).await;
        assert_eq!(reply, "I got no valid gifs in my brain");
        assert!(chain.media().get(MediaKind::Gif).contains("https://a.com/1.gif"));
    }
}
