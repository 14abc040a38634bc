// File: src/core/state.rs
use crate::core::sampler::weighted_choice;
use crate::core::types::{EdgeCount, Token};
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Splits a message into tokens on single spaces, dropping the empty
/// strings that runs of spaces would otherwise produce.
pub fn tokenize(message: &str) -> Vec<&str> {
    message.split(' ').filter(|t| !t.is_empty()).collect()
}

/// First-order word transition counts.
///
/// Maps token -> (successor token -> occurrence count). A token becomes a key
/// the first time an edge is recorded from it and is never removed again, even
/// if every one of its edges is unlearned down to zero.
///
/// Both levels iterate in first-seen order, which fixes the option order the
/// sampler sees: identical training plus an identically seeded rng gives
/// identical output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateTable {
    transitions: IndexMap<Token, IndexMap<Token, EdgeCount>>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every adjacent pair of the message. O(n) in token count.
    pub fn learn(&mut self, message: &str) {
        for pair in tokenize(message).windows(2) {
            *self
                .transitions
                .entry(pair[0].to_string())
                .or_default()
                .entry(pair[1].to_string())
                .or_insert(0) += 1;
        }
    }

    /// Decrements every adjacent pair of the message that is already known.
    /// Unknown pairs are skipped. Nothing is pruned at zero.
    pub fn unlearn(&mut self, message: &str) {
        for pair in tokenize(message).windows(2) {
            if let Some(count) = self
                .transitions
                .get_mut(pair[0])
                .and_then(|next| next.get_mut(pair[1]))
            {
                *count -= 1;
            }
        }
    }

    /// Walks the table from `seed` for at most `max_length` steps.
    ///
    /// The output always starts with the seed and stops early at a token with
    /// no positively weighted successor.
    pub fn generate_text<R: Rng + ?Sized>(&self, seed: &str, max_length: usize, rng: &mut R) -> String {
        let mut generated = seed.to_string();
        let mut current = seed;

        for _ in 0..max_length {
            let Some(next_words) = self.transitions.get(current) else {
                break;
            };

            let (options, weights): (Vec<&str>, Vec<f64>) = next_words
                .iter()
                .filter(|&(_, &count)| count > 0)
                .map(|(word, &count)| (word.as_str(), count as f64))
                .unzip();

            let Some(&next) = weighted_choice(&options, &weights, rng) else {
                break;
            };

            generated.push(' ');
            generated.push_str(next);
            current = next;
        }

        generated
    }

    /// A uniformly random known token, or `None` on an empty table.
    pub fn random_seed<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.transitions.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.transitions.len());
        self.transitions.get_index(idx).map(|(token, _)| token.as_str())
    }

    /// Count of an edge, if it was ever recorded.
    pub fn count(&self, from: &str, to: &str) -> Option<EdgeCount> {
        self.transitions.get(from)?.get(to).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.transitions.contains_key(token)
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Distinct tokens that have at least one recorded edge.
    pub fn vocabulary_size(&self) -> usize {
        self.transitions.len()
    }

    fn edges(&self) -> impl Iterator<Item = (&str, EdgeCount)> + '_ {
        self.transitions
            .values()
            .flat_map(|next| next.iter().map(|(word, &count)| (word.as_str(), count)))
    }

    pub fn edge_count(&self) -> usize {
        self.transitions.values().map(IndexMap::len).sum()
    }

    pub fn edges_above_threshold(&self, threshold: EdgeCount) -> usize {
        self.edges().filter(|&(_, count)| count > threshold).count()
    }

    /// Successor tokens of every edge whose count equals `value`.
    pub fn words_with_count(&self, value: EdgeCount) -> Vec<&str> {
        self.edges()
            .filter(|&(_, count)| count == value)
            .map(|(word, _)| word)
            .collect()
    }

    /// Successor tokens of every edge whose count exceeds `value`.
    pub fn words_above(&self, value: EdgeCount) -> Vec<&str> {
        self.edges()
            .filter(|&(_, count)| count > value)
            .map(|(word, _)| word)
            .collect()
    }
}
