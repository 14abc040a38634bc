// File: src/registry.rs
use crate::analytics::ChainAnalytics;
use crate::config::Config;
use crate::core::chain::MarkovChain;
use crate::core::hieroglyph::Hieroglyphs;
use crate::core::media::classify;
use crate::core::state::tokenize;
use crate::core::types::MediaKind;
use crate::error::StoreError;
use crate::persistence::MessageStore;
use crate::responder::{compose_reply, plan_reply, should_reply};
use crate::validator::{get_valid_random, MediaValidator};
use log::{info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A community's model behind its own lock. Learning, deleting and talking
/// for one community are serialized; different communities never contend.
pub type SharedChain = Arc<Mutex<MarkovChain>>;

/// Owns every community's model plus the collaborators they share.
///
/// Built once by the composition root and passed by reference to whatever
/// needs per-community lookup.
pub struct CommunityRegistry {
    chains: RwLock<HashMap<String, SharedChain>>,
    store: Arc<dyn MessageStore>,
    validator: Arc<dyn MediaValidator>,
    config: Config,
}

impl CommunityRegistry {
    pub fn new(config: Config, store: Arc<dyn MessageStore>, validator: Arc<dyn MediaValidator>) -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
            store,
            validator,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn MessageStore {
        self.store.as_ref()
    }

    pub fn validator(&self) -> &dyn MediaValidator {
        self.validator.as_ref()
    }

    /// Runs one store call on the blocking pool so file IO never stalls the
    /// runtime's worker threads.
    async fn with_store<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MessageStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || call(store.as_ref())).await?
    }

    /// Whether `shared` is still the model registered under `id`.
    fn is_current(&self, id: &str, shared: &SharedChain) -> bool {
        self.chains
            .read()
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, shared))
    }

    fn blank_chain(&self, id: &str) -> MarkovChain {
        let mut chain = MarkovChain::new(id)
            .with_stylizer(Some(Arc::new(Hieroglyphs::new())), self.config.hieroglyph_odds);
        chain.reply_rate = self.config.default_reply_rate;
        chain
    }

    /// A chain seeded from everything the store holds for `id`.
    fn loaded_chain(&self, id: &str) -> MarkovChain {
        let mut chain = self.blank_chain(id);
        match self.store.load_all(id) {
            Ok(Some(messages)) => {
                chain.provide_data(&messages);
                info!("Loaded {} messages for community {}", messages.len(), id);
            }
            Ok(None) => warn!("No previous data found for community {}", id),
            Err(e) => warn!("Could not load data for community {}: {}", id, e),
        }
        match self.store.reply_rate(id) {
            Ok(Some(rate)) => chain.reply_rate = rate,
            Ok(None) => {}
            Err(e) => warn!("Could not read reply rate for community {}: {}", id, e),
        }
        chain
    }

    /// Creates the model for a community, seeded from storage. Registering an
    /// id twice hands back the existing model.
    pub fn register(&self, id: &str) -> SharedChain {
        if let Some(existing) = self.get(id) {
            return existing;
        }
        let chain = Arc::new(Mutex::new(self.loaded_chain(id)));
        self.chains
            .write()
            .entry(id.to_string())
            .or_insert(chain)
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<SharedChain> {
        self.chains.read().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.chains.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drops the model and purges its storage. Returns whether it was registered.
    ///
    /// The purge waits for whoever holds the model's lock, and writers check
    /// they are still registered once they hold it, so nothing lands on disk
    /// for a removed community.
    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.chains.write().remove(id);
        let _guard = match &removed {
            Some(shared) => Some(shared.lock().await),
            None => None,
        };
        let owned_id = id.to_string();
        self.with_store(move |store| store.delete_community(&owned_id))
            .await?;
        warn!("Left community {}", id);
        Ok(removed.is_some())
    }

    /// Wipes storage for `id` and starts it over with a blank model.
    pub async fn reset(&self, id: &str) -> Result<(), StoreError> {
        let blank = self.blank_chain(id);
        let owned_id = id.to_string();
        match self.get(id) {
            Some(shared) => {
                let mut chain = shared.lock().await;
                self.with_store(move |store| store.delete_community(&owned_id))
                    .await?;
                *chain = blank;
            }
            None => {
                self.with_store(move |store| store.delete_community(&owned_id))
                    .await?;
                self.chains
                    .write()
                    .insert(id.to_string(), Arc::new(Mutex::new(blank)));
            }
        }
        info!("Reset training data for community {}", id);
        Ok(())
    }

    /// Rebuilds a registered model from storage, after a bulk import.
    pub async fn retrain(&self, id: &str) -> Option<usize> {
        let shared = self.get(id)?;
        let fresh = self.loaded_chain(id);
        let words = fresh.state().vocabulary_size();
        *shared.lock().await = fresh;
        Some(words)
    }

    /// Learns one inbound message. Messages under two words are ignored
    /// unless they are a media link. The durable append is best-effort and
    /// never blocks learning.
    pub async fn observe(&self, id: &str, text: &str) -> bool {
        if tokenize(text).len() < 2 && classify(text).is_none() {
            return false;
        }
        let Some(shared) = self.get(id) else {
            return false;
        };
        let mut chain = shared.lock().await;
        if !self.is_current(id, &shared) {
            return false;
        }
        let (owned_id, owned_text) = (id.to_string(), text.to_string());
        if let Err(e) = self
            .with_store(move |store| store.append_message(&owned_id, &owned_text))
            .await
        {
            warn!("Could not store message for community {}: {}", id, e);
        }
        chain.update_state(text);
        true
    }

    /// `None` if the community is unknown, else the store's deletion result.
    /// The in-memory retraction happens whatever the store reports.
    pub async fn delete_message(&self, id: &str, text: &str) -> Option<bool> {
        let shared = self.get(id)?;
        let mut chain = shared.lock().await;
        if !self.is_current(id, &shared) {
            return None;
        }
        chain.forget(text);
        let (owned_id, owned_text) = (id.to_string(), text.to_string());
        let found = self
            .with_store(move |store| store.delete_occurrences(&owned_text, &owned_id))
            .await
            .unwrap_or_else(|e| {
                warn!("Could not delete stored message for {}: {}", id, e);
                false
            });
        Some(found)
    }

    pub async fn set_reply_rate(&self, id: &str, rate: u32) -> Result<bool, StoreError> {
        let Some(shared) = self.get(id) else {
            return Ok(false);
        };
        let mut chain = shared.lock().await;
        if !self.is_current(id, &shared) {
            return Ok(false);
        }
        let owned_id = id.to_string();
        self.with_store(move |store| store.save_reply_rate(rate, &owned_id))
            .await?;
        chain.reply_rate = rate;
        Ok(true)
    }

    /// Media recall. Candidates are copied under the lock, then checked with
    /// the lock released so slow links never hold up learning.
    pub async fn get_media(&self, id: &str, kind: MediaKind) -> Option<String> {
        let shared = self.get(id)?;
        let candidates = shared.lock().await.media().candidates(kind);
        Some(get_valid_random(self.validator.as_ref(), candidates, kind).await)
    }

    /// Decides whether to answer an inbound message and, if so, produces the
    /// answer.
    pub async fn reply(&self, id: &str, mentioned: bool) -> Option<String> {
        let shared = self.get(id)?;
        let reply_rate = shared.lock().await.reply_rate;
        let plan = {
            let mut rng = rand::thread_rng();
            if !should_reply(reply_rate, mentioned, &mut rng) {
                return None;
            }
            plan_reply(&mut rng)
        };
        compose_reply(&shared, self.validator.as_ref(), plan).await
    }

    pub async fn analytics(&self, id: &str) -> Option<ChainAnalytics> {
        let shared = self.get(id)?;
        let chain = shared.lock().await;
        Some(chain.analytics(self.config.use_threshold))
    }
}
