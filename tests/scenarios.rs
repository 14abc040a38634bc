use async_trait::async_trait;
use markov_core::config::Config;
use markov_core::core::sampler::weighted_choice;
use markov_core::core::state::StateTable;
use markov_core::persistence::{FileStore, MessageStore};
use markov_core::validator::{get_valid_random, MediaValidator};
use markov_core::{CommunityRegistry, MarkovChain, MediaKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Every link is dead; counts how often it was asked.
#[derive(Default)]
struct DeadLinks {
    checks: AtomicUsize,
}

#[async_trait]
impl MediaValidator for DeadLinks {
    async fn is_reachable(&self, _url: &str) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        false
    }
}

fn animals(chain: &mut MarkovChain) {
    chain.provide_data(["the cat sat", "the cat ran", "the dog sat"]);
}

#[test]
fn learned_edges_match_the_messages() {
    let mut chain = MarkovChain::new("g");
    animals(&mut chain);
    let table = chain.state();
    assert_eq!(table.count("the", "cat"), Some(2));
    assert_eq!(table.count("the", "dog"), Some(1));
    assert_eq!(table.count("cat", "sat"), Some(1));
    assert_eq!(table.count("cat", "ran"), Some(1));
    assert_eq!(table.count("dog", "sat"), Some(1));
}

#[test]
fn one_step_generation_follows_counts() {
    let mut table = StateTable::new();
    table.learn("the cat sat");
    table.learn("the cat ran");
    table.learn("the dog sat");

    let mut rng = StdRng::seed_from_u64(99);
    let trials = 30_000;
    let mut cat = 0;
    let mut dog = 0;
    for _ in 0..trials {
        match table.generate_text("the", 1, &mut rng).as_str() {
            "the cat" => cat += 1,
            "the dog" => dog += 1,
            other => panic!("unexpected output {other:?}"),
        }
    }
    assert!((cat as f64 / trials as f64 - 2.0 / 3.0).abs() < 0.02);
    assert!((dog as f64 / trials as f64 - 1.0 / 3.0).abs() < 0.02);
}

#[test]
fn delete_decrements_without_pruning() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    for m in ["the cat sat", "the cat ran", "the dog sat"] {
        store.append_message("g", m).unwrap();
    }

    let mut chain = MarkovChain::new("g");
    chain.provide_data(store.load_all("g").unwrap().unwrap());
    assert!(chain.delete("the cat sat", &store));

    let table = chain.state();
    assert_eq!(table.count("the", "cat"), Some(1));
    assert_eq!(table.count("cat", "sat"), Some(0));
    assert!(table.contains("the"));
    assert!(table.contains("cat"));
    assert_eq!(table.vocabulary_size(), 3);
}

#[test]
fn sampler_never_picks_zero_weight() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..1_000 {
        assert_eq!(weighted_choice(&[0, 1, 2], &[0.0, 0.0, 5.0], &mut rng), Some(&2));
    }
}

#[tokio::test]
async fn dead_media_leaves_the_set_alone() {
    let mut chain = MarkovChain::new("g");
    chain.update_state("https://a.com/1.gif");
    let validator = DeadLinks::default();

    let reply = chain.get_media(MediaKind::Gif, &validator).await;
    assert_eq!(reply, "I got no valid gifs in my brain");
    assert_eq!(validator.checks.load(Ordering::SeqCst), 1);
    assert_eq!(chain.media().len(MediaKind::Gif), 1);

    let reply = get_valid_random(&validator, Vec::new(), MediaKind::Image).await;
    assert_eq!(reply, "I got no valid images in my brain");
}

#[tokio::test]
async fn registry_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        hieroglyph_odds: 0,
        ..Config::default()
    };

    {
        let store = Arc::new(FileStore::new(dir.path()));
        let registry = CommunityRegistry::new(config.clone(), store, Arc::new(DeadLinks::default()));
        registry.register("guild-1");
        registry.observe("guild-1", "hello there general").await;
        registry.observe("guild-1", "https://cdn.example.com/wave.gif").await;
        registry.set_reply_rate("guild-1", 4).await.unwrap();
    }

    let store = Arc::new(FileStore::new(dir.path()));
    let registry = CommunityRegistry::new(config, store, Arc::new(DeadLinks::default()));
    registry.register("guild-1");
    let stats = registry.analytics("guild-1").await.unwrap();
    assert_eq!(stats.words, 2);
    assert_eq!(stats.gifs, 1);
    assert_eq!(stats.reply_rate, 4);
    assert!((stats.complexity_score - 0.6).abs() < 1e-9);

    let said = registry.get("guild-1").unwrap().lock().await.generate_from("well hello", 3);
    assert_eq!(said.as_deref(), Some("well hello there general"));
}
