// File: src/validator.rs
use crate::core::types::MediaKind;
use crate::error::ValidatorError;
use async_trait::async_trait;
use log::debug;
use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;

/// Liveness check for a stored media link.
///
/// Implementations fold every failure (timeout, DNS, non-200) into `false`.
#[async_trait]
pub trait MediaValidator: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Checks links with a plain GET, bounded by a timeout.
pub struct HttpValidator {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpValidator {
    pub fn new(timeout: Duration) -> Result<Self, ValidatorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl MediaValidator for HttpValidator {
    async fn is_reachable(&self, url: &str) -> bool {
        let request = self.client.get(url).send();
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response.status() == StatusCode::OK,
            Ok(Err(e)) => {
                debug!("Link check failed for {}: {}", url, e);
                false
            }
            Err(_) => {
                debug!("Link check timed out for {}", url);
                false
            }
        }
    }
}

/// Picks random links until one is reachable.
///
/// Works on its own copy of `urls`: each dead candidate is dropped from the
/// copy, so every link is checked at most once and the caller's set is never
/// touched. Checks run one at a time. Returns `kind.none_found()` once the
/// copy is exhausted.
pub async fn get_valid_random<V>(validator: &V, mut urls: Vec<String>, kind: MediaKind) -> String
where
    V: MediaValidator + ?Sized,
{
    while !urls.is_empty() {
        let idx = rand::thread_rng().gen_range(0..urls.len());
        if validator.is_reachable(&urls[idx]).await {
            return urls.swap_remove(idx);
        }
        let dead = urls.swap_remove(idx);
        debug!("Skipping dead {} link {}", kind, dead);
    }
    kind.none_found()
}
