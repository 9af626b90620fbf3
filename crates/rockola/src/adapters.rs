// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin HTTP adapters for the external collaborators.
//!
//! The playback backend and the WhatsApp transport frontend run as separate
//! services; these adapters speak their HTTP APIs. The word-list content
//! filter runs in-process from configured lists. None of them contain
//! policy -- all decisions live in the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::catalog::Catalog;
use rockola_core::traits::filter::ContentFilter;
use rockola_core::traits::transport::Transport;
use rockola_core::types::{
    AdapterType, Artist, ArtistId, FilterAction, FilterVerdict, HealthStatus, MessageId,
    QueuePosition, Severity, Track, TrackId, UserId,
};
use rockola_core::RockolaError;

fn catalog_error(e: reqwest::Error) -> RockolaError {
    RockolaError::Catalog {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

fn transport_error(e: reqwest::Error) -> RockolaError {
    RockolaError::Transport {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

/// Catalog adapter over the playback backend's HTTP API.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnqueueBody<'a> {
    track_id: &'a str,
    /// 0 = front (after now playing); absent = append.
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DurationBody {
    duration_ms: u64,
}

#[async_trait]
impl PluginAdapter for HttpCatalog {
    fn name(&self) -> &str {
        "http-catalog"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Catalog
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        match self.client.get(self.url("/health")).send().await {
            Ok(r) if r.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(r) => Ok(HealthStatus::Degraded(format!("status {}", r.status()))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, RockolaError> {
        let limit = limit.to_string();
        self.client
            .get(self.url("/v1/search"))
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(catalog_error)?
            .json()
            .await
            .map_err(catalog_error)
    }

    async fn search_artist(&self, name: &str) -> Result<Option<Artist>, RockolaError> {
        let response = self
            .client
            .get(self.url("/v1/artists"))
            .query(&[("name", name)])
            .send()
            .await
            .map_err(catalog_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        response
            .error_for_status()
            .map_err(catalog_error)?
            .json()
            .await
            .map(Some)
            .map_err(catalog_error)
    }

    async fn top_tracks(&self, artist: &ArtistId) -> Result<Vec<Track>, RockolaError> {
        self.client
            .get(self.url(&format!("/v1/artists/{}/top-tracks", artist.0)))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(catalog_error)?
            .json()
            .await
            .map_err(catalog_error)
    }

    async fn enqueue(&self, track: &TrackId, position: QueuePosition) -> Result<(), RockolaError> {
        let body = EnqueueBody {
            track_id: track.as_str(),
            position: match position {
                QueuePosition::Front => Some(0),
                QueuePosition::Append => None,
            },
        };
        self.client
            .post(self.url("/v1/queue"))
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(catalog_error)?;
        Ok(())
    }

    async fn dequeue(&self, track: &TrackId) -> Result<(), RockolaError> {
        self.client
            .delete(self.url(&format!("/v1/queue/{}", track.as_str())))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(catalog_error)?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<Track>, RockolaError> {
        self.client
            .get(self.url("/v1/queue"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(catalog_error)?
            .json()
            .await
            .map_err(catalog_error)
    }

    async fn track_duration(&self, track: &TrackId) -> Result<u64, RockolaError> {
        let body: DurationBody = self
            .client
            .get(self.url(&format!("/v1/tracks/{}/duration", track.as_str())))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(catalog_error)?
            .json()
            .await
            .map_err(catalog_error)?;
        Ok(body.duration_ms)
    }
}

/// Transport adapter that POSTs outbound messages to the frontend's webhook.
pub struct WebhookTransport {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookTransport {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundBody<'a> {
    user_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct OutboundAck {
    #[serde(default)]
    message_id: Option<String>,
}

#[async_trait]
impl PluginAdapter for WebhookTransport {
    fn name(&self) -> &str {
        "webhook-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn send_message(&self, to: &UserId, text: &str) -> Result<MessageId, RockolaError> {
        let ack: OutboundAck = self
            .client
            .post(&self.webhook_url)
            .json(&OutboundBody {
                user_id: to.as_str(),
                text,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport_error)?
            .json()
            .await
            .unwrap_or_default();

        Ok(MessageId(
            ack.message_id.unwrap_or_else(|| "unacked".to_string()),
        ))
    }
}

/// Transport that only logs outbound messages. Used when no webhook is
/// configured, so a dev deployment still shows what would have been sent.
pub struct LogTransport;

#[async_trait]
impl PluginAdapter for LogTransport {
    fn name(&self) -> &str {
        "log-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for LogTransport {
    async fn send_message(&self, to: &UserId, text: &str) -> Result<MessageId, RockolaError> {
        warn!(user = %to, text, "no transport webhook configured; message logged only");
        Ok(MessageId("logged".to_string()))
    }
}

/// In-process content filter over configured word lists.
///
/// Matching is case-insensitive on whole words. A block-list hit outranks a
/// warn-list hit; repeated block hits in one message still produce a single
/// verdict.
pub struct WordListFilter {
    warn_words: Vec<String>,
    block_words: Vec<String>,
}

impl WordListFilter {
    pub fn new(warn_words: Vec<String>, block_words: Vec<String>) -> Self {
        Self {
            warn_words: warn_words.into_iter().map(|w| w.to_lowercase()).collect(),
            block_words: block_words.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn contains_word(text: &str, word: &str) -> bool {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|token| token == word)
    }
}

#[async_trait]
impl PluginAdapter for WordListFilter {
    fn name(&self) -> &str {
        "wordlist-filter"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ContentFilter
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl ContentFilter for WordListFilter {
    async fn evaluate(&self, text: &str) -> Result<FilterVerdict, RockolaError> {
        let lowered = text.to_lowercase();

        for word in &self.block_words {
            if Self::contains_word(&lowered, word) {
                debug!("content filter block-list hit");
                return Ok(FilterVerdict {
                    allowed: false,
                    categories: vec!["blocked_word".to_string()],
                    severity: Severity::High,
                    recommended_action: FilterAction::TempBlock,
                });
            }
        }

        for word in &self.warn_words {
            if Self::contains_word(&lowered, word) {
                debug!("content filter warn-list hit");
                return Ok(FilterVerdict {
                    allowed: false,
                    categories: vec!["warned_word".to_string()],
                    severity: Severity::Low,
                    recommended_action: FilterAction::Warn,
                });
            }
        }

        Ok(FilterVerdict::allow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wordlist_filter_allows_clean_text() {
        let filter = WordListFilter::new(vec!["mild".into()], vec!["severe".into()]);
        let verdict = filter.evaluate("a perfectly fine song title").await.unwrap();
        assert!(verdict.allowed);
    }

    #[tokio::test]
    async fn block_word_outranks_warn_word() {
        let filter = WordListFilter::new(vec!["mild".into()], vec!["severe".into()]);
        let verdict = filter.evaluate("mild and SEVERE words").await.unwrap();
        assert!(!verdict.allowed);
        assert_eq!(verdict.recommended_action, FilterAction::TempBlock);
        assert_eq!(verdict.severity, Severity::High);
    }

    #[tokio::test]
    async fn warn_word_recommends_warning_only() {
        let filter = WordListFilter::new(vec!["mild".into()], vec![]);
        let verdict = filter.evaluate("a mild phrase").await.unwrap();
        assert!(!verdict.allowed);
        assert_eq!(verdict.recommended_action, FilterAction::Warn);
    }

    #[tokio::test]
    async fn matches_whole_words_not_substrings() {
        let filter = WordListFilter::new(vec![], vec!["ass".into()]);
        let verdict = filter.evaluate("classical bass compilation").await.unwrap();
        assert!(verdict.allowed, "substrings inside words must not match");
    }

    #[tokio::test]
    async fn log_transport_always_succeeds() {
        let transport = LogTransport;
        let id = transport
            .send_message(&UserId("u".into()), "hello")
            .await
            .unwrap();
        assert_eq!(id.0, "logged");
    }

    #[test]
    fn http_catalog_normalizes_trailing_slash() {
        let catalog = HttpCatalog::new("http://localhost:7700/".into());
        assert_eq!(catalog.url("/v1/queue"), "http://localhost:7700/v1/queue");
    }
}
