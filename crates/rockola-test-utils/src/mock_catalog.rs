// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock catalog/playback adapter for deterministic testing.
//!
//! Holds an in-memory playlist and a programmable search result list.
//! `enqueue` mutates the playlist the way the real backend does: `Front`
//! lands immediately after the now-playing track, `Append` at the tail.
//! Failure injection flags exercise the engine's all-or-nothing paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::catalog::Catalog;
use rockola_core::types::{
    AdapterType, Artist, ArtistId, HealthStatus, QueuePosition, Track, TrackId,
};
use rockola_core::RockolaError;

#[derive(Default)]
struct CatalogState {
    queue: Vec<Track>,
    search_results: Vec<Track>,
    artists: HashMap<String, Artist>,
    top_tracks: HashMap<ArtistId, Vec<Track>>,
    library: HashMap<TrackId, Track>,
    search_calls: usize,
    enqueue_calls: usize,
    dequeue_calls: usize,
    fail_next_enqueue: bool,
    fail_next_dequeue: bool,
    fail_next_snapshot: bool,
}

/// A mock playlist backend.
pub struct MockCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::default())),
        }
    }

    /// Replaces the playlist. Index 0 = now playing.
    pub async fn set_queue(&self, tracks: Vec<Track>) {
        let mut state = self.state.lock().await;
        for track in &tracks {
            state.library.insert(track.id.clone(), track.clone());
        }
        state.queue = tracks;
    }

    /// Adds a track to the search result list (and the library).
    pub async fn add_search_result(&self, track: Track) {
        let mut state = self.state.lock().await;
        state.library.insert(track.id.clone(), track.clone());
        state.search_results.push(track);
    }

    /// Registers an artist with top tracks.
    pub async fn add_artist(&self, artist: Artist, top: Vec<Track>) {
        let mut state = self.state.lock().await;
        for track in &top {
            state.library.insert(track.id.clone(), track.clone());
        }
        state
            .artists
            .insert(artist.name.to_lowercase(), artist.clone());
        state.top_tracks.insert(artist.id, top);
    }

    /// Current playlist track ids, in play order.
    pub async fn queue_ids(&self) -> Vec<TrackId> {
        self.state.lock().await.queue.iter().map(|t| t.id.clone()).collect()
    }

    pub async fn search_calls(&self) -> usize {
        self.state.lock().await.search_calls
    }

    pub async fn enqueue_calls(&self) -> usize {
        self.state.lock().await.enqueue_calls
    }

    pub async fn dequeue_calls(&self) -> usize {
        self.state.lock().await.dequeue_calls
    }

    pub async fn fail_next_enqueue(&self) {
        self.state.lock().await.fail_next_enqueue = true;
    }

    pub async fn fail_next_dequeue(&self) {
        self.state.lock().await.fail_next_dequeue = true;
    }

    pub async fn fail_next_snapshot(&self) {
        self.state.lock().await.fail_next_snapshot = true;
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn backend_error(message: &str) -> RockolaError {
    RockolaError::Catalog {
        message: message.to_string(),
        source: None,
    }
}

#[async_trait]
impl PluginAdapter for MockCatalog {
    fn name(&self) -> &str {
        "mock-catalog"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Catalog
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, RockolaError> {
        let mut state = self.state.lock().await;
        state.search_calls += 1;
        let needle = query.to_lowercase();
        Ok(state
            .search_results
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_artist(&self, name: &str) -> Result<Option<Artist>, RockolaError> {
        let state = self.state.lock().await;
        Ok(state.artists.get(&name.to_lowercase()).cloned())
    }

    async fn top_tracks(&self, artist: &ArtistId) -> Result<Vec<Track>, RockolaError> {
        let state = self.state.lock().await;
        Ok(state.top_tracks.get(artist).cloned().unwrap_or_default())
    }

    async fn enqueue(&self, track: &TrackId, position: QueuePosition) -> Result<(), RockolaError> {
        let mut state = self.state.lock().await;
        state.enqueue_calls += 1;
        if std::mem::take(&mut state.fail_next_enqueue) {
            return Err(backend_error("injected enqueue failure"));
        }

        let entry = state.library.get(track).cloned().unwrap_or_else(|| Track {
            id: track.clone(),
            name: track.as_str().to_string(),
            artists: Vec::new(),
            duration_ms: 180_000,
        });

        match position {
            QueuePosition::Front => {
                let index = state.queue.len().min(1);
                state.queue.insert(index, entry);
            }
            QueuePosition::Append => state.queue.push(entry),
        }
        Ok(())
    }

    async fn dequeue(&self, track: &TrackId) -> Result<(), RockolaError> {
        let mut state = self.state.lock().await;
        state.dequeue_calls += 1;
        if std::mem::take(&mut state.fail_next_dequeue) {
            return Err(backend_error("injected dequeue failure"));
        }
        state.queue.retain(|t| &t.id != track);
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<Track>, RockolaError> {
        let mut state = self.state.lock().await;
        if std::mem::take(&mut state.fail_next_snapshot) {
            return Err(backend_error("injected snapshot failure"));
        }
        Ok(state.queue.clone())
    }

    async fn track_duration(&self, track: &TrackId) -> Result<u64, RockolaError> {
        let state = self.state.lock().await;
        state
            .library
            .get(track)
            .map(|t| t.duration_ms)
            .ok_or_else(|| RockolaError::UnknownTrack {
                track: track.as_str().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: TrackId(id.into()),
            name: id.into(),
            artists: vec![],
            duration_ms: 60_000,
        }
    }

    #[tokio::test]
    async fn front_insert_lands_after_now_playing() {
        let catalog = MockCatalog::new();
        catalog.set_queue(vec![track("playing"), track("next")]).await;
        catalog
            .enqueue(&TrackId("vip".into()), QueuePosition::Front)
            .await
            .unwrap();

        let ids = catalog.queue_ids().await;
        assert_eq!(
            ids.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            vec!["playing", "vip", "next"]
        );
    }

    #[tokio::test]
    async fn front_insert_into_empty_queue_is_position_zero() {
        let catalog = MockCatalog::new();
        catalog
            .enqueue(&TrackId("only".into()), QueuePosition::Front)
            .await
            .unwrap();
        assert_eq!(catalog.queue_ids().await.len(), 1);
    }

    #[tokio::test]
    async fn injected_enqueue_failure_leaves_queue_untouched() {
        let catalog = MockCatalog::new();
        catalog.set_queue(vec![track("playing")]).await;
        catalog.fail_next_enqueue().await;

        assert!(catalog
            .enqueue(&TrackId("x".into()), QueuePosition::Append)
            .await
            .is_err());
        assert_eq!(catalog.queue_ids().await.len(), 1);

        // Next call succeeds.
        assert!(catalog
            .enqueue(&TrackId("x".into()), QueuePosition::Append)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn dequeue_removes_by_id() {
        let catalog = MockCatalog::new();
        catalog.set_queue(vec![track("a"), track("b")]).await;
        catalog.dequeue(&TrackId("a".into())).await.unwrap();
        assert_eq!(catalog.queue_ids().await, vec![TrackId("b".into())]);
    }

    #[tokio::test]
    async fn search_matches_by_name_and_respects_limit() {
        let catalog = MockCatalog::new();
        for i in 0..5 {
            catalog.add_search_result(track(&format!("cumbia {i}"))).await;
        }
        catalog.add_search_result(track("ballad")).await;

        let results = catalog.search("cumbia", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|t| t.name.starts_with("cumbia")));

        let none = catalog.search("reggaeton", 3).await.unwrap();
        assert!(none.is_empty());
        assert_eq!(catalog.search_calls().await, 2);
    }

    #[tokio::test]
    async fn track_duration_for_unknown_track_errors() {
        let catalog = MockCatalog::new();
        let err = catalog.track_duration(&TrackId("ghost".into())).await.unwrap_err();
        assert!(matches!(err, RockolaError::UnknownTrack { .. }));
    }
}
