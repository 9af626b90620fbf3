// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog adapter trait for the music catalog / playback backend.

use async_trait::async_trait;

use crate::error::RockolaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Artist, ArtistId, QueuePosition, Track, TrackId};

/// Adapter for the shared-playlist music backend (search, enqueue, transport).
///
/// `snapshot` returns the playlist in play order: index 0 is the track
/// currently playing. All mutations are by track id; the backend owns the
/// playlist, the core only decides what goes where.
#[async_trait]
pub trait Catalog: PluginAdapter {
    /// Searches the catalog for tracks matching a free-text query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, RockolaError>;

    /// Looks up an artist by name. Returns `None` when no match exists.
    async fn search_artist(&self, name: &str) -> Result<Option<Artist>, RockolaError>;

    /// Returns the top tracks for an artist.
    async fn top_tracks(&self, artist: &ArtistId) -> Result<Vec<Track>, RockolaError>;

    /// Inserts a track into the shared playlist at the given position.
    async fn enqueue(&self, track: &TrackId, position: QueuePosition) -> Result<(), RockolaError>;

    /// Removes a track from the shared playlist.
    async fn dequeue(&self, track: &TrackId) -> Result<(), RockolaError>;

    /// Returns the current playlist, index 0 = now playing.
    async fn snapshot(&self) -> Result<Vec<Track>, RockolaError>;

    /// Returns the duration of a track in milliseconds.
    async fn track_duration(&self, track: &TrackId) -> Result<u64, RockolaError>;
}
