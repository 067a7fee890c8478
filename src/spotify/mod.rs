//! # Spotify Integration Module
//!
//! Interface to the Spotify Web API for the curator: OAuth 2.0 PKCE
//! authentication, paginated saved-track and playlist listings, batched
//! audio-feature lookups, single-artist lookups and playlist mutations.
//!
//! The [`MusicService`] trait is the seam between the curation core and the
//! network. The core (rule sets, enrichment pipeline, driver) only ever talks
//! to this trait; [`SpotifyClient`] is the real implementation and tests use
//! an in-memory mock.
//!
//! ## Error handling
//!
//! All requests flow through a shared retry loop:
//! - 429 Too Many Requests: waits for the `Retry-After` delay (up to 120
//!   seconds, a warning beyond that) and retries.
//! - 5xx server errors: retried with exponential backoff.
//! - Retries are bounded; exhausting them yields [`ServiceError::Transient`].
//! - 4xx client errors (including auth failures) fail fast as
//!   [`ServiceError::Permanent`].
//!
//! ## API coverage
//!
//! - `GET /me/tracks` - saved tracks, paginated via the `next` URL
//! - `GET /audio-features` - features for up to 100 track ids, positional
//! - `GET /artists/{id}` - single artist with genre tags
//! - `GET /me/playlists` - user's playlists, paginated
//! - `DELETE /playlists/{id}/followers` - unfollow (delete) a playlist
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `POST /playlists/{id}/tracks` - add up to 100 tracks
//! - `POST /api/token` - token exchange and refresh

pub mod auth;
pub mod client;

pub use client::SpotifyClient;

use std::fmt;

use reqwest::StatusCode;

use crate::types::{Artist, AudioFeatures, PlaylistSummary, Track};

/// Maximum ids per batched remote call (audio features, add-items).
pub const BATCH_LIMIT: usize = 100;

/// Page size used for the saved-tracks and playlists listings.
pub const PAGE_LIMIT: u32 = 50;

/// Errors surfaced by the remote music service.
#[derive(Debug)]
pub enum ServiceError {
    /// Transient failure (timeout, rate limit, 5xx) that persisted through
    /// the bounded retry loop.
    Transient(String),
    /// Permanent failure (4xx, auth); retrying will not help.
    Permanent(StatusCode, String),
    /// Connection-level failure from the HTTP client.
    Network(reqwest::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Transient(msg) => write!(f, "transient remote failure: {}", msg),
            ServiceError::Permanent(status, msg) => {
                write!(f, "remote request failed ({}): {}", status, msg)
            }
            ServiceError::Network(err) => write!(f, "network error: {}", err),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Network(err)
    }
}

/// The remote operations the curation core needs. Implemented by
/// [`SpotifyClient`]; tests provide an in-memory mock.
///
/// Pagination is cursor-style: a page call returns the items plus an opaque
/// continuation (the `next` URL) to feed into the following call.
#[allow(async_fn_in_trait)]
pub trait MusicService {
    /// One page of the user's saved tracks.
    async fn saved_tracks_page(
        &mut self,
        next: Option<String>,
    ) -> Result<(Vec<Track>, Option<String>), ServiceError>;

    /// Audio features for up to [`BATCH_LIMIT`] track ids. The result is
    /// positional: index i corresponds to `track_ids[i]`, with `None` where
    /// no analysis exists.
    async fn audio_features(
        &mut self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, ServiceError>;

    /// A single artist with its genre tags.
    async fn artist(&mut self, artist_id: &str) -> Result<Artist, ServiceError>;

    /// One page of the user's playlists.
    async fn user_playlists_page(
        &mut self,
        next: Option<String>,
    ) -> Result<(Vec<PlaylistSummary>, Option<String>), ServiceError>;

    /// Unfollow (delete) a playlist by id.
    async fn unfollow_playlist(&mut self, playlist_id: &str) -> Result<(), ServiceError>;

    /// Create a playlist by name, returning its id.
    async fn create_playlist(&mut self, name: &str) -> Result<String, ServiceError>;

    /// Add up to [`BATCH_LIMIT`] track ids to a playlist.
    async fn add_items(
        &mut self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), ServiceError>;
}
