use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// A saved track as the curator sees it: stable id, display name, the
/// artist list (first entry is the primary artist) and its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub duration_ms: u64,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&TrackArtist> {
        self.artists.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
}

/// Per-track audio analysis attributes. Every field is optional: Spotify may
/// not have an analysis for a track, and a partial object must not break
/// rule evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub tempo: Option<f64>,
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub loudness: Option<f64>,
    pub valence: Option<f64>,
    pub mode: Option<f64>,
    pub duration_ms: Option<f64>,
}

/// A track joined with its resolved enrichment data. Built fresh each run,
/// never persisted; only its constituent parts live in the caches.
#[derive(Debug, Clone)]
pub struct EnrichedTrack {
    pub track: Track,
    pub features: Option<AudioFeatures>,
    pub artist: Option<Artist>,
}

// --- Spotify Web API wire types ---

#[derive(Debug, Clone, Deserialize)]
pub struct SavedTracksResponse {
    pub items: Vec<SavedTrackItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedTrackItem {
    pub track: SavedTrackObject,
}

/// Raw track object from `/me/tracks`. Local files carry a null id and are
/// skipped during conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedTrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl SavedTrackObject {
    pub fn into_track(self) -> Option<Track> {
        Some(Track {
            id: self.id?,
            name: self.name,
            artists: self.artists,
            duration_ms: self.duration_ms,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPlaylistsResponse {
    pub items: Vec<PlaylistSummary>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}

// --- Table rows for console output ---

#[derive(Tabled)]
pub struct RuleTableRow {
    pub playlist: String,
    pub bounds: String,
    pub genres: String,
    pub not_genres: String,
}

#[derive(Tabled)]
pub struct NotAddedTableRow {
    pub artist: String,
    pub track: String,
    pub genres: String,
}
