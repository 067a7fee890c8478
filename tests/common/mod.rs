#![allow(dead_code)] // each test binary uses a subset of these helpers

use std::collections::HashMap;

use reqwest::StatusCode;

use curacli::spotify::{MusicService, ServiceError};
use curacli::types::{
    Artist, AudioFeatures, EnrichedTrack, PlaylistSummary, Track, TrackArtist,
};

/// In-memory stand-in for the Spotify Web API. Records every mutation and
/// lookup so tests can assert on call counts and payloads.
#[derive(Default)]
pub struct MockService {
    pub features: HashMap<String, AudioFeatures>,
    pub artists: HashMap<String, Artist>,
    pub playlists: Vec<PlaylistSummary>,
    pub track_pages: Vec<Vec<Track>>,

    pub feature_calls: Vec<Vec<String>>,
    pub artist_calls: Vec<String>,
    pub unfollowed: Vec<String>,
    pub created: Vec<String>,
    pub added: Vec<(String, Vec<String>)>,
    pub add_calls: Vec<Vec<String>>,

    pub fail_features: bool,
    pub fail_adds: usize,
    next_playlist_id: usize,
}

impl MusicService for MockService {
    async fn saved_tracks_page(
        &mut self,
        next: Option<String>,
    ) -> Result<(Vec<Track>, Option<String>), ServiceError> {
        let index: usize = next.map(|n| n.parse().unwrap()).unwrap_or(0);
        let page = self.track_pages.get(index).cloned().unwrap_or_default();
        let next = if index + 1 < self.track_pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok((page, next))
    }

    async fn audio_features(
        &mut self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, ServiceError> {
        self.feature_calls.push(track_ids.to_vec());
        if self.fail_features {
            return Err(ServiceError::Transient("mock feature failure".to_string()));
        }
        Ok(track_ids
            .iter()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }

    async fn artist(&mut self, artist_id: &str) -> Result<Artist, ServiceError> {
        self.artist_calls.push(artist_id.to_string());
        self.artists.get(artist_id).cloned().ok_or_else(|| {
            ServiceError::Permanent(StatusCode::NOT_FOUND, "no such artist".to_string())
        })
    }

    async fn user_playlists_page(
        &mut self,
        _next: Option<String>,
    ) -> Result<(Vec<PlaylistSummary>, Option<String>), ServiceError> {
        Ok((self.playlists.clone(), None))
    }

    async fn unfollow_playlist(&mut self, playlist_id: &str) -> Result<(), ServiceError> {
        self.unfollowed.push(playlist_id.to_string());
        self.playlists.retain(|p| p.id != playlist_id);
        Ok(())
    }

    async fn create_playlist(&mut self, name: &str) -> Result<String, ServiceError> {
        self.next_playlist_id += 1;
        let id = format!("playlist-{}", self.next_playlist_id);
        self.created.push(name.to_string());
        self.playlists.push(PlaylistSummary {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn add_items(
        &mut self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), ServiceError> {
        self.add_calls.push(track_ids.to_vec());
        if self.fail_adds > 0 {
            self.fail_adds -= 1;
            return Err(ServiceError::Transient("mock add failure".to_string()));
        }
        self.added
            .push((playlist_id.to_string(), track_ids.to_vec()));
        Ok(())
    }
}

pub fn make_track(id: &str, name: &str, artist_id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![TrackArtist {
            id: artist_id.to_string(),
            name: format!("{} artist", name),
        }],
        duration_ms: 200_000,
    }
}

pub fn make_artist(id: &str, name: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub fn make_features(energy: f64) -> AudioFeatures {
    AudioFeatures {
        energy: Some(energy),
        ..AudioFeatures::default()
    }
}

pub fn make_enriched(
    track: Track,
    features: Option<AudioFeatures>,
    artist: Option<Artist>,
) -> EnrichedTrack {
    EnrichedTrack {
        track,
        features,
        artist,
    }
}
