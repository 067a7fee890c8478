use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    management::TokenManager,
    spotify::{MusicService, PAGE_LIMIT, ServiceError},
    types::{
        AddTracksRequest, AddTracksResponse, Artist, AudioFeatures, AudioFeaturesResponse,
        CreatePlaylistRequest, CreatePlaylistResponse, PlaylistSummary, SavedTracksResponse, Track,
        UserPlaylistsResponse,
    },
    utils, warning,
};

/// Upper bound on attempts per request before a failure is reported as
/// transient-exhausted.
const MAX_ATTEMPTS: u32 = 3;

/// Longest `Retry-After` delay honored before giving up on a rate-limited
/// request, in seconds.
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Authenticated Spotify Web API client.
///
/// Holds the HTTP client and the token manager; tokens are refreshed
/// transparently before each request. All endpoint methods go through one
/// retry loop that handles rate limits and transient server errors.
pub struct SpotifyClient {
    http: Client,
    token_mgr: TokenManager,
}

impl SpotifyClient {
    pub fn new(token_mgr: TokenManager) -> Self {
        Self {
            http: Client::new(),
            token_mgr,
        }
    }

    /// Sends a request built by `build`, retrying on 429 and 5xx with
    /// bounded backoff. 4xx responses fail fast.
    async fn request<F>(&mut self, build: F) -> Result<Response, ServiceError>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let token = self.token_mgr.get_valid_token().await;
            let response = build(&self.http, &token)
                .send()
                .await
                .map_err(ServiceError::Network)?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);

                if retry_after > MAX_RETRY_AFTER_SECS {
                    warning!(
                        "Retry after has reached an abnormal high of {} seconds. Try again tomorrow.",
                        retry_after
                    );
                    return Err(ServiceError::Transient(format!(
                        "rate limited for {} seconds",
                        retry_after
                    )));
                }

                if attempt >= MAX_ATTEMPTS {
                    return Err(ServiceError::Transient(format!(
                        "still rate limited after {} attempts",
                        attempt
                    )));
                }

                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if status.is_server_error() {
                if attempt >= MAX_ATTEMPTS {
                    return Err(ServiceError::Transient(format!(
                        "{} after {} attempts",
                        status, attempt
                    )));
                }

                sleep(Duration::from_secs(2u64.pow(attempt))).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Permanent(status, body));
        }
    }
}

impl MusicService for SpotifyClient {
    async fn saved_tracks_page(
        &mut self,
        next: Option<String>,
    ) -> Result<(Vec<Track>, Option<String>), ServiceError> {
        let api_url = next.unwrap_or_else(|| {
            format!(
                "{uri}/me/tracks?limit={limit}",
                uri = &config::spotify_apiurl(),
                limit = PAGE_LIMIT
            )
        });

        let response = self
            .request(|http, token| http.get(&api_url).bearer_auth(token))
            .await?;
        let page = response.json::<SavedTracksResponse>().await?;

        // local files carry no track id and cannot be enriched or added
        let tracks = page
            .items
            .into_iter()
            .filter_map(|item| item.track.into_track())
            .collect();

        Ok((tracks, page.next))
    }

    async fn audio_features(
        &mut self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, ServiceError> {
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }

        let api_url = format!(
            "{uri}/audio-features?ids={ids}",
            uri = &config::spotify_apiurl(),
            ids = track_ids.join(",")
        );

        let response = self
            .request(|http, token| http.get(&api_url).bearer_auth(token))
            .await?;
        let features = response.json::<AudioFeaturesResponse>().await?;

        Ok(features.audio_features)
    }

    async fn artist(&mut self, artist_id: &str) -> Result<Artist, ServiceError> {
        let api_url = format!(
            "{uri}/artists/{id}",
            uri = &config::spotify_apiurl(),
            id = artist_id
        );

        let response = self
            .request(|http, token| http.get(&api_url).bearer_auth(token))
            .await?;
        let artist = response.json::<Artist>().await?;

        Ok(artist)
    }

    async fn user_playlists_page(
        &mut self,
        next: Option<String>,
    ) -> Result<(Vec<PlaylistSummary>, Option<String>), ServiceError> {
        let api_url = next.unwrap_or_else(|| {
            format!(
                "{uri}/me/playlists?limit={limit}",
                uri = &config::spotify_apiurl(),
                limit = PAGE_LIMIT
            )
        });

        let response = self
            .request(|http, token| http.get(&api_url).bearer_auth(token))
            .await?;
        let page = response.json::<UserPlaylistsResponse>().await?;

        Ok((page.items, page.next))
    }

    async fn unfollow_playlist(&mut self, playlist_id: &str) -> Result<(), ServiceError> {
        let api_url = format!(
            "{uri}/playlists/{id}/followers",
            uri = &config::spotify_apiurl(),
            id = playlist_id
        );

        self.request(|http, token| http.delete(&api_url).bearer_auth(token))
            .await?;

        Ok(())
    }

    async fn create_playlist(&mut self, name: &str) -> Result<String, ServiceError> {
        let api_url = format!(
            "{uri}/users/{user}/playlists",
            uri = &config::spotify_apiurl(),
            user = &config::spotify_user()
        );

        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: "Curated by curacli from your saved tracks.".to_string(),
            public: false,
            collaborative: false,
        };

        let response = self
            .request(|http, token| http.post(&api_url).bearer_auth(token).json(&body))
            .await?;
        let playlist = response.json::<CreatePlaylistResponse>().await?;

        Ok(playlist.id)
    }

    async fn add_items(
        &mut self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), ServiceError> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let api_url = format!(
            "{uri}/playlists/{id}/tracks",
            uri = &config::spotify_apiurl(),
            id = playlist_id
        );

        let body = AddTracksRequest {
            uris: track_ids.iter().map(|id| utils::track_uri(id)).collect(),
        };

        let response = self
            .request(|http, token| http.post(&api_url).bearer_auth(token).json(&body))
            .await?;
        let _ = response.json::<AddTracksResponse>().await?;

        Ok(())
    }
}
