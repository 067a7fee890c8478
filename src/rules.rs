//! Rule specifications and per-playlist evaluation state.
//!
//! A [`RuleSpec`] is the declarative admission criteria for one playlist:
//! inclusive numeric bounds over audio features plus genre include/exclude
//! lists. A [`RuleSet`] wraps a spec with the provisioned remote playlist
//! and a pending batch of matched track ids that is flushed in chunks of at
//! most 100.

use serde::{Deserialize, Serialize};

use crate::{
    spotify::{BATCH_LIMIT, MusicService, ServiceError},
    types::{AudioFeatures, EnrichedTrack},
};

/// Prefix for playlists owned by the curator, so re-runs can safely delete
/// and recreate them without touching hand-made playlists of the same name.
pub const PLAYLIST_PREFIX: &str = "[cura]";

/// Admission criteria for one playlist.
///
/// Every bound is inclusive and independent; an unset bound (`None`)
/// constrains nothing. A bound of exactly `0.0` is a real bound - `mode`,
/// for example, is a 0/1 categorical where a zero threshold is meaningful.
///
/// Genre matching is substring-based over the artist's lowercase genre
/// tags. `not_genres` always takes precedence over `genres`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tempo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tempo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_acousticness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_acousticness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_danceability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_danceability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_instrumentalness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_instrumentalness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_loudness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_loudness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_valence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_valence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_mode: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mode: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_ms: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_genres: Vec<String>,
}

impl RuleSpec {
    /// An unconstrained spec with just a name set; handy with struct update
    /// syntax.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Evaluates the full rule: every configured bound, then the genre
    /// policy. Feature checks and genre checks must both pass.
    pub fn check(&self, enriched: &EnrichedTrack) -> bool {
        self.features_pass(enriched.features.as_ref()) && self.genres_pass(enriched)
    }

    /// Bound checks over the track's audio features. A track with no
    /// analysis at all, or a null value for a bounded feature, is not
    /// disqualified by that bound: one missing attribute must not veto an
    /// otherwise-matching track.
    fn features_pass(&self, features: Option<&AudioFeatures>) -> bool {
        let Some(f) = features else {
            return true;
        };

        let checks = [
            (self.min_tempo, self.max_tempo, f.tempo),
            (self.min_acousticness, self.max_acousticness, f.acousticness),
            (self.min_danceability, self.max_danceability, f.danceability),
            (self.min_energy, self.max_energy, f.energy),
            (
                self.min_instrumentalness,
                self.max_instrumentalness,
                f.instrumentalness,
            ),
            (self.min_loudness, self.max_loudness, f.loudness),
            (self.min_valence, self.max_valence, f.valence),
            (self.min_mode, self.max_mode, f.mode),
            (self.min_duration_ms, self.max_duration_ms, f.duration_ms),
        ];

        checks
            .iter()
            .all(|(min, max, value)| within_bounds(*min, *max, *value))
    }

    /// Genre policy: `not_genres` exclusion first, then `genres` inclusion.
    /// A track with no resolvable artist has no genre tags, so it fails an
    /// inclusion list but can never be excluded.
    fn genres_pass(&self, enriched: &EnrichedTrack) -> bool {
        let tags: &[String] = enriched
            .artist
            .as_ref()
            .map(|a| a.genres.as_slice())
            .unwrap_or(&[]);

        if tags
            .iter()
            .any(|tag| self.not_genres.iter().any(|not| tag.contains(not.as_str())))
        {
            return false;
        }

        if self.genres.is_empty() {
            return true;
        }

        tags.iter()
            .any(|tag| self.genres.iter().any(|genre| tag.contains(genre.as_str())))
    }

    /// Human-readable summary of the configured bounds for the rules table.
    pub fn describe_bounds(&self) -> String {
        let named = [
            ("tempo", self.min_tempo, self.max_tempo),
            ("acousticness", self.min_acousticness, self.max_acousticness),
            ("danceability", self.min_danceability, self.max_danceability),
            ("energy", self.min_energy, self.max_energy),
            (
                "instrumentalness",
                self.min_instrumentalness,
                self.max_instrumentalness,
            ),
            ("loudness", self.min_loudness, self.max_loudness),
            ("valence", self.min_valence, self.max_valence),
            ("mode", self.min_mode, self.max_mode),
            ("duration_ms", self.min_duration_ms, self.max_duration_ms),
        ];

        let mut parts: Vec<String> = Vec::new();
        for (name, min, max) in named {
            match (min, max) {
                (Some(lo), Some(hi)) => parts.push(format!("{} in [{}, {}]", name, lo, hi)),
                (Some(lo), None) => parts.push(format!("{} >= {}", name, lo)),
                (None, Some(hi)) => parts.push(format!("{} <= {}", name, hi)),
                (None, None) => {}
            }
        }

        parts.join(", ")
    }
}

fn within_bounds(min: Option<f64>, max: Option<f64>, value: Option<f64>) -> bool {
    let Some(v) = value else {
        return true;
    };
    if let Some(lo) = min {
        if v < lo {
            return false;
        }
    }
    if let Some(hi) = max {
        if v > hi {
            return false;
        }
    }
    true
}

/// Per-playlist evaluation state: the spec, the provisioned remote playlist
/// id and the pending batch of matched track ids.
///
/// Two states: open (accepting checks) and closed (after [`RuleSet::finish`]).
/// Checking a closed rule set is a programmer error and panics.
pub struct RuleSet {
    spec: RuleSpec,
    playlist_name: String,
    playlist_id: String,
    pending: Vec<String>,
    added: usize,
    closed: bool,
}

impl RuleSet {
    /// Provisions the target playlist and returns an open rule set.
    ///
    /// Any existing remote playlist with the exact same prefixed name is
    /// unfollowed first and a fresh empty one is created, so re-running the
    /// whole pipeline never duplicates or accumulates stale playlists.
    pub async fn provision<C: MusicService>(
        client: &mut C,
        spec: RuleSpec,
    ) -> Result<Self, ServiceError> {
        let playlist_name = format!("{} {}", PLAYLIST_PREFIX, spec.name);

        let mut next: Option<String> = None;
        loop {
            let (playlists, page_next) = client.user_playlists_page(next).await?;
            for playlist in playlists {
                if playlist.name == playlist_name {
                    client.unfollow_playlist(&playlist.id).await?;
                }
            }
            match page_next {
                Some(n) => next = Some(n),
                None => break,
            }
        }

        let playlist_id = client.create_playlist(&playlist_name).await?;

        Ok(Self {
            spec,
            playlist_name,
            playlist_id,
            pending: Vec::new(),
            added: 0,
            closed: false,
        })
    }

    pub fn playlist_name(&self) -> &str {
        &self.playlist_name
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Evaluates the track and queues its id on a match. Once the queue
    /// holds [`BATCH_LIMIT`] ids they are flushed in batched add-items
    /// calls. The returned bool reports acceptance. An `Err` is a flush
    /// failure, not a rejection: the track was accepted and its id stays
    /// queued for the next flush attempt.
    pub async fn check_and_add<C: MusicService>(
        &mut self,
        client: &mut C,
        enriched: &EnrichedTrack,
    ) -> Result<bool, ServiceError> {
        assert!(!self.closed, "check_and_add called on a finished rule set");

        if !self.spec.check(enriched) {
            return Ok(false);
        }

        self.pending.push(enriched.track.id.clone());
        if self.pending.len() >= BATCH_LIMIT {
            self.flush(client).await?;
        }

        Ok(true)
    }

    /// Flushes any remaining queued ids (an empty queue issues no call) and
    /// closes the rule set. Returns the total number of tracks added.
    pub async fn finish<C: MusicService>(
        &mut self,
        client: &mut C,
    ) -> Result<usize, ServiceError> {
        if !self.pending.is_empty() {
            self.flush(client).await?;
        }
        self.closed = true;
        Ok(self.added)
    }

    async fn flush<C: MusicService>(&mut self, client: &mut C) -> Result<(), ServiceError> {
        // drain chunk by chunk, and only after each remote call succeeded:
        // a failed flush keeps the unsent ids queued for the next attempt,
        // and a queue that grew past the limit in the meantime still goes
        // out in calls of at most BATCH_LIMIT ids
        while !self.pending.is_empty() {
            let take = self.pending.len().min(BATCH_LIMIT);
            client
                .add_items(&self.playlist_id, &self.pending[..take])
                .await?;
            self.pending.drain(..take);
            self.added += take;
        }
        Ok(())
    }
}
