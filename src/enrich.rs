//! Track enrichment pipeline.
//!
//! Joins each saved track with its audio features and artist genres before
//! rule evaluation. Feature lookups are batched: cache misses accumulate
//! until 100 are pending, then one remote call resolves them positionally
//! and the feature cache is persisted. Artist lookups are single-id and
//! resolved (and persisted) immediately on a cache miss, since artist ids
//! repeat far less predictably across a batch window.
//!
//! A track leaves the pipeline only once both lookups are settled; genuinely
//! absent data travels as `None`, never as missing enrichment.

use std::fmt;

use crate::{
    management::{ArtistCacheManager, FeatureCacheManager},
    spotify::{BATCH_LIMIT, MusicService, ServiceError},
    types::{Artist, EnrichedTrack, Track},
    warning,
};

/// Errors the pipeline reports to the driver. Anything recoverable inside a
/// single track (a missing artist, a null feature object) is degraded
/// in-place instead and never surfaces here.
#[derive(Debug)]
pub enum PipelineError {
    /// The batched audio-feature fetch failed after retries. Carries the
    /// tracks whose enrichment is unresolved this run so the driver can
    /// decide policy (skip and report, or abort).
    FeatureFetch {
        source: ServiceError,
        tracks: Vec<Track>,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::FeatureFetch { source, tracks } => write!(
                f,
                "audio-feature fetch failed for {} tracks: {}",
                tracks.len(),
                source
            ),
        }
    }
}

impl std::error::Error for PipelineError {}

pub struct EnrichmentPipeline {
    features: FeatureCacheManager,
    artists: ArtistCacheManager,
    pending: Vec<Track>,
}

impl EnrichmentPipeline {
    pub fn new(features: FeatureCacheManager, artists: ArtistCacheManager) -> Self {
        Self {
            features,
            artists,
            pending: Vec::new(),
        }
    }

    /// Hands one track to the pipeline. Feature-cache hits come back
    /// enriched immediately; misses accumulate until a full batch of
    /// [`BATCH_LIMIT`] resolves in one remote call. The returned vector
    /// holds every track whose enrichment completed through this call.
    pub async fn submit<C: MusicService>(
        &mut self,
        client: &mut C,
        track: Track,
    ) -> Result<Vec<EnrichedTrack>, PipelineError> {
        if self.features.get(&track.id).is_some() {
            let enriched = self.build_enriched(client, track).await;
            return Ok(vec![enriched]);
        }

        self.pending.push(track);
        if self.pending.len() >= BATCH_LIMIT {
            return self.resolve_pending(client).await;
        }

        Ok(Vec::new())
    }

    /// Unconditionally resolves a partial pending group at end-of-stream,
    /// so no track is left unevaluated.
    pub async fn finish<C: MusicService>(
        &mut self,
        client: &mut C,
    ) -> Result<Vec<EnrichedTrack>, PipelineError> {
        self.resolve_pending(client).await
    }

    pub fn feature_cache(&self) -> &FeatureCacheManager {
        &self.features
    }

    pub fn artist_cache(&self) -> &ArtistCacheManager {
        &self.artists
    }

    async fn resolve_pending<C: MusicService>(
        &mut self,
        client: &mut C,
    ) -> Result<Vec<EnrichedTrack>, PipelineError> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = self.pending.iter().map(|t| t.id.clone()).collect();
        let results = match client.audio_features(&ids).await {
            Ok(results) => results,
            Err(source) => {
                // these tracks stay unresolved for this run; the group is
                // dropped so the next batch starts clean
                let tracks = std::mem::take(&mut self.pending);
                return Err(PipelineError::FeatureFetch { source, tracks });
            }
        };

        // positional correspondence with the id list; a null result is
        // cached as an explicit negative marker and never re-fetched
        for (track, features) in self.pending.iter().zip(results.into_iter()) {
            self.features.put(track.id.clone(), features);
        }

        // write-through: the fetched entries hit disk before evaluation, so
        // a crash later in the run cannot lose already-paid API cost
        if let Err(e) = self.features.persist().await {
            warning!("Cannot persist audio-feature cache: {}", e);
        }

        let tracks = std::mem::take(&mut self.pending);
        let mut enriched = Vec::with_capacity(tracks.len());
        for track in tracks {
            enriched.push(self.build_enriched(client, track).await);
        }

        Ok(enriched)
    }

    async fn build_enriched<C: MusicService>(
        &mut self,
        client: &mut C,
        track: Track,
    ) -> EnrichedTrack {
        let features = self.features.get(&track.id).cloned().flatten();
        let artist = self.resolve_artist(client, &track).await;

        EnrichedTrack {
            track,
            features,
            artist,
        }
    }

    /// Resolves the primary artist from cache or one remote call. A track
    /// without an artist id, or a failed fetch, degrades to `None`; rule
    /// evaluation treats that as "no genre tags".
    async fn resolve_artist<C: MusicService>(
        &mut self,
        client: &mut C,
        track: &Track,
    ) -> Option<Artist> {
        let artist_id = track.primary_artist()?.id.clone();

        if let Some(artist) = self.artists.get(&artist_id) {
            return Some(artist.clone());
        }

        match client.artist(&artist_id).await {
            Ok(artist) => {
                self.artists.put(artist_id, artist.clone());
                if let Err(e) = self.artists.persist().await {
                    warning!("Cannot persist artist cache: {}", e);
                }
                Some(artist)
            }
            Err(e) => {
                warning!("Failed to fetch artist {}: {}", artist_id, e);
                None
            }
        }
    }
}
