use crate::{
    info,
    management::{ArtistCacheManager, FeatureCacheManager},
    success, warning,
};

/// Shows cache statistics, or wipes both caches with `--clear`.
///
/// Clearing also removes the explicit "no analysis available" markers, so
/// the next run re-fetches features for tracks that had none; remote
/// analysis may have become available in the meantime.
pub async fn cache(clear: bool) {
    if clear {
        match FeatureCacheManager::load().await {
            Ok(mut features) => match features.clear().await {
                Ok(_) => success!("Audio-feature cache cleared."),
                Err(e) => warning!("Cannot clear audio-feature cache: {}", e),
            },
            Err(_) => info!("Audio-feature cache already empty."),
        }

        match ArtistCacheManager::load().await {
            Ok(mut artists) => match artists.clear().await {
                Ok(_) => success!("Artist cache cleared."),
                Err(e) => warning!("Cannot clear artist cache: {}", e),
            },
            Err(_) => info!("Artist cache already empty."),
        }

        return;
    }

    match FeatureCacheManager::load().await {
        Ok(features) => info!(
            "Audio features: {} cached tracks ({} without analysis).",
            features.len(),
            features.negative_count()
        ),
        Err(_) => info!("Audio features: cache empty."),
    }

    match ArtistCacheManager::load().await {
        Ok(artists) => info!("Artists: {} cached.", artists.len()),
        Err(_) => info!("Artists: cache empty."),
    }
}
