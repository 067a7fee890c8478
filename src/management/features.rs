use std::{collections::HashMap, path::PathBuf};

use crate::{management::CacheError, types::AudioFeatures};

/// Persistent map from track id to its audio features.
///
/// An entry holding `None` is an explicit negative marker: the remote
/// service has no analysis for that track, and the id must not be fetched
/// again on later runs. Entries are immutable once written.
pub struct FeatureCacheManager {
    entries: HashMap<String, Option<AudioFeatures>>,
    path: PathBuf,
}

impl FeatureCacheManager {
    pub fn new() -> Self {
        Self::at_path(Self::cache_path())
    }

    /// An empty cache persisted at `path`. Tests use this to keep cache
    /// files out of the user's data directory.
    pub fn at_path(path: PathBuf) -> Self {
        Self {
            entries: HashMap::new(),
            path,
        }
    }

    pub async fn load() -> Result<Self, CacheError> {
        Self::load_from(Self::cache_path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, CacheError> {
        let content = async_fs::read_to_string(&path).await?;
        let entries: HashMap<String, Option<AudioFeatures>> = serde_json::from_str(&content)?;
        Ok(Self { entries, path })
    }

    pub fn get(&self, track_id: &str) -> Option<&Option<AudioFeatures>> {
        self.entries.get(track_id)
    }

    pub fn put(&mut self, track_id: String, features: Option<AudioFeatures>) {
        self.entries.insert(track_id, features);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of explicit "no analysis available" markers.
    pub fn negative_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_none()).count()
    }

    /// Writes the full mapping to disk. The write goes to a temp file first
    /// and is renamed into place, so a crash mid-write cannot truncate the
    /// existing store.
    pub async fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        async_fs::remove_file(&self.path).await?;
        Ok(())
    }

    fn cache_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("curacli/cache/audio-features.json");
        path
    }
}
