use std::{collections::HashMap, path::PathBuf};

use crate::{management::CacheError, types::Artist};

/// Persistent map from artist id to artist name and genre tags. Entries are
/// immutable once written.
pub struct ArtistCacheManager {
    entries: HashMap<String, Artist>,
    path: PathBuf,
}

impl ArtistCacheManager {
    pub fn new() -> Self {
        Self::at_path(Self::cache_path())
    }

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
        let entries: HashMap<String, Artist> = serde_json::from_str(&content)?;
        Ok(Self { entries, path })
    }

    pub fn get(&self, artist_id: &str) -> Option<&Artist> {
        self.entries.get(artist_id)
    }

    pub fn put(&mut self, artist_id: String, artist: Artist) {
        self.entries.insert(artist_id, artist);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the full mapping to disk via temp-file-then-rename.
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
        path.push("curacli/cache/artists.json");
        path
    }
}
