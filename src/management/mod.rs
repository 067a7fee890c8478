//! Persistent local state: OAuth tokens, the audio-feature and artist
//! caches, and the rule-spec configuration.
//!
//! Everything lives as pretty-printed JSON under `<data_local_dir>/curacli/`.
//! Caches are write-through: they are persisted right after each batch of
//! new entries, so a crash mid-run loses at most the entries still in
//! flight. A missing or corrupt file on load degrades to an empty store; a
//! cache is an optimization, not a correctness dependency.

use std::fmt;

mod artist;
mod auth;
mod features;
mod rules;

pub use artist::ArtistCacheManager;
pub use auth::TokenManager;
pub use features::FeatureCacheManager;
pub use rules::RulesManager;

#[derive(Debug)]
pub enum CacheError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io(err) => write!(f, "cache io error: {}", err),
            CacheError::Serde(err) => write!(f, "cache serde error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serde(err)
    }
}
