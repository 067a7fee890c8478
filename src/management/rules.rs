use std::path::PathBuf;

use crate::{management::CacheError, rules::RuleSpec};

/// Loads the playlist rule specifications from `curacli/rules.json`.
///
/// Which playlists exist is configuration, not code: the file holds a JSON
/// list of rule records (see `rules.example.json`). When the file is
/// missing the built-in default set is used instead.
pub struct RulesManager {
    specs: Vec<RuleSpec>,
}

impl RulesManager {
    pub async fn load() -> Result<Self, CacheError> {
        Self::load_from(Self::rules_path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, CacheError> {
        let content = async_fs::read_to_string(&path).await?;
        let specs: Vec<RuleSpec> = serde_json::from_str(&content)?;
        Ok(Self { specs })
    }

    pub fn defaults() -> Self {
        let pop_genres = [
            "pop",
            "funk",
            "synth",
            "indie",
            "disco",
            "r&b",
            "electronica",
            "soul",
            "girl group",
            "game",
            "multidisciplinary",
            "twitch",
        ];

        Self {
            specs: vec![
                RuleSpec {
                    max_energy: Some(0.5),
                    genres: pop_genres.iter().map(|g| g.to_string()).collect(),
                    ..RuleSpec::named("Low Energy Pop")
                },
                RuleSpec {
                    min_energy: Some(0.5),
                    genres: pop_genres.iter().map(|g| g.to_string()).collect(),
                    ..RuleSpec::named("High Energy Pop")
                },
                RuleSpec {
                    genres: vec![
                        "rock".to_string(),
                        "metal".to_string(),
                        "slayer".to_string(),
                    ],
                    ..RuleSpec::named("Rock & Metal")
                },
                RuleSpec {
                    min_acousticness: Some(0.8),
                    ..RuleSpec::named("Acoustic")
                },
                RuleSpec {
                    min_danceability: Some(0.8),
                    ..RuleSpec::named("Dance")
                },
                RuleSpec {
                    min_instrumentalness: Some(0.8),
                    ..RuleSpec::named("Instrumental")
                },
                RuleSpec {
                    max_energy: Some(0.5),
                    ..RuleSpec::named("Low Energy")
                },
                RuleSpec {
                    min_energy: Some(0.5),
                    ..RuleSpec::named("High Energy")
                },
            ],
        }
    }

    pub fn specs(&self) -> &[RuleSpec] {
        &self.specs
    }

    pub fn into_specs(self) -> Vec<RuleSpec> {
        self.specs
    }

    pub fn count(&self) -> usize {
        self.specs.len()
    }

    fn rules_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("curacli/rules.json");
        path
    }
}
