use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Spotify URI form expected by the add-items endpoint.
pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}

/// Joins genre tags for table output, truncating long lists.
pub fn format_genres(genres: &[String], max: usize) -> String {
    let mut joined = genres
        .iter()
        .take(max)
        .cloned()
        .collect::<Vec<String>>()
        .join(", ");
    if genres.len() > max {
        joined.push_str(", ...");
    }
    joined
}
