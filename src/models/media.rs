use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Numeric catalog identifier of a movie or TV show
pub type MediaId = u64;

/// Kind of catalog entry a user interacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the catalog API
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document id shared by watchlist entries and favorites: `{userId}_{mediaId}`
pub fn user_media_key(user_id: &str, media_id: MediaId) -> String {
    format!("{}_{}", user_id, media_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_serialization() {
        assert_eq!(serde_json::to_string(&MediaType::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");

        let parsed: MediaType = serde_json::from_str("\"tv\"").unwrap();
        assert_eq!(parsed, MediaType::Tv);
    }

    #[test]
    fn test_user_media_key() {
        assert_eq!(user_media_key("uid-42", 603), "uid-42_603");
    }
}
