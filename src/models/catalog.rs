use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaId, MediaType};

/// Highest page number the catalog will serve
pub const MAX_TOTAL_PAGES: u32 = 500;

/// Curated catalog listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Popular,
    TopRated,
    /// Movies now in theaters, or TV shows currently airing
    NowPlaying,
}

impl ListKind {
    /// Catalog endpoint segment for this listing
    pub fn path_segment(&self, media_type: MediaType) -> &'static str {
        match (self, media_type) {
            (ListKind::Popular, _) => "popular",
            (ListKind::TopRated, _) => "top_rated",
            (ListKind::NowPlaying, MediaType::Movie) => "now_playing",
            (ListKind::NowPlaying, MediaType::Tv) => "on_the_air",
        }
    }
}

/// Optional narrowing for discover queries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscoverFilter {
    pub genre: Option<u32>,
    pub year: Option<i32>,
    /// ISO 3166-1 code, e.g. "KR"
    pub country: Option<String>,
}

/// A page of catalog results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
}

/// Movie or TV show as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaSummary {
    pub id: MediaId,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Release date for movies, first air date for TV
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<u32>,
    pub popularity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionRef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    pub file_path: String,
    pub width: u32,
    pub height: u32,
}

/// Full detail view of a movie or TV show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetails {
    pub id: MediaId,
    pub media_type: MediaType,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub belongs_to_collection: Option<CollectionRef>,
    pub credits: Credits,
    pub videos: Vec<Video>,
    pub backdrops: Vec<ImageRef>,
    pub recommendations: Vec<MediaSummary>,
    pub similar: Vec<MediaSummary>,
}

/// Review published on the catalog itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalReview {
    pub id: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author_details: AuthorDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorDetails {
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonCastCredit {
    pub id: MediaId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonCrewCredit {
    pub id: MediaId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonCredits {
    #[serde(default)]
    pub cast: Vec<PersonCastCredit>,
    #[serde(default)]
    pub crew: Vec<PersonCrewCredit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub movie_credits: PersonCredits,
}

/// A movie franchise and its parts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieCollection {
    pub id: u64,
    pub name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub parts: Vec<MediaSummary>,
}

// ============================================================================
// Catalog API wire types
// ============================================================================

/// Paged response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPage<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Non-paged `{ "results": [...] }` envelope used by appended sub-resources
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for ApiResults<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

/// Movie or TV listing item. Movies carry `title`/`release_date`, TV
/// carries `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMedia {
    pub id: MediaId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub adult: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiImages {
    #[serde(default)]
    pub backdrops: Vec<ImageRef>,
}

/// Details response with `append_to_response` sub-resources
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMediaDetails {
    pub id: MediaId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub belongs_to_collection: Option<CollectionRef>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: ApiResults<Video>,
    #[serde(default)]
    pub images: ApiImages,
    #[serde(default)]
    pub recommendations: ApiResults<ApiMedia>,
    #[serde(default)]
    pub similar: ApiResults<ApiMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCollection {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub parts: Vec<ApiMedia>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_kind_path_segment_depends_on_media_type() {
        assert_eq!(ListKind::NowPlaying.path_segment(MediaType::Movie), "now_playing");
        assert_eq!(ListKind::NowPlaying.path_segment(MediaType::Tv), "on_the_air");
        assert_eq!(ListKind::TopRated.path_segment(MediaType::Tv), "top_rated");
    }

    #[test]
    fn test_api_media_movie_deserialization() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "overview": "Cobb steals secrets",
            "poster_path": "/inception.jpg",
            "backdrop_path": null,
            "release_date": "2010-07-15",
            "vote_average": 8.4,
            "genre_ids": [28, 878],
            "adult": false
        }"#;

        let media: ApiMedia = serde_json::from_str(json).unwrap();
        assert_eq!(media.id, 27205);
        assert_eq!(media.title.as_deref(), Some("Inception"));
        assert_eq!(media.name, None);
        assert_eq!(media.genre_ids, vec![28, 878]);
    }

    #[test]
    fn test_external_review_deserialization() {
        let json = r#"{
            "id": "5b8b0b7b",
            "author": "Gimly",
            "content": "Great film.",
            "created_at": "2017-02-13T23:16:19.538Z",
            "author_details": { "rating": null }
        }"#;

        let review: ExternalReview = serde_json::from_str(json).unwrap();
        assert_eq!(review.author, "Gimly");
        assert_eq!(review.author_details.rating, None);
    }

    #[test]
    fn test_details_missing_appended_sections_default_empty() {
        let json = r#"{ "id": 1399, "name": "Game of Thrones", "number_of_episodes": 73 }"#;

        let details: ApiMediaDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.number_of_episodes, Some(73));
        assert!(details.credits.cast.is_empty());
        assert!(details.videos.results.is_empty());
        assert!(details.images.backdrops.is_empty());
    }
}
