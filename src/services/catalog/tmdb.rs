//! TMDB catalog provider
//!
//! Every request carries `api_key` and `language=en-US`. Results are mapped
//! into catalog models with absolute image URLs, adult titles dropped and
//! `total_pages` capped at the API's own page limit, then cached in Redis.
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ApiCollection, ApiMedia, ApiMediaDetails, ApiPage, CastMember, CrewMember,
        DiscoverFilter, ExternalReview, ListKind, MediaDetails, MediaId, MediaSummary, MediaType,
        MovieCollection, Page, Person, PersonSummary, MAX_TOTAL_PAGES,
    },
    services::catalog::CatalogProvider,
};

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const LANGUAGE: &str = "en-US";

/// Base URLs that relative image paths are joined onto
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUrls {
    pub poster_base: String,
    pub backdrop_base: String,
}

impl ImageUrls {
    pub fn new(poster_base: impl Into<String>, backdrop_base: impl Into<String>) -> Self {
        Self {
            poster_base: poster_base.into(),
            backdrop_base: backdrop_base.into(),
        }
    }

    fn poster(&self, path: Option<String>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.poster_base, p))
    }

    fn backdrop(&self, path: Option<String>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.backdrop_base, p))
    }

    /// Listing item to summary. Movies and TV name their title and date
    /// fields differently.
    fn summary(&self, media: ApiMedia, media_type: MediaType) -> MediaSummary {
        let (title, date) = match media_type {
            MediaType::Movie => (
                media.title.or(media.name),
                media.release_date.or(media.first_air_date),
            ),
            MediaType::Tv => (
                media.name.or(media.title),
                media.first_air_date.or(media.release_date),
            ),
        };

        MediaSummary {
            id: media.id,
            media_type,
            title: title.unwrap_or_default(),
            overview: media.overview.unwrap_or_default(),
            poster_path: self.poster(media.poster_path),
            backdrop_path: self.backdrop(media.backdrop_path),
            release_date: date.filter(|d| !d.is_empty()),
            vote_average: media.vote_average,
            genre_ids: media.genre_ids,
            popularity: media.popularity,
        }
    }

    fn summaries(&self, items: Vec<ApiMedia>, media_type: MediaType) -> Vec<MediaSummary> {
        items
            .into_iter()
            .filter(|m| !m.adult)
            .map(|m| self.summary(m, media_type))
            .collect()
    }

    fn page(&self, page: ApiPage<ApiMedia>, media_type: MediaType) -> Page<MediaSummary> {
        Page {
            page: page.page,
            results: self.summaries(page.results, media_type),
            total_pages: page.total_pages.min(MAX_TOTAL_PAGES),
        }
    }

    fn details(&self, d: ApiMediaDetails, media_type: MediaType) -> MediaDetails {
        let (title, date) = match media_type {
            MediaType::Movie => (d.title.or(d.name), d.release_date.or(d.first_air_date)),
            MediaType::Tv => (d.name.or(d.title), d.first_air_date.or(d.release_date)),
        };

        let mut credits = d.credits;
        credits.cast = credits
            .cast
            .into_iter()
            .map(|c| CastMember {
                profile_path: self.poster(c.profile_path),
                ..c
            })
            .collect();
        credits.crew = credits
            .crew
            .into_iter()
            .map(|c| CrewMember {
                profile_path: self.poster(c.profile_path),
                ..c
            })
            .collect();

        let belongs_to_collection = d.belongs_to_collection.map(|mut c| {
            c.poster_path = self.poster(c.poster_path.take());
            c.backdrop_path = self.backdrop(c.backdrop_path.take());
            c
        });

        let backdrops = d
            .images
            .backdrops
            .into_iter()
            .map(|mut image| {
                image.file_path = format!("{}{}", self.backdrop_base, image.file_path);
                image
            })
            .collect();

        MediaDetails {
            id: d.id,
            media_type,
            title: title.unwrap_or_default(),
            tagline: d.tagline.filter(|t| !t.is_empty()),
            overview: d.overview.unwrap_or_default(),
            poster_path: self.poster(d.poster_path),
            backdrop_path: self.backdrop(d.backdrop_path),
            release_date: date.filter(|r| !r.is_empty()),
            vote_average: d.vote_average,
            genres: d.genres,
            runtime: d.runtime,
            number_of_seasons: d.number_of_seasons,
            number_of_episodes: d.number_of_episodes,
            belongs_to_collection,
            credits,
            videos: d.videos.results,
            backdrops,
            recommendations: self.summaries(d.recommendations.results, media_type),
            similar: self.summaries(d.similar.results, media_type),
        }
    }

    fn person(&self, mut person: Person) -> Person {
        person.profile_path = self.poster(person.profile_path.take());
        for credit in &mut person.movie_credits.cast {
            credit.poster_path = self.poster(credit.poster_path.take());
        }
        for credit in &mut person.movie_credits.crew {
            credit.poster_path = self.poster(credit.poster_path.take());
        }
        person
    }

    fn person_summary(&self, mut person: PersonSummary) -> PersonSummary {
        person.profile_path = self.poster(person.profile_path.take());
        person
    }

    fn collection(&self, c: ApiCollection) -> MovieCollection {
        MovieCollection {
            id: c.id,
            name: c.name,
            overview: c.overview.unwrap_or_default(),
            poster_path: self.poster(c.poster_path),
            backdrop_path: self.backdrop(c.backdrop_path),
            parts: self.summaries(c.parts, MediaType::Movie),
        }
    }
}

/// Query parameters for a discover request
fn discover_params(
    media_type: MediaType,
    filter: &DiscoverFilter,
    page: u32,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("sort_by", "popularity.desc".to_string()),
        ("include_adult", "false".to_string()),
        ("page", page.to_string()),
    ];

    if let Some(genre) = filter.genre {
        params.push(("with_genres", genre.to_string()));
    }
    if let Some(year) = filter.year {
        let field = match media_type {
            MediaType::Movie => "primary_release_year",
            MediaType::Tv => "first_air_date_year",
        };
        params.push((field, year.to_string()));
    }
    if let Some(country) = filter.country.as_deref().filter(|c| !c.is_empty()) {
        params.push(("with_origin_country", country.to_uppercase()));
    }

    params
}

fn clamp_page(page: u32) -> u32 {
    page.clamp(1, MAX_TOTAL_PAGES)
}

fn require_query(query: &str) -> AppResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    Ok(query)
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    images: ImageUrls,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, images: ImageUrls) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            images,
            cache,
        }
    }

    /// GET `{api_url}/{path}` with the common parameters plus `params`
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {} for {}: {}",
                status, path, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                "Failed to deserialize catalog response"
            );
            AppError::ExternalApi(format!("Failed to parse catalog response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn list(
        &self,
        kind: ListKind,
        media_type: MediaType,
        page: u32,
    ) -> AppResult<Page<MediaSummary>> {
        let page = clamp_page(page);
        let path = format!("{}/{}", media_type, kind.path_segment(media_type));

        cached!(
            self.cache,
            CacheKey::Catalog(format!("{}?page={}", path, page)),
            LIST_CACHE_TTL,
            async {
                let raw: ApiPage<ApiMedia> =
                    self.fetch(&path, &[("page", page.to_string())]).await?;
                let listing = self.images.page(raw, media_type);

                tracing::info!(
                    path = %path,
                    page,
                    results = listing.results.len(),
                    provider = self.name(),
                    "Catalog list fetched"
                );

                Ok::<_, AppError>(listing)
            }
        )
    }

    async fn discover(
        &self,
        media_type: MediaType,
        filter: &DiscoverFilter,
        page: u32,
    ) -> AppResult<Page<MediaSummary>> {
        let params = discover_params(media_type, filter, clamp_page(page));
        let path = format!("discover/{}", media_type);
        let key_params: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();

        cached!(
            self.cache,
            CacheKey::Catalog(format!("{}?{}", path, key_params.join("&"))),
            LIST_CACHE_TTL,
            async {
                let raw: ApiPage<ApiMedia> = self.fetch(&path, &params).await?;
                Ok::<_, AppError>(self.images.page(raw, media_type))
            }
        )
    }

    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
        page: u32,
    ) -> AppResult<Page<MediaSummary>> {
        let query = require_query(query)?;
        let page = clamp_page(page);

        cached!(
            self.cache,
            CacheKey::CatalogSearch(format!("{}:{}:{}", media_type, query, page)),
            LIST_CACHE_TTL,
            async {
                let raw: ApiPage<ApiMedia> = self
                    .fetch(
                        &format!("search/{}", media_type),
                        &[
                            ("query", query.to_string()),
                            ("page", page.to_string()),
                            ("include_adult", "false".to_string()),
                        ],
                    )
                    .await?;
                let results = self.images.page(raw, media_type);

                tracing::info!(
                    query = %query,
                    results = results.results.len(),
                    provider = self.name(),
                    "Title search completed"
                );

                Ok::<_, AppError>(results)
            }
        )
    }

    async fn search_people(&self, query: &str) -> AppResult<Vec<PersonSummary>> {
        let query = require_query(query)?;

        cached!(
            self.cache,
            CacheKey::CatalogSearch(format!("person:{}", query)),
            LIST_CACHE_TTL,
            async {
                let raw: ApiPage<PersonSummary> = self
                    .fetch(
                        "search/person",
                        &[
                            ("query", query.to_string()),
                            ("include_adult", "false".to_string()),
                        ],
                    )
                    .await?;

                Ok::<_, AppError>(
                    raw.results
                        .into_iter()
                        .map(|p| self.images.person_summary(p))
                        .collect::<Vec<_>>(),
                )
            }
        )
    }

    async fn details(&self, media_id: MediaId, media_type: MediaType) -> AppResult<MediaDetails> {
        let path = format!("{}/{}", media_type, media_id);

        cached!(
            self.cache,
            CacheKey::Catalog(path.clone()),
            DETAILS_CACHE_TTL,
            async {
                let raw: ApiMediaDetails = self
                    .fetch(
                        &path,
                        &[
                            (
                                "append_to_response",
                                "credits,videos,images,recommendations,similar".to_string(),
                            ),
                            ("include_image_language", "en,null".to_string()),
                        ],
                    )
                    .await?;

                tracing::info!(media_id, media_type = %media_type, "Catalog details fetched");

                Ok::<_, AppError>(self.images.details(raw, media_type))
            }
        )
    }

    async fn reviews(
        &self,
        media_id: MediaId,
        media_type: MediaType,
    ) -> AppResult<Vec<ExternalReview>> {
        let path = format!("{}/{}/reviews", media_type, media_id);

        cached!(
            self.cache,
            CacheKey::Catalog(path.clone()),
            LIST_CACHE_TTL,
            async {
                let raw: ApiPage<ExternalReview> =
                    self.fetch(&path, &[("page", "1".to_string())]).await?;
                Ok::<_, AppError>(raw.results)
            }
        )
    }

    async fn recommendations(
        &self,
        media_id: MediaId,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaSummary>> {
        let path = format!("{}/{}/recommendations", media_type, media_id);

        cached!(
            self.cache,
            CacheKey::Catalog(path.clone()),
            LIST_CACHE_TTL,
            async {
                let raw: ApiPage<ApiMedia> = self.fetch(&path, &[]).await?;
                Ok::<_, AppError>(self.images.summaries(raw.results, media_type))
            }
        )
    }

    async fn person(&self, person_id: u64) -> AppResult<Person> {
        let path = format!("person/{}", person_id);

        cached!(
            self.cache,
            CacheKey::Catalog(path.clone()),
            DETAILS_CACHE_TTL,
            async {
                let raw: Person = self
                    .fetch(&path, &[("append_to_response", "movie_credits".to_string())])
                    .await?;
                Ok::<_, AppError>(self.images.person(raw))
            }
        )
    }

    async fn collection(&self, collection_id: u64) -> AppResult<MovieCollection> {
        let path = format!("collection/{}", collection_id);

        cached!(
            self.cache,
            CacheKey::Catalog(path.clone()),
            DETAILS_CACHE_TTL,
            async {
                let raw: ApiCollection = self.fetch(&path, &[]).await?;
                Ok::<_, AppError>(self.images.collection(raw))
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiImages, ApiResults, CollectionRef, Credits, ImageRef};

    fn images() -> ImageUrls {
        ImageUrls::new("https://img/w500", "https://img/original")
    }

    fn api_media(id: MediaId, adult: bool) -> ApiMedia {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Movie {}", id),
            "poster_path": "/p.jpg",
            "backdrop_path": "",
            "release_date": "",
            "vote_average": 7.5,
            "adult": adult
        }))
        .unwrap()
    }

    #[test]
    fn test_page_filters_adult_and_caps_total_pages() {
        let raw = ApiPage {
            page: 3,
            results: vec![api_media(1, false), api_media(2, true), api_media(3, false)],
            total_pages: 38_000,
        };

        let page = images().page(raw, MediaType::Movie);

        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, MAX_TOTAL_PAGES);
        let ids: Vec<MediaId> = page.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_summary_expands_paths_and_drops_empty_values() {
        let summary = images().summary(api_media(1, false), MediaType::Movie);

        assert_eq!(summary.poster_path.as_deref(), Some("https://img/w500/p.jpg"));
        assert_eq!(summary.backdrop_path, None);
        assert_eq!(summary.release_date, None);
        assert_eq!(summary.title, "Movie 1");
    }

    #[test]
    fn test_tv_summary_uses_name_and_first_air_date() {
        let raw: ApiMedia = serde_json::from_value(serde_json::json!({
            "id": 1399,
            "name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "vote_average": 8.4
        }))
        .unwrap();

        let summary = images().summary(raw, MediaType::Tv);

        assert_eq!(summary.title, "Game of Thrones");
        assert_eq!(summary.release_date.as_deref(), Some("2011-04-17"));
        assert_eq!(summary.media_type, MediaType::Tv);
    }

    #[test]
    fn test_details_expand_nested_images() {
        let raw = ApiMediaDetails {
            id: 10,
            title: Some("Star Wars".to_string()),
            name: None,
            tagline: Some(String::new()),
            overview: None,
            poster_path: Some("/sw.jpg".to_string()),
            backdrop_path: None,
            release_date: Some("1977-05-25".to_string()),
            first_air_date: None,
            vote_average: 8.2,
            genres: vec![],
            runtime: Some(121),
            number_of_seasons: None,
            number_of_episodes: None,
            belongs_to_collection: Some(CollectionRef {
                id: 10,
                name: "Star Wars Collection".to_string(),
                poster_path: Some("/c.jpg".to_string()),
                backdrop_path: None,
            }),
            credits: Credits {
                cast: vec![CastMember {
                    id: 2,
                    name: "Mark Hamill".to_string(),
                    character: "Luke".to_string(),
                    profile_path: Some("/mh.jpg".to_string()),
                }],
                crew: vec![],
            },
            videos: ApiResults::default(),
            images: ApiImages {
                backdrops: vec![ImageRef {
                    file_path: "/b1.jpg".to_string(),
                    width: 1920,
                    height: 1080,
                }],
            },
            recommendations: ApiResults {
                results: vec![api_media(11, false), api_media(12, true)],
            },
            similar: ApiResults::default(),
        };

        let details = images().details(raw, MediaType::Movie);

        assert_eq!(details.tagline, None);
        assert_eq!(
            details.credits.cast[0].profile_path.as_deref(),
            Some("https://img/w500/mh.jpg")
        );
        assert_eq!(
            details.belongs_to_collection.unwrap().poster_path.as_deref(),
            Some("https://img/w500/c.jpg")
        );
        assert_eq!(details.backdrops[0].file_path, "https://img/original/b1.jpg");
        assert_eq!(details.recommendations.len(), 1);
    }

    #[test]
    fn test_discover_params_by_media_type() {
        let filter = DiscoverFilter {
            genre: Some(18),
            year: Some(2019),
            country: Some("kr".to_string()),
        };

        let movie = discover_params(MediaType::Movie, &filter, 2);
        assert!(movie.contains(&("primary_release_year", "2019".to_string())));
        assert!(movie.contains(&("with_origin_country", "KR".to_string())));
        assert!(movie.contains(&("with_genres", "18".to_string())));
        assert!(movie.contains(&("page", "2".to_string())));

        let tv = discover_params(MediaType::Tv, &filter, 1);
        assert!(tv.contains(&("first_air_date_year", "2019".to_string())));
    }

    #[test]
    fn test_discover_params_without_filter() {
        let params = discover_params(MediaType::Movie, &DiscoverFilter::default(), 1);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(require_query("   "), Err(AppError::InvalidInput(_))));
        assert_eq!(require_query(" dune ").unwrap(), "dune");
    }

    #[test]
    fn test_page_clamped_to_catalog_range() {
        assert_eq!(clamp_page(0), 1);
        assert_eq!(clamp_page(42), 42);
        assert_eq!(clamp_page(900), MAX_TOTAL_PAGES);
    }
}
