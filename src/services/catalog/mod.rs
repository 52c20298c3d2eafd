//! Movie and TV catalog abstraction
//!
//! Catalog data (listings, details, people, collections and published
//! reviews) comes from a third-party API. Handlers and the review merge only
//! see this trait, so tests can swap in a fake.
use crate::{
    error::AppResult,
    models::{
        DiscoverFilter, ExternalReview, ListKind, MediaDetails, MediaId, MediaSummary, MediaType,
        MovieCollection, Page, Person, PersonSummary,
    },
};

pub mod tmdb;

pub use tmdb::{ImageUrls, TmdbProvider};

/// Read-only catalog source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Curated listing such as popular or top rated
    async fn list(
        &self,
        kind: ListKind,
        media_type: MediaType,
        page: u32,
    ) -> AppResult<Page<MediaSummary>>;

    /// Popularity-sorted browse narrowed by genre, year or origin country
    async fn discover(
        &self,
        media_type: MediaType,
        filter: &DiscoverFilter,
        page: u32,
    ) -> AppResult<Page<MediaSummary>>;

    /// Free-text title search. An empty query is `InvalidInput`.
    async fn search(
        &self,
        media_type: MediaType,
        query: &str,
        page: u32,
    ) -> AppResult<Page<MediaSummary>>;

    async fn search_people(&self, query: &str) -> AppResult<Vec<PersonSummary>>;

    /// Full details with credits, videos, images, recommendations and similar titles
    async fn details(&self, media_id: MediaId, media_type: MediaType) -> AppResult<MediaDetails>;

    /// First page of reviews published on the catalog
    async fn reviews(
        &self,
        media_id: MediaId,
        media_type: MediaType,
    ) -> AppResult<Vec<ExternalReview>>;

    async fn recommendations(
        &self,
        media_id: MediaId,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaSummary>>;

    async fn person(&self, person_id: u64) -> AppResult<Person>;

    async fn collection(&self, collection_id: u64) -> AppResult<MovieCollection>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
