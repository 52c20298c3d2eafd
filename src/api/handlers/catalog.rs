use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        DiscoverFilter, ListKind, MediaDetails, MediaId, MediaSummary, MediaType,
        MovieCollection, Page, Person, PersonSummary,
    },
    services::CatalogProvider,
};

type Catalog = State<Arc<dyn CatalogProvider>>;

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    genre: Option<u32>,
    year: Option<i32>,
    country: Option<String>,
    #[serde(default = "first_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "first_page")]
    page: u32,
}

pub async fn list(
    State(catalog): Catalog,
    Path((media_type, kind)): Path<(MediaType, ListKind)>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<Page<MediaSummary>>> {
    let page = catalog.list(kind, media_type, params.page).await?;
    Ok(Json(page))
}

pub async fn discover(
    State(catalog): Catalog,
    Path(media_type): Path<MediaType>,
    Query(params): Query<DiscoverQuery>,
) -> AppResult<Json<Page<MediaSummary>>> {
    let filter = DiscoverFilter {
        genre: params.genre,
        year: params.year,
        country: params.country,
    };
    let page = catalog.discover(media_type, &filter, params.page).await?;
    Ok(Json(page))
}

/// Handler for title search endpoint
pub async fn search(
    State(catalog): Catalog,
    Path(media_type): Path<MediaType>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Page<MediaSummary>>> {
    let results = catalog.search(media_type, &params.q, params.page).await?;
    Ok(Json(results))
}

pub async fn search_people(
    State(catalog): Catalog,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<PersonSummary>>> {
    let people = catalog.search_people(&params.q).await?;
    Ok(Json(people))
}

pub async fn details(
    State(catalog): Catalog,
    Path((media_type, media_id)): Path<(MediaType, MediaId)>,
) -> AppResult<Json<MediaDetails>> {
    let details = catalog.details(media_id, media_type).await?;
    Ok(Json(details))
}

pub async fn recommendations(
    State(catalog): Catalog,
    Path((media_type, media_id)): Path<(MediaType, MediaId)>,
) -> AppResult<Json<Vec<MediaSummary>>> {
    let titles = catalog.recommendations(media_id, media_type).await?;
    Ok(Json(titles))
}

pub async fn person(
    State(catalog): Catalog,
    Path(person_id): Path<u64>,
) -> AppResult<Json<Person>> {
    Ok(Json(catalog.person(person_id).await?))
}

pub async fn collection(
    State(catalog): Catalog,
    Path(collection_id): Path<u64>,
) -> AppResult<Json<MovieCollection>> {
    Ok(Json(catalog.collection(collection_id).await?))
}
