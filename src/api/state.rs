use axum::extract::FromRef;
use chrono::Duration;
use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    db::{DocumentStore, MemoryDocumentStore, MemoryStatusCache, StatusCache},
    services::{
        CatalogProvider, FavoritesStore, Recommender, ReviewStore, ViewTracker, WatchlistStore,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub views: ViewTracker,
    pub watchlist: WatchlistStore,
    pub favorites: FavoritesStore,
    pub reviews: ReviewStore,
    pub recommender: Recommender,
}

impl AppState {
    /// Wires every store onto one document store, status cache and clock
    pub fn new(
        store: Arc<dyn DocumentStore>,
        status_cache: Arc<dyn StatusCache>,
        catalog: Arc<dyn CatalogProvider>,
        clock: Arc<dyn Clock>,
        view_cooldown: Duration,
    ) -> Self {
        let watchlist = WatchlistStore::new(store.clone(), status_cache.clone(), clock.clone());
        let favorites = FavoritesStore::new(store.clone(), status_cache, clock.clone());

        Self {
            views: ViewTracker::new(store.clone(), clock.clone(), view_cooldown),
            recommender: Recommender::new(favorites.clone(), watchlist.clone(), catalog.clone()),
            reviews: ReviewStore::new(store, catalog.clone(), clock),
            watchlist,
            favorites,
            catalog,
        }
    }

    /// Process-local state with nothing persisted, for development and tests
    pub fn in_memory(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self::in_memory_with_clock(catalog, Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(catalog: Arc<dyn CatalogProvider>, clock: Arc<dyn Clock>) -> Self {
        let status_cache = MemoryStatusCache::new(10_000, Duration::hours(1), clock.clone());
        Self::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(status_cache),
            catalog,
            clock,
            Duration::minutes(30),
        )
    }
}

impl FromRef<AppState> for Arc<dyn CatalogProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}

impl FromRef<AppState> for ViewTracker {
    fn from_ref(state: &AppState) -> Self {
        state.views.clone()
    }
}

impl FromRef<AppState> for WatchlistStore {
    fn from_ref(state: &AppState) -> Self {
        state.watchlist.clone()
    }
}

impl FromRef<AppState> for FavoritesStore {
    fn from_ref(state: &AppState) -> Self {
        state.favorites.clone()
    }
}

impl FromRef<AppState> for ReviewStore {
    fn from_ref(state: &AppState) -> Self {
        state.reviews.clone()
    }
}

impl FromRef<AppState> for Recommender {
    fn from_ref(state: &AppState) -> Self {
        state.recommender.clone()
    }
}
