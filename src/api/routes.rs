use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{catalog, favorites, profile, recommendations, reviews, views, watchlist};
use super::{handlers, AppState};
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/catalog/people/search", get(catalog::search_people))
        .route("/catalog/people/:person_id", get(catalog::person))
        .route("/catalog/collections/:collection_id", get(catalog::collection))
        .route("/catalog/:media_type/lists/:kind", get(catalog::list))
        .route("/catalog/:media_type/discover", get(catalog::discover))
        .route("/catalog/:media_type/search", get(catalog::search))
        .route("/catalog/:media_type/:media_id", get(catalog::details))
        .route(
            "/catalog/:media_type/:media_id/recommendations",
            get(catalog::recommendations),
        )
        .route("/media/:media_type/:media_id/reviews", get(reviews::merged))
        // Views
        .route("/users/:user_id/views", post(views::record))
        .route("/users/:user_id/views/stats", get(views::stats))
        // Watchlist
        .route(
            "/users/:user_id/watchlist",
            get(watchlist::list).post(watchlist::add),
        )
        .route("/users/:user_id/watchlist/counts", get(watchlist::counts))
        .route(
            "/users/:user_id/watchlist/:media_id",
            get(watchlist::check)
                .patch(watchlist::update_status)
                .delete(watchlist::remove),
        )
        .route(
            "/users/:user_id/watchlist/:media_id/cache",
            delete(watchlist::clear_cache),
        )
        // Favorites
        .route(
            "/users/:user_id/favorites",
            get(favorites::list).post(favorites::add),
        )
        .route("/users/:user_id/favorites/count", get(favorites::count))
        .route(
            "/users/:user_id/favorites/:media_id",
            get(favorites::check).delete(favorites::remove),
        )
        .route(
            "/users/:user_id/favorites/:media_id/cache",
            delete(favorites::clear_cache),
        )
        // Reviews
        .route("/users/:user_id/reviews", get(reviews::by_user))
        .route("/users/:user_id/reviews/count", get(reviews::count))
        .route("/reviews", post(reviews::add))
        .route(
            "/reviews/:review_id",
            patch(reviews::update).delete(reviews::remove),
        )
        // Profile
        .route("/users/:user_id/profile", get(profile::summary))
        .route(
            "/users/:user_id/recommendations",
            get(recommendations::personalized),
        )
}
