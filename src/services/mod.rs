pub mod catalog;
pub mod favorites;
pub mod flags;
pub mod recommender;
pub mod reviews;
pub mod views;
pub mod watchlist;

pub use catalog::{CatalogProvider, ImageUrls, TmdbProvider};
pub use favorites::FavoritesStore;
pub use flags::StatusFlags;
pub use recommender::Recommender;
pub use reviews::{validate_rating, ReviewStore};
pub use views::ViewTracker;
pub use watchlist::WatchlistStore;
