pub mod catalog;
pub mod favorite;
pub mod media;
pub mod review;
pub mod views;
pub mod watchlist;

pub use catalog::*;
pub use favorite::FavoriteRecord;
pub use media::{user_media_key, MediaId, MediaType};
pub use review::{
    merge_reviews, MergedReview, NewReview, Review, ReviewPatch, ReviewSource, MAX_RATING,
    MIN_RATING,
};
pub use views::{RecentView, UserViews, ViewOutcome, ViewRecord, ViewStats};
pub use watchlist::{WatchStatus, WatchlistEntry, WatchlistEntryInput, WatchlistStatusCounts};
