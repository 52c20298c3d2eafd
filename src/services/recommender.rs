use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    models::{MediaId, MediaSummary, MediaType},
    services::{CatalogProvider, FavoritesStore, WatchlistStore},
};

/// Library titles whose catalog recommendations are fetched per request
const MAX_SEEDS: usize = 20;

/// Suggestions drawn from the catalog's recommendations for titles the user
/// has favorited or put on their watchlist
#[derive(Clone)]
pub struct Recommender {
    favorites: FavoritesStore,
    watchlist: WatchlistStore,
    catalog: Arc<dyn CatalogProvider>,
}

impl Recommender {
    pub fn new(
        favorites: FavoritesStore,
        watchlist: WatchlistStore,
        catalog: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            favorites,
            watchlist,
            catalog,
        }
    }

    /// Up to `limit` recommended titles with a poster, none already in the
    /// user's library.
    ///
    /// Seeds are the user's favorites then watchlist, newest first. Their
    /// recommendation lists are fetched concurrently and taken round-robin so
    /// every seed gets a turn. A failing store or catalog call is logged and
    /// contributes nothing.
    pub async fn get_personalized_recommendations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Vec<MediaSummary> {
        let seeds = self.library(user_id).await;
        if seeds.is_empty() || limit == 0 {
            return Vec::new();
        }

        let fetches = seeds.iter().take(MAX_SEEDS).map(|&(media_type, media_id)| {
            let catalog = self.catalog.clone();
            async move {
                catalog
                    .recommendations(media_id, media_type)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(
                            media_id,
                            provider = catalog.name(),
                            error = %e,
                            "Recommendations unavailable for seed"
                        );
                        Vec::new()
                    })
            }
        });
        let lists = join_all(fetches).await;

        let owned: HashSet<(MediaType, MediaId)> = seeds.into_iter().collect();
        let picked = interleave(lists, &owned, limit);

        tracing::debug!(user_id, count = picked.len(), "Personalized recommendations built");
        picked
    }

    /// Deduplicated (type, id) pairs from favorites then watchlist
    async fn library(&self, user_id: &str) -> Vec<(MediaType, MediaId)> {
        let (favorites, watchlist) = futures::join!(
            self.favorites.get_user_favorites(user_id),
            self.watchlist.get_user_watchlist(user_id)
        );

        let favorites = favorites.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "Favorites unavailable for recommendations");
            Vec::new()
        });
        let watchlist = watchlist.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "Watchlist unavailable for recommendations");
            Vec::new()
        });

        let mut seen = HashSet::new();
        favorites
            .iter()
            .map(|f| (f.media_type, f.media_id))
            .chain(watchlist.iter().map(|w| (w.media_type, w.media_id)))
            .filter(|seed| seen.insert(*seed))
            .collect()
    }
}

/// Takes one item from each list in turn, skipping posterless, owned and
/// already picked titles, until `limit` items are picked or all lists run dry
fn interleave(
    lists: Vec<Vec<MediaSummary>>,
    owned: &HashSet<(MediaType, MediaId)>,
    limit: usize,
) -> Vec<MediaSummary> {
    let mut queues: Vec<_> = lists.into_iter().map(Vec::into_iter).collect();
    let mut picked = Vec::new();
    let mut seen = HashSet::new();

    while picked.len() < limit && !queues.is_empty() {
        queues.retain_mut(|queue| match queue.next() {
            Some(item) => {
                let key = (item.media_type, item.id);
                if picked.len() < limit
                    && item.poster_path.is_some()
                    && !owned.contains(&key)
                    && seen.insert(key)
                {
                    picked.push(item);
                }
                true
            }
            None => false,
        });
    }

    picked
}
