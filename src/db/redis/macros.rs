/// Read-through caching for catalog responses.
///
/// Evaluates to `Ok(value)` from Redis when `$key` is present. Otherwise
/// awaits `$block`, queues the result for a background write with `$ttl`
/// seconds to live, and evaluates to `Ok(result)`. A failed cache read is
/// logged and treated as a miss; errors from `$block` are propagated with `?`.
///
/// # Example
/// ```rust,ignore
/// let page = cached!(self.cache, CacheKey::Catalog(path), LIST_CACHE_TTL, async move {
///     self.fetch_page(&path).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Catalog cache read failed");
                None
            }
        };

        if let Some(cached) = hit {
            tracing::debug!(key = %key, "Catalog cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
