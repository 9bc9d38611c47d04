/// Read-through caching around an async computation.
///
/// Returns the cached value when `$key` is present. Otherwise awaits
/// `$block`, queues the result for storage with `$ttl` seconds to live, and
/// returns it. Both the cache read and `$block` propagate errors with `?`,
/// so the macro must be used inside a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Popular, LIST_CACHE_TTL, async move {
///     self.fetch_list("tv/popular").await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(hit) = $cache.get_from_cache(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            Ok(hit)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
