/// Cache-aside helper for ranked results.
///
/// Returns the cached value when `$cache` has an entry for `$key`.
/// Otherwise awaits `$block`, propagates its error with `?` (so a failed
/// computation is never written), stores the value and evaluates to it.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache) with `get` and `put`.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$block`: a future resolving to `Result<Vec<ScoredCandidate>, E>`.
///
/// # Example
/// ```rust,ignore
/// let ranked = cached!(self.cache, key, self.fetch_and_rank(query));
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        if let Some(hit) = $cache.get(&$key).await {
            hit
        } else {
            let value = $block.await?;
            $cache.put(&$key, &value).await;
            value
        }
    }};
}
