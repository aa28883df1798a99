use tokio::time::{interval, Duration};

use crate::{cms::cache::ResponseCache, limiter::rate_limiter::SlidingWindowStore};

/// Drops per-client windows idle longer than `idle_ttl`, and expired CMS
/// cache entries when a cache is given.
pub async fn start_eviction_task(
    store: SlidingWindowStore,
    idle_ttl: Duration,
    cache: Option<ResponseCache>,
) {
    let mut interval = interval(Duration::from_secs(30));

    loop {
        interval.tick().await;

        let evicted = store.evict_idle(idle_ttl);
        if evicted > 0 {
            tracing::debug!("Evicted {} idle rate-limit windows", evicted);
        }

        if let Some(cache) = &cache {
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {} expired CMS cache entries", purged);
            }
        }
    }
}
