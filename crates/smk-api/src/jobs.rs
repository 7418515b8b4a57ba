//! Background maintenance tasks.
//!
//! Every job stops when the shutdown token is cancelled, so the server can
//! await the returned handles after draining connections.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::interval};
use tokio_util::sync::CancellationToken;

use crate::ranking::RankingCache;

/// Start all background jobs
pub fn start_background_jobs(
    ranking_cache: Arc<RankingCache>,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![tokio::spawn(periodic_ranking_cache_purge(
        ranking_cache,
        shutdown,
    ))]
}

/// Drop expired ranking snapshots once per TTL (at least once a minute)
async fn periodic_ranking_cache_purge(cache: Arc<RankingCache>, shutdown: CancellationToken) {
    let period = cache.ttl().max(Duration::from_secs(60));
    let mut interval = interval(period);
    // First tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::debug!("Ranking cache purge stopped");
                return;
            }
            _ = interval.tick() => {
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    tracing::info!(purged, "Purged expired ranking snapshots");
                } else {
                    tracing::debug!("No expired ranking snapshots");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_jobs_stop_on_shutdown() {
        let shutdown = CancellationToken::new();
        let handles = start_background_jobs(
            Arc::new(RankingCache::new(Duration::from_secs(300))),
            shutdown.clone(),
        );

        shutdown.cancel();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .expect("job did not stop")
                .expect("job panicked");
        }
    }
}
