use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use smk_db::{PgStore, ProgressStore};
use tokio_util::sync::CancellationToken;

use crate::{
    ApiConfig,
    clock::Clock,
    points::PointsService,
    progress::DomainProgressService,
    ranking::{RankingCache, RankingService},
    streak::StreakService,
};

/// Knobs of the progress computations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub progress_batch_size: usize,
    pub ranking_cache_ttl: Duration,
    pub ranking_write_through: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            progress_batch_size: 10,
            ranking_cache_ttl: Duration::from_secs(300),
            ranking_write_through: false,
        }
    }
}

impl From<&ApiConfig> for EngineSettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            progress_batch_size: config.progress_batch_size,
            ranking_cache_ttl: Duration::from_secs(config.ranking_cache_ttl_secs),
            ranking_write_through: config.ranking_write_through,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl From<&ApiConfig> for AuthConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}

pub struct ApiState<S = PgStore> {
    pub store: Arc<S>,
    pub clock: Arc<dyn Clock>,
    pub progress: DomainProgressService<S>,
    pub streak: StreakService<S>,
    pub points: PointsService<S>,
    pub ranking: RankingService<S>,
    pub settings: EngineSettings,
    pub auth: AuthConfig,
    /// Cancelled on shutdown; every request computes under a child token
    pub shutdown: CancellationToken,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            progress: self.progress.clone(),
            streak: self.streak.clone(),
            points: self.points.clone(),
            ranking: self.ranking.clone(),
            settings: self.settings,
            auth: self.auth.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S: ProgressStore> ApiState<S> {
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
        auth: AuthConfig,
    ) -> Self {
        let progress = DomainProgressService::new(Arc::clone(&store), settings.progress_batch_size);
        let streak = StreakService::new(Arc::clone(&store), Arc::clone(&clock));
        let points = PointsService::new(Arc::clone(&store), progress.clone(), streak.clone());
        let cache = Arc::new(RankingCache::new(settings.ranking_cache_ttl));
        let ranking = RankingService::new(Arc::clone(&store), points.clone(), cache);

        Self {
            store,
            clock,
            progress,
            streak,
            points,
            ranking,
            settings,
            auth,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token for one request's computations.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

impl<S> FromRef<ApiState<S>> for AuthConfig {
    fn from_ref(state: &ApiState<S>) -> Self {
        state.auth.clone()
    }
}
