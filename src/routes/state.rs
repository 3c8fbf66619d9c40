use std::sync::Arc;

use crate::{
    config::Config,
    db::{create_redis_client, FilmStore, MemoryFilmStore, RedisFilmStore},
    services::{
        FilmEnricher, IdentityProvider, OpenAiRecommender, RecommendationModel, TmdbCatalog,
        UserInfoIdentity,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FilmStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub model: Arc<dyn RecommendationModel>,
    pub enricher: FilmEnricher,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FilmStore>,
        identity: Arc<dyn IdentityProvider>,
        model: Arc<dyn RecommendationModel>,
        enricher: FilmEnricher,
    ) -> Self {
        Self {
            store,
            identity,
            model,
            enricher,
        }
    }

    /// Wires the production collaborators described by `config`
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = config.http_client()?;

        let store: Arc<dyn FilmStore> = match config.redis_url.as_deref() {
            Some(redis_url) => {
                let client = create_redis_client(redis_url)?;
                Arc::new(RedisFilmStore::connect(client).await?)
            }
            None => {
                tracing::warn!("REDIS_URL not set, user films are kept in memory");
                Arc::new(MemoryFilmStore::new())
            }
        };

        let catalog = TmdbCatalog::new(
            http_client.clone(),
            config.tmdb_read_token.clone(),
            config.tmdb_api_url.clone(),
        );
        let enricher = FilmEnricher::new(Arc::new(catalog), config.tmdb_image_base_url.clone())
            .with_max_concurrency(config.enrich_max_concurrency);

        let model = OpenAiRecommender::new(
            http_client.clone(),
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
        );

        let identity = UserInfoIdentity::new(http_client, config.userinfo_url.clone());

        tracing::info!(
            store = store.name(),
            timeout_secs = config.http_timeout_secs,
            "Application state initialized"
        );

        Ok(Self::new(
            store,
            Arc::new(identity),
            Arc::new(model),
            enricher,
        ))
    }
}
