use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{
    error::{AppError, AppResult, EnrichmentError},
    models::{EnrichedFilm, TitleQuery},
    services::catalog::Catalog,
    services::enrichment::{fetch_details, fetch_directors, fetch_images, resolve},
};

/// Enriches batches of recommended titles against a catalog
#[derive(Clone)]
pub struct FilmEnricher {
    catalog: Arc<dyn Catalog>,
    image_base_url: Arc<str>,
    max_concurrency: Option<usize>,
}

impl FilmEnricher {
    pub fn new(catalog: Arc<dyn Catalog>, image_base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            image_base_url: Arc::from(image_base_url.into()),
            max_concurrency: None,
        }
    }

    /// Caps how many titles are in flight at once. Without a cap every title
    /// of a batch starts immediately.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.map(|n| n.max(1));
        self
    }

    /// Enriches every title, returning one film per title in input order.
    ///
    /// The first failure observed ends the batch: it is returned on its own
    /// and the titles still in flight are aborted.
    pub async fn enrich(&self, titles: Vec<TitleQuery>) -> Result<Vec<EnrichedFilm>, EnrichmentError> {
        let total = titles.len();
        let labels: Vec<String> = titles.iter().map(|q| q.title.clone()).collect();
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

        tracing::info!(
            titles = total,
            max_concurrency = ?self.max_concurrency,
            "Enriching recommendations"
        );

        let mut tasks = JoinSet::new();
        for (index, query) in titles.into_iter().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let image_base_url = Arc::clone(&self.image_base_url);
            let limiter = limiter.clone();

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = enrich_one(catalog.as_ref(), &image_base_url, &query).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<EnrichedFilm>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(film))) => slots[index] = Some(film),
                Ok((index, Err(err))) => {
                    tracing::warn!(
                        title = %labels[index],
                        error = %err,
                        "Enrichment failed, abandoning batch"
                    );
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "Enrichment task join error");
                    tasks.abort_all();
                    return Err(EnrichmentError::Transport {
                        target: "enrichment task".to_string(),
                        cause: join_err.to_string(),
                    });
                }
            }
        }

        let films: Vec<EnrichedFilm> = slots.into_iter().flatten().collect();
        if films.len() != total {
            return Err(EnrichmentError::Transport {
                target: "enrichment batch".to_string(),
                cause: format!("{} of {} titles produced no result", total - films.len(), total),
            });
        }

        tracing::info!(films = films.len(), "Recommendations enriched");
        Ok(films)
    }

    /// Enriches `titles` and serializes the films as a flat JSON array
    pub async fn enrich_json(&self, titles: Vec<TitleQuery>) -> AppResult<String> {
        let films = self.enrich(titles).await?;
        serde_json::to_string(&films)
            .map_err(|e| AppError::Internal(format!("Failed to serialize films: {}", e)))
    }
}

async fn enrich_one(
    catalog: &dyn Catalog,
    image_base_url: &str,
    query: &TitleQuery,
) -> Result<EnrichedFilm, EnrichmentError> {
    let id = resolve(catalog, query).await?;

    let (record, credits, images) = tokio::try_join!(
        fetch_details(catalog, id),
        fetch_directors(catalog, id),
        fetch_images(catalog, id, image_base_url),
    )?;

    Ok(EnrichedFilm::assemble(&query.title, record, credits, images))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CatalogId, CrewMember, Genre, Image, MovieCredits, MovieDetails, MovieImages, SearchHit,
    };
    use crate::services::catalog::MockCatalog;
    use rand::Rng;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const BASE: &str = "https://image.tmdb.org/t/p/w500";

    fn details_for(id: CatalogId) -> MovieDetails {
        MovieDetails {
            genres: vec![Genre {
                name: "Drama".to_string(),
            }],
            overview: Some(format!("Overview {}", id)),
            release_date: Some(format!("{}-01-01", 1900 + id.0)),
            title: format!("Canonical {}", id),
        }
    }

    fn credits_for(id: CatalogId) -> MovieCredits {
        MovieCredits {
            crew: vec![CrewMember {
                name: format!("Director {}", id),
                job: "Director".to_string(),
            }],
        }
    }

    fn images_for(id: CatalogId) -> MovieImages {
        MovieImages {
            posters: vec![Image {
                file_path: format!("/poster{}.jpg", id),
            }],
            backdrops: vec![],
        }
    }

    /// A catalog whose ids are the input position of each title plus one
    fn mock_catalog(titles: &[&str]) -> MockCatalog {
        let ids: HashMap<String, u64> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u64 + 1))
            .collect();

        let mut catalog = MockCatalog::new();
        catalog.expect_search_movies().returning(move |query| {
            Ok(ids
                .get(&query.title)
                .map(|id| {
                    vec![SearchHit {
                        id: *id,
                        title: query.title.clone(),
                        popularity: 1.0,
                    }]
                })
                .unwrap_or_default())
        });
        catalog
            .expect_movie_details()
            .returning(|id| Ok(details_for(id)));
        catalog
            .expect_movie_credits()
            .returning(|id| Ok(credits_for(id)));
        catalog
            .expect_movie_images()
            .returning(|id| Ok(images_for(id)));
        catalog
    }

    fn queries(titles: &[&str]) -> Vec<TitleQuery> {
        titles.iter().map(|t| TitleQuery::new(*t)).collect()
    }

    #[tokio::test]
    async fn test_enrich_preserves_input_order() {
        let titles = ["Heat", "Alien", "Ronin", "Fargo"];
        let enricher = FilmEnricher::new(Arc::new(mock_catalog(&titles)), BASE);

        let films = enricher.enrich(queries(&titles)).await.unwrap();

        assert_eq!(films.len(), titles.len());
        for (i, film) in films.iter().enumerate() {
            assert_eq!(film.name, titles[i]);
            assert_eq!(film.directed_by, vec![format!("Director {}", i + 1)]);
            assert_eq!(film.year, format!("{}", 1901 + i));
            assert_eq!(
                film.movie_images.posters[0].file_path,
                format!("{}/poster{}.jpg", BASE, i + 1)
            );
        }
    }

    #[tokio::test]
    async fn test_enrich_uses_recommended_name_not_catalog_title() {
        let enricher = FilmEnricher::new(Arc::new(mock_catalog(&["heat 1995"])), BASE);

        let films = enricher.enrich(queries(&["heat 1995"])).await.unwrap();
        assert_eq!(films[0].name, "heat 1995");
    }

    #[tokio::test]
    async fn test_enrich_empty_batch() {
        let enricher = FilmEnricher::new(Arc::new(MockCatalog::new()), BASE);

        let films = enricher.enrich(vec![]).await.unwrap();
        assert!(films.is_empty());
        assert_eq!(enricher.enrich_json(vec![]).await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_one_unresolvable_title_fails_the_batch() {
        // "Missing" is not known to the catalog, so resolution yields nothing
        let enricher = FilmEnricher::new(Arc::new(mock_catalog(&["Heat", "Alien"])), BASE);

        let err = enricher
            .enrich(queries(&["Heat", "Missing", "Alien"]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EnrichmentError::NotFound {
                title: "Missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_resolution_skips_sub_fetches() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_movies().returning(|_| Ok(vec![]));
        catalog.expect_movie_details().never();
        catalog.expect_movie_credits().never();
        catalog.expect_movie_images().never();

        let enricher = FilmEnricher::new(Arc::new(catalog), BASE);
        let result = enricher.enrich(queries(&["Nothing"])).await;

        assert!(matches!(result, Err(EnrichmentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_sub_fetch_failure_fails_the_batch() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_movies().returning(|query| {
            Ok(vec![SearchHit {
                id: 42,
                title: query.title.clone(),
                popularity: 1.0,
            }])
        });
        catalog
            .expect_movie_details()
            .returning(|id| Ok(details_for(id)));
        catalog
            .expect_movie_credits()
            .returning(|_| Ok(MovieCredits { crew: vec![] }));
        catalog
            .expect_movie_images()
            .returning(|id| Ok(images_for(id)));

        let enricher = FilmEnricher::new(Arc::new(catalog), BASE);
        let err = enricher.enrich(queries(&["Koyaanisqatsi"])).await.unwrap_err();

        assert_eq!(err, EnrichmentError::DirectorNotFound { id: CatalogId(42) });
    }

    #[tokio::test]
    async fn test_enrich_json_is_flat_array() {
        let titles = ["Heat", "Alien"];
        let enricher = FilmEnricher::new(Arc::new(mock_catalog(&titles)), BASE);

        let json = enricher.enrich_json(queries(&titles)).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["name"], "Heat");
        assert_eq!(array[1]["name"], "Alien");
        assert!(array[0]["directedBy"].is_array());
        assert!(array[0]["movieImages"]["posters"].is_array());
    }

    #[tokio::test]
    async fn test_enrich_json_surfaces_enrichment_error() {
        let enricher = FilmEnricher::new(Arc::new(mock_catalog(&[])), BASE);

        let err = enricher.enrich_json(queries(&["Gone"])).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Enrichment(EnrichmentError::NotFound { .. })
        ));
    }

    /// Catalog that answers after a random delay, so tasks finish in an
    /// arbitrary order, and records peak concurrency.
    struct JitteryCatalog {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail_title: Option<String>,
    }

    impl JitteryCatalog {
        fn new(fail_title: Option<String>) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_title,
            }
        }

        async fn jitter(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = rand::thread_rng().gen_range(0..8);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl Catalog for JitteryCatalog {
        async fn search_movies(
            &self,
            query: &TitleQuery,
        ) -> Result<Vec<SearchHit>, EnrichmentError> {
            self.jitter().await;
            if self.fail_title.as_deref() == Some(query.title.as_str()) {
                return Ok(vec![]);
            }
            let id = query
                .title
                .trim_start_matches("title-")
                .parse::<u64>()
                .unwrap_or_default();
            Ok(vec![SearchHit {
                id,
                title: query.title.clone(),
                popularity: 1.0,
            }])
        }

        async fn movie_details(&self, id: CatalogId) -> Result<MovieDetails, EnrichmentError> {
            self.jitter().await;
            Ok(details_for(id))
        }

        async fn movie_credits(&self, id: CatalogId) -> Result<MovieCredits, EnrichmentError> {
            self.jitter().await;
            Ok(credits_for(id))
        }

        async fn movie_images(&self, id: CatalogId) -> Result<MovieImages, EnrichmentError> {
            self.jitter().await;
            Ok(images_for(id))
        }
    }

    fn numbered_titles(count: usize) -> Vec<TitleQuery> {
        (0..count)
            .map(|i| TitleQuery::new(format!("title-{}", i)))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_random_completion_order_keeps_input_order() {
        for _ in 0..20 {
            let count = rand::thread_rng().gen_range(1..40);
            let enricher = FilmEnricher::new(Arc::new(JitteryCatalog::new(None)), BASE);

            let films = enricher.enrich(numbered_titles(count)).await.unwrap();

            assert_eq!(films.len(), count);
            for (i, film) in films.iter().enumerate() {
                assert_eq!(film.name, format!("title-{}", i));
                assert_eq!(film.directed_by, vec![format!("Director {}", i)]);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_random_completion_order_single_failure() {
        for _ in 0..10 {
            let count = rand::thread_rng().gen_range(2..30);
            let failing = format!("title-{}", rand::thread_rng().gen_range(0..count));
            let catalog = JitteryCatalog::new(Some(failing.clone()));
            let enricher = FilmEnricher::new(Arc::new(catalog), BASE);

            let err = enricher.enrich_json(numbered_titles(count)).await.unwrap_err();

            assert!(matches!(
                err,
                AppError::Enrichment(EnrichmentError::NotFound { ref title }) if *title == failing
            ));
        }
    }

    /// Catalog whose three per-film fetches only return once all of them
    /// have started.
    struct RendezvousCatalog {
        barrier: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl Catalog for RendezvousCatalog {
        async fn search_movies(
            &self,
            query: &TitleQuery,
        ) -> Result<Vec<SearchHit>, EnrichmentError> {
            Ok(vec![SearchHit {
                id: 7,
                title: query.title.clone(),
                popularity: 1.0,
            }])
        }

        async fn movie_details(&self, id: CatalogId) -> Result<MovieDetails, EnrichmentError> {
            self.barrier.wait().await;
            Ok(details_for(id))
        }

        async fn movie_credits(&self, id: CatalogId) -> Result<MovieCredits, EnrichmentError> {
            self.barrier.wait().await;
            Ok(credits_for(id))
        }

        async fn movie_images(&self, id: CatalogId) -> Result<MovieImages, EnrichmentError> {
            self.barrier.wait().await;
            Ok(images_for(id))
        }
    }

    #[tokio::test]
    async fn test_sub_fetches_of_one_title_run_concurrently() {
        let catalog = RendezvousCatalog {
            barrier: tokio::sync::Barrier::new(3),
        };
        let enricher = FilmEnricher::new(Arc::new(catalog), BASE);

        let films = tokio::time::timeout(
            Duration::from_secs(5),
            enricher.enrich(queries(&["Heat"])),
        )
        .await
        .expect("details, credits and images were fetched one after another")
        .unwrap();

        assert_eq!(films.len(), 1);
        assert_eq!(films[0].directed_by, vec!["Director 7"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_max_concurrency_bounds_in_flight_titles() {
        let catalog = Arc::new(JitteryCatalog::new(None));
        let enricher = FilmEnricher::new(catalog.clone(), BASE).with_max_concurrency(Some(2));

        let films = enricher.enrich(numbered_titles(12)).await.unwrap();

        assert_eq!(films.len(), 12);
        // Two titles at a time, each with at most three concurrent sub-fetches
        assert!(catalog.peak.load(Ordering::SeqCst) <= 6);
    }
}
