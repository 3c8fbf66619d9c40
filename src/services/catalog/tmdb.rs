/// TMDB v3 catalog client
///
/// Endpoints used:
/// 1. Search: /search/movie?query=..&year=.. → candidate ids with popularity
/// 2. Details: /movie/{id} → genres, release date, overview
/// 3. Credits: /movie/{id}/credits → crew with job titles
/// 4. Images: /movie/{id}/images → poster and backdrop paths
///
/// Authentication is a v4 read token sent as a bearer credential.
use crate::{
    error::EnrichmentError,
    models::{
        CatalogId, MovieCredits, MovieDetails, MovieImages, SearchHit, SearchResponse, TitleQuery,
    },
    services::catalog::Catalog,
};
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const SEARCH_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    read_token: String,
    api_url: String,
}

impl TmdbCatalog {
    /// Creates a client. `http_client` should carry the per-request timeout.
    pub fn new(http_client: HttpClient, read_token: String, api_url: String) -> Self {
        Self {
            http_client,
            read_token,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Issues one GET and decodes the JSON body, naming `target` in any error
    async fn get_json<T: DeserializeOwned>(
        &self,
        target: String,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, EnrichmentError> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.read_token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| EnrichmentError::from_reqwest(target.clone(), e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                request = %target,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(EnrichmentError::Transport {
                target,
                cause: format!("TMDB returned status {}: {}", status, body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| EnrichmentError::from_reqwest(target.clone(), e))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                request = %target,
                error = %e,
                response = %body,
                "Failed to deserialize TMDB response"
            );
            EnrichmentError::Decode {
                target,
                cause: e.to_string(),
            }
        })
    }
}

#[async_trait::async_trait]
impl Catalog for TmdbCatalog {
    async fn search_movies(&self, query: &TitleQuery) -> Result<Vec<SearchHit>, EnrichmentError> {
        let mut params = vec![
            ("query", query.title.as_str()),
            ("include_adult", "true"),
            ("page", "1"),
            ("language", SEARCH_LANGUAGE),
        ];
        if let Some(year) = query.year.as_deref() {
            params.push(("year", year));
        }

        let response: SearchResponse = self
            .get_json(format!("search '{}'", query.title), "/search/movie", &params)
            .await?;

        tracing::debug!(
            title = %query.title,
            results = response.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(response.results)
    }

    async fn movie_details(&self, id: CatalogId) -> Result<MovieDetails, EnrichmentError> {
        self.get_json(format!("details of {}", id), &format!("/movie/{}", id), &[])
            .await
    }

    async fn movie_credits(&self, id: CatalogId) -> Result<MovieCredits, EnrichmentError> {
        self.get_json(
            format!("credits of {}", id),
            &format!("/movie/{}/credits", id),
            &[],
        )
        .await
    }

    async fn movie_images(&self, id: CatalogId) -> Result<MovieImages, EnrichmentError> {
        self.get_json(
            format!("images of {}", id),
            &format!("/movie/{}/images", id),
            &[],
        )
        .await
    }
}
