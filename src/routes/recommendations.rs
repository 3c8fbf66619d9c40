use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::TitleQuery,
    routes::{auth::CurrentUser, AppState},
    services::recommender::{build_prompt, parse_film_count},
};

/// Query parameters of the recommendations endpoint.
///
/// `filmsToExclude` may repeat, so the raw pairs are folded by hand.
#[derive(Debug, Default)]
struct RecommendationParams {
    film_count: Option<String>,
    films_to_exclude: Vec<String>,
}

impl RecommendationParams {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "filmCount" => params.film_count = Some(value),
                "filmsToExclude" if !value.is_empty() => params.films_to_exclude.push(value),
                _ => {}
            }
        }
        params
    }
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Response> {
    let params = RecommendationParams::from_pairs(pairs);
    let film_count = parse_film_count(params.film_count.as_deref());
    let record = state.store.get(&user.email).await?;
    let prompt = build_prompt(record.as_ref(), film_count, &params.films_to_exclude);

    tracing::info!(
        request_id = %request_id,
        film_count,
        excluded = params.films_to_exclude.len(),
        "Processing recommendation request"
    );

    let titles = state.model.recommend(&prompt).await?;
    let body = state
        .enricher
        .enrich_json(titles.into_iter().map(TitleQuery::from).collect())
        .await?;

    tracing::info!(request_id = %request_id, "Recommendations completed");

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
