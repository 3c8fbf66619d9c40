use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{LikedFilmsPage, Reaction, SortOrder, UserFilms},
    routes::{auth::CurrentUser, AppState},
};

#[derive(Debug, Deserialize)]
pub struct LikedFilmsQuery {
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFilmsQuery {
    method: Option<String>,
    film: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFilmQuery {
    film_to_remove: Option<String>,
}

fn parse_pagination(name: &str, raw: &str) -> AppResult<usize> {
    raw.trim().parse().map_err(|_| {
        AppError::InvalidInput(format!("Pagination param {} is not correct: {}", name, raw))
    })
}

/// Handler for listing the user's liked films
///
/// Pagination only applies when both `page` and `size` are present.
pub async fn liked_films(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<LikedFilmsQuery>,
) -> AppResult<Json<LikedFilmsPage>> {
    let window = match (params.page.as_deref(), params.size.as_deref()) {
        (Some(page), Some(size)) if !page.is_empty() && !size.is_empty() => Some((
            parse_pagination("page", page)?,
            parse_pagination("size", size)?,
        )),
        _ => None,
    };
    let sort = params.sort.as_deref().and_then(SortOrder::parse);

    let liked = state
        .store
        .get(&user.email)
        .await?
        .map(|record| record.liked_films)
        .unwrap_or_default();

    Ok(Json(LikedFilmsPage::build(&liked, window, sort)))
}

/// Handler for recording a like or unlike
///
/// Like removal, the write is conditional on the record read at the start.
pub async fn update_films(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Query(params): Query<UpdateFilmsQuery>,
) -> AppResult<&'static str> {
    let reaction = params
        .method
        .as_deref()
        .and_then(Reaction::parse)
        .ok_or_else(|| AppError::InvalidInput("method must be 'like' or 'unlike'".to_string()))?;
    let film = params
        .film
        .filter(|film| !film.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("film is required".to_string()))?;

    let current = state.store.get(&user.email).await?;
    let mut record = current
        .clone()
        .unwrap_or_else(|| UserFilms::new(user.email.clone()));
    record.record(reaction, film);

    if !state.store.compare_and_put(current.as_ref(), &record).await? {
        return Err(AppError::Conflict(
            "User films changed concurrently, retry the request".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        reaction = ?reaction,
        liked = record.liked_films.len(),
        unliked = record.unliked_films.len(),
        "User films updated"
    );

    Ok("Success")
}

/// Handler for removing one film from the liked list
///
/// The write only lands if nobody changed the record since it was read.
pub async fn remove_liked_film(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Query(params): Query<RemoveFilmQuery>,
) -> AppResult<&'static str> {
    let film = params
        .film_to_remove
        .filter(|film| !film.is_empty())
        .ok_or_else(|| AppError::InvalidInput("filmToRemove is required".to_string()))?;

    let current = state
        .store
        .get(&user.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User has no films".to_string()))?;

    let updated = current
        .without_liked(&film)
        .ok_or_else(|| AppError::NotFound(format!("Film not found: {}", film)))?;

    if !state.store.compare_and_put(Some(&current), &updated).await? {
        return Err(AppError::Conflict(
            "Liked films changed concurrently, retry the request".to_string(),
        ));
    }

    tracing::info!(request_id = %request_id, film = %film, "Liked film removed");
    Ok("Success")
}

/// Handler for forgetting everything about the user's films
pub async fn clear_films(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
) -> AppResult<StatusCode> {
    state.store.delete(&user.email).await?;
    tracing::info!(request_id = %request_id, "User films cleared");
    Ok(StatusCode::NO_CONTENT)
}
