use crate::{
    error::EnrichmentError,
    models::{CatalogId, SearchHit, TitleQuery},
    services::catalog::Catalog,
};

/// Maps a free-text title to a single catalog id.
///
/// Among the search results, only those titled exactly like the top result
/// are considered; the most popular of them wins.
pub async fn resolve(catalog: &dyn Catalog, query: &TitleQuery) -> Result<CatalogId, EnrichmentError> {
    let hits = catalog.search_movies(query).await?;

    let id = best_match(&hits).ok_or_else(|| EnrichmentError::NotFound {
        title: query.title.clone(),
    })?;

    tracing::debug!(
        title = %query.title,
        candidates = hits.len(),
        catalog_id = %id,
        "Resolved title"
    );

    Ok(id)
}

/// Picks the most popular hit sharing the top hit's title. Ties keep the
/// earlier hit.
fn best_match(hits: &[SearchHit]) -> Option<CatalogId> {
    let top = hits.first()?;

    hits.iter()
        .filter(|hit| hit.title == top.title)
        .fold(None, |best: Option<&SearchHit>, hit| match best {
            Some(current) if current.popularity >= hit.popularity => Some(current),
            _ => Some(hit),
        })
        .map(|hit| CatalogId(hit.id))
}
