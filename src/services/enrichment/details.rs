use crate::{
    error::EnrichmentError,
    models::{CatalogId, CatalogRecord},
    services::catalog::Catalog,
};

/// Fetches genres, release date, overview and title for `id`
pub async fn fetch_details(catalog: &dyn Catalog, id: CatalogId) -> Result<CatalogRecord, EnrichmentError> {
    let details = catalog.movie_details(id).await?;
    Ok(CatalogRecord::from(details))
}
