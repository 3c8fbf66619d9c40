use crate::{
    error::EnrichmentError,
    models::{CatalogId, CreditSet, MovieCredits},
    services::catalog::Catalog,
};

const DIRECTOR_JOB: &str = "Director";

/// Fetches the directors credited on `id`.
///
/// Crew entries match on the job title, not the department. A film with no
/// director is an error.
pub async fn fetch_directors(catalog: &dyn Catalog, id: CatalogId) -> Result<CreditSet, EnrichmentError> {
    let credits = catalog.movie_credits(id).await?;
    let crew_size = credits.crew.len();
    let directors = directors_of(credits);

    if directors.is_empty() {
        tracing::warn!(catalog_id = %id, crew = crew_size, "No director in crew");
        return Err(EnrichmentError::DirectorNotFound { id });
    }

    Ok(CreditSet { directors })
}

fn directors_of(credits: MovieCredits) -> Vec<String> {
    credits
        .crew
        .into_iter()
        .filter(|member| member.job == DIRECTOR_JOB)
        .map(|member| member.name)
        .collect()
}
