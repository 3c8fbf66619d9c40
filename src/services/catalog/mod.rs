//! Film catalog abstraction
//!
//! The catalog is the source of truth for identifiers, descriptive fields,
//! credits and artwork. Implementations perform exactly one request per call
//! and never retry; classification of failures into transport and decode
//! errors happens here so the enrichment pipeline can report them uniformly.

use crate::{
    error::EnrichmentError,
    models::{CatalogId, MovieCredits, MovieDetails, MovieImages, SearchHit, TitleQuery},
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Searches films by title, constrained by year when the query has one.
    ///
    /// Results are returned in the catalog's ranking order.
    async fn search_movies(&self, query: &TitleQuery) -> Result<Vec<SearchHit>, EnrichmentError>;

    /// Fetches descriptive fields for one film
    async fn movie_details(&self, id: CatalogId) -> Result<MovieDetails, EnrichmentError>;

    /// Fetches cast and crew for one film
    async fn movie_credits(&self, id: CatalogId) -> Result<MovieCredits, EnrichmentError>;

    /// Fetches poster and backdrop paths for one film
    async fn movie_images(&self, id: CatalogId) -> Result<MovieImages, EnrichmentError>;
}
