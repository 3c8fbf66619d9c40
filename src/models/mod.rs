use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod film;
pub mod user_films;

pub use film::{CatalogRecord, CreditSet, EnrichedFilm, ImageSet, TitleQuery};
pub use user_films::{LikedFilmsPage, Reaction, SortOrder, UserFilms};

/// Identifier issued by the catalog for a single film
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogId(pub u64);

impl Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One entry of GET /search/movie
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub popularity: f64,
}

/// Response of GET /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Genre {
    pub name: String,
}

/// Response of GET /movie/{id}
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

/// Response of GET /movie/{id}/credits
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieCredits {
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// A poster or backdrop; serialized as-is into the enriched output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub file_path: String,
}

/// Response of GET /movie/{id}/images
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieImages {
    #[serde(default)]
    pub backdrops: Vec<Image>,
    #[serde(default)]
    pub posters: Vec<Image>,
}
