use serde::{Deserialize, Serialize};

use super::{Image, MovieDetails};

/// A title to enrich, optionally pinned to a release year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleQuery {
    pub title: String,
    pub year: Option<String>,
}

impl TitleQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }
}

impl From<String> for TitleQuery {
    fn from(title: String) -> Self {
        Self::new(title)
    }
}

impl From<&str> for TitleQuery {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

/// Descriptive fields fetched for one catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub title: String,
    pub genres: Vec<String>,
    pub release_date: String,
    pub overview: String,
}

impl CatalogRecord {
    /// First four characters of the release date, or empty when it is shorter
    pub fn year(&self) -> String {
        if self.release_date.chars().count() >= 4 {
            self.release_date.chars().take(4).collect()
        } else {
            String::new()
        }
    }
}

impl From<MovieDetails> for CatalogRecord {
    fn from(details: MovieDetails) -> Self {
        Self {
            title: details.title,
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            release_date: details.release_date.unwrap_or_default(),
            overview: details.overview.unwrap_or_default(),
        }
    }
}

/// Directors credited on one catalog entry, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct CreditSet {
    pub directors: Vec<String>,
}

/// At most four posters and four backdrops with absolute URLs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    pub posters: Vec<Image>,
    pub backdrops: Vec<Image>,
}

/// One enriched recommendation as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFilm {
    /// The title as it was recommended, not the catalog's canonical title
    pub name: String,
    pub year: String,
    pub genres: Vec<String>,
    pub directed_by: Vec<String>,
    pub description: String,
    pub movie_images: ImageSet,
}

impl EnrichedFilm {
    pub fn assemble(
        recommended_name: &str,
        record: CatalogRecord,
        credits: CreditSet,
        images: ImageSet,
    ) -> Self {
        Self {
            name: recommended_name.to_string(),
            year: record.year(),
            genres: record.genres,
            directed_by: credits.directors,
            description: record.overview,
            movie_images: images,
        }
    }
}
