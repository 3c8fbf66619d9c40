use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's liked and disliked films, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserFilms {
    pub email: String,
    pub liked_films: Vec<String>,
    pub unliked_films: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// How a user reacted to a film
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Unlike,
}

impl Reaction {
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "like" => Some(Reaction::Like),
            "unlike" => Some(Reaction::Unlike),
            _ => None,
        }
    }
}

impl UserFilms {
    /// Creates an empty record for a user
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            liked_films: Vec::new(),
            unliked_films: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Puts a film at the front of the liked or unliked list
    pub fn record(&mut self, reaction: Reaction, film: String) {
        match reaction {
            Reaction::Like => self.liked_films.insert(0, film),
            Reaction::Unlike => self.unliked_films.insert(0, film),
        }
        self.updated_at = Utc::now();
    }

    /// Returns a copy with the last occurrence of `film` removed from the
    /// liked list, or `None` when the film is not liked.
    pub fn without_liked(&self, film: &str) -> Option<UserFilms> {
        let index = self.liked_films.iter().rposition(|f| f == film)?;
        let mut updated = self.clone();
        updated.liked_films.remove(index);
        updated.updated_at = Utc::now();
        Some(updated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Unrecognized values leave the list in stored order
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// One page of a user's liked films
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikedFilmsPage {
    pub page: usize,
    pub content: Vec<String>,
    pub total_count: usize,
}

impl LikedFilmsPage {
    /// Slices `films` into the requested `(page, size)` window and sorts that
    /// window. Without a window the whole list is returned as page 0.
    pub fn build(films: &[String], window: Option<(usize, usize)>, sort: Option<SortOrder>) -> Self {
        let (page, size) = window.unwrap_or((0, films.len()));
        let mut content = paginate(films, page, size);

        match sort {
            Some(SortOrder::Asc) => content.sort(),
            Some(SortOrder::Desc) => content.sort_by(|a, b| b.cmp(a)),
            None => {}
        }

        Self {
            page,
            content,
            total_count: films.len(),
        }
    }
}

fn paginate(films: &[String], page: usize, size: usize) -> Vec<String> {
    let start = page.saturating_mul(size);
    if start > films.len() {
        return Vec::new();
    }

    let end = start.saturating_add(size).min(films.len());
    films[start..end].to_vec()
}
