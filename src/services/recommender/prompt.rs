use crate::models::UserFilms;

pub const DEFAULT_FILM_COUNT: u32 = 5;

const FILM_COUNT_PLACEHOLDER: &str = "{filmCount}";
const PROMPT_OPENING: &str = "Recommend me exactly {filmCount} film.";

/// Reads the requested number of films, falling back to the default for
/// missing, malformed or non-positive values
pub fn parse_film_count(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|count| *count > 0)
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(DEFAULT_FILM_COUNT)
}

/// Builds the user message sent to the model.
///
/// Liked and disliked films steer the recommendation; both are also excluded
/// from it, together with anything the caller asked to exclude.
pub fn build_prompt(record: Option<&UserFilms>, film_count: u32, films_to_exclude: &[String]) -> String {
    let mut prompt = PROMPT_OPENING.replace(FILM_COUNT_PLACEHOLDER, &film_count.to_string());
    let mut excluded: Vec<&str> = films_to_exclude.iter().map(String::as_str).collect();

    if let Some(record) = record {
        if !record.liked_films.is_empty() {
            prompt.push_str("\nI like the following films: ");
            prompt.push_str(&record.liked_films.join(", "));
            prompt.push('.');
        }
        if !record.unliked_films.is_empty() {
            prompt.push_str("\nI do not like the following films: ");
            prompt.push_str(&record.unliked_films.join(", "));
            prompt.push('.');
        }
        excluded.extend(record.unliked_films.iter().map(String::as_str));
        excluded.extend(record.liked_films.iter().map(String::as_str));
    }

    if !excluded.is_empty() {
        prompt.push_str("\nExclude the following films: ");
        prompt.push_str(&excluded.join(", "));
    }

    prompt
}
