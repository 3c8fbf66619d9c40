use crate::error::AppResult;

pub mod openai;
pub mod prompt;

pub use openai::OpenAiRecommender;
pub use prompt::{build_prompt, parse_film_count, DEFAULT_FILM_COUNT};

/// Text-generation model that proposes film titles
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationModel: Send + Sync {
    /// Returns recommended titles, best first
    async fn recommend(&self, prompt: &str) -> AppResult<Vec<String>>;
}
