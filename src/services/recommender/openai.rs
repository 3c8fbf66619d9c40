use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    services::recommender::RecommendationModel,
};

const SYSTEM_PROMPT: &str = "You are an expert in film recommendations and an experienced cinema critic. \
You recommend films, do not ask questions, just generate film ideas, write only film names. \
I give you films I like and films I do not like. Also I give you films I do not want to see in \
your film recommendation list. Based on this, you will generate me film ideas. \
Reply with a JSON object of the form {\"films\": [\"<film name>\", ...]}.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Recommendation model backed by an OpenAI-compatible chat completions API
#[derive(Clone)]
pub struct OpenAiRecommender {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiRecommender {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait::async_trait]
impl RecommendationModel for OpenAiRecommender {
    async fn recommend(&self, prompt: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/chat/completions", self.api_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        tracing::debug!(model = %self.model, prompt = %prompt, "Requesting recommendations");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Chat completion returned status {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("Chat completion had no content".to_string()))?;

        let titles = parse_titles(&content)?;
        tracing::info!(count = titles.len(), "Model recommended films");

        Ok(titles)
    }
}

const FILM_LIST_FIELD: &str = "films";

/// Extracts titles from a reply that is either a JSON array of strings or an
/// object holding them. In an object the `films` field wins; otherwise the
/// first array field in reply order is used.
fn parse_titles(content: &str) -> AppResult<Vec<String>> {
    let value: Value = serde_json::from_str(content).map_err(|e| {
        tracing::error!(error = %e, content = %content, "Model reply is not JSON");
        AppError::ExternalApi(format!("Model reply is not JSON: {}", e))
    })?;

    let list = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove(FILM_LIST_FIELD) {
            Some(Value::Array(items)) => items,
            _ => fields
                .into_iter()
                .find_map(|(_, field)| match field {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| AppError::ExternalApi("Model reply has no film list".to_string()))?,
        },
        _ => {
            return Err(AppError::ExternalApi(
                "Model reply has no film list".to_string(),
            ))
        }
    };

    list.into_iter()
        .map(|item| match item {
            Value::String(title) => Ok(title),
            other => Err(AppError::ExternalApi(format!(
                "Model reply contains a non-string film: {}",
                other
            ))),
        })
        .collect()
}
