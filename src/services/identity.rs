use std::collections::HashMap;

use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Resolves a session's access token to the user's email
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn email_for_token(&self, token: &str) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

/// Looks tokens up at an OpenID Connect userinfo endpoint
#[derive(Clone)]
pub struct UserInfoIdentity {
    http_client: HttpClient,
    userinfo_url: String,
}

impl UserInfoIdentity {
    pub fn new(http_client: HttpClient, userinfo_url: String) -> Self {
        Self {
            http_client,
            userinfo_url,
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for UserInfoIdentity {
    async fn email_for_token(&self, token: &str) -> AppResult<String> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Unauthorized(
                    "Access token was rejected".to_string(),
                ));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!(
                    "Userinfo endpoint returned status {}: {}",
                    status, body
                )));
            }
            _ => {}
        }

        let info: UserInfo = response.json().await?;
        info.email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Session has no email claim".to_string()))
    }
}

/// Fixed token → email table, for local runs and tests
#[derive(Clone, Default)]
pub struct StaticIdentity {
    sessions: HashMap<String, String>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        self.sessions.insert(token.into(), email.into());
        self
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StaticIdentity {
    async fn email_for_token(&self, token: &str) -> AppResult<String> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Unknown access token".to_string()))
    }
}
