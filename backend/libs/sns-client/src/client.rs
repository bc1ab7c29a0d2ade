use crate::error::{ClientError, Result};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the like and follow endpoints.
#[derive(Clone)]
pub struct SnsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SnsClient {
    /// `base_url` is the service root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn like(&self, post_id: Uuid) -> Result<()> {
        let request = self
            .client
            .post(self.url("likes"))
            .json(&json!({ "postId": post_id }));
        self.send(request).await
    }

    pub async fn unlike(&self, post_id: Uuid) -> Result<()> {
        let request = self
            .client
            .delete(self.url("likes"))
            .query(&[("postId", post_id.to_string())]);
        self.send(request).await
    }

    /// Follow a user by external id.
    pub async fn follow(&self, following_id: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url("follows"))
            .json(&json!({ "followingId": following_id }));
        self.send(request).await
    }

    pub async fn unfollow(&self, following_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url("follows"))
            .query(&[("followingId", following_id)]);
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
    debug!(status = status.as_u16(), %message, "toggle request rejected");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SnsClient::new("http://localhost:8080/").with_token("abc");
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.url("likes"), "http://localhost:8080/api/likes");
        assert_eq!(client.token.as_deref(), Some("abc"));
    }
}
