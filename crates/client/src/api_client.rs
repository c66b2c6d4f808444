//! HTTP API client for the postboard backend.

use postboard_shared::{
    ApiError, AuthResponse, CredentialsRequest, Post, PostBody, SocialLoginRequest, User,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;

/// Stateless request layer over the remote API.
///
/// Holds no session state of its own; the bearer token is passed per call so
/// a request can never be issued with a token that outlived its store.
/// Ordinary 4xx/5xx statuses become [`ApiError::Http`], never a panic or an
/// early return through a different channel; only transport failure becomes
/// [`ApiError::Network`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given backend origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client from deployment configuration, the only path that
    /// guarantees a base URL was actually provided.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn bearer(rb: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => rb.header("Authorization", format!("Bearer {token}")),
            None => rb,
        }
    }

    /// Send a request and decode a JSON payload from a 2xx response.
    async fn send_json<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T, ApiError> {
        let text = Self::send(rb).await?;
        // Some endpoints answer 2xx with an empty body
        let text = if text.is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    /// Send a request, discarding the body of a 2xx response.
    async fn send_ok(rb: RequestBuilder) -> Result<(), ApiError> {
        Self::send(rb).await.map(|_| ())
    }

    async fn send(rb: RequestBuilder) -> Result<String, ApiError> {
        let resp = rb
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();

        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }
        Ok(text)
    }

    /// Make a GET request and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        Self::send_json(Self::bearer(self.client.get(self.url(path)), token)).await
    }

    /// Make a POST request with a JSON body and decode the JSON response.
    pub async fn post_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> Result<TRes, ApiError> {
        Self::send_json(Self::bearer(self.client.post(self.url(path)), token).json(body)).await
    }

    // --- Auth endpoints ---

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &body, None).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/register", &body, None).await
    }

    pub async fn social_login(
        &self,
        provider: &str,
        credential: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = SocialLoginRequest {
            provider: provider.to_string(),
            token: credential.to_string(),
        };
        self.post_json("/auth/social-login", &body, None).await
    }

    // --- Profile endpoints ---

    pub async fn fetch_profile(&self, token: &str) -> Result<User, ApiError> {
        self.get_json("/profile", Some(token)).await
    }

    pub async fn delete_account(&self, token: &str) -> Result<(), ApiError> {
        Self::send_ok(Self::bearer(
            self.client.delete(self.url("/profile")),
            Some(token),
        ))
        .await
    }

    // --- Post endpoints ---

    pub async fn fetch_my_posts(&self, token: &str) -> Result<Vec<Post>, ApiError> {
        self.get_json("/posts/me", Some(token)).await
    }

    /// Create a post. The created entity is not decoded; callers reconcile by
    /// refetching the list, so a bare 2xx is as good as an echoed post.
    pub async fn create_post(
        &self,
        token: &str,
        title: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        let body = PostBody {
            title: title.to_string(),
            content: content.to_string(),
        };
        let rb = Self::bearer(self.client.post(self.url("/posts")), Some(token)).json(&body);
        Self::send_ok(rb).await
    }

    /// Update a post. Like [`Self::create_post`], the response body is ignored.
    pub async fn update_post(
        &self,
        token: &str,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        let body = PostBody {
            title: title.to_string(),
            content: content.to_string(),
        };
        let rb = Self::bearer(
            self.client.put(self.url(&format!("/posts/{id}"))),
            Some(token),
        )
        .json(&body);
        Self::send_ok(rb).await
    }

    pub async fn delete_post(&self, token: &str, id: i64) -> Result<(), ApiError> {
        Self::send_ok(Self::bearer(
            self.client.delete(self.url(&format!("/posts/{id}"))),
            Some(token),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_built_from_required_config() {
        let config = Config::new("https://api.example.com").unwrap();
        let client = ApiClient::from_config(&config);
        assert_eq!(client.url("/profile"), "https://api.example.com/profile");
    }

    #[test]
    fn url_joins_regardless_of_slashes() {
        let with_slash = ApiClient::new("https://api.example.com/");
        let without = ApiClient::new("https://api.example.com");
        assert_eq!(with_slash.url("/posts/me"), "https://api.example.com/posts/me");
        assert_eq!(without.url("posts/me"), "https://api.example.com/posts/me");
    }
}
