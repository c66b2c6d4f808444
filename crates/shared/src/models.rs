//! Wire-level data models for the postboard API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user, as returned by `GET /profile`.
///
/// A read-only mirror of server state; the client never mutates it locally
/// except to drop it entirely on account deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// A board post owned by the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/social-login`.
///
/// `token` is the provider-issued credential and is opaque to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLoginRequest {
    pub provider: String,
    pub token: String,
}

/// Successful response of all three auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
}

/// Body for `POST /posts` and `PUT /posts/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostBody {
    pub title: String,
    pub content: String,
}
