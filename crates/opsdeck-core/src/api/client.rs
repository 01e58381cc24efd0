//! HTTP client for the opsdeck Auth Service.
//!
//! The session manager consumes the three auth endpoints through the
//! `AuthApi` trait so tests can substitute a scripted fake; `AuthClient`
//! is the production implementation.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Identity, Role};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The three Auth Service operations the session core depends on.
///
/// Every method returns a typed `ApiError` so the caller can tell a
/// rejection from a transport failure.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;

    /// Fetch the canonical identity record for a token. Doubles as token
    /// validation: a 401 here means the token is no longer trusted.
    async fn fetch_identity(&self, token: &str) -> Result<Identity, ApiError>;

    /// Replace the current password. The backend requires the current
    /// password to be re-submitted alongside the new one.
    async fn reset_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError>;
}

/// Shared handles work anywhere the trait is expected.
#[async_trait]
impl<T: AuthApi + ?Sized> AuthApi for std::sync::Arc<T> {
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        (**self).login(username, password).await
    }

    async fn fetch_identity(&self, token: &str) -> Result<Identity, ApiError> {
        (**self).fetch_identity(token).await
    }

    async fn reset_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        (**self)
            .reset_password(token, current_password, new_password)
            .await
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    name: String,
    email: String,
    role: Role,
    #[serde(rename = "isFirstLogin", default)]
    is_first_login: bool,
    #[serde(rename = "linkedRecordId")]
    linked_record_id: Option<String>,
}

impl MeResponse {
    fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            display_name: self.name,
            email: self.email,
            role: self.role,
            first_login: self.is_first_login,
            linked_record_id: self.linked_record_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    #[serde(rename = "currentPassword")]
    current_password: &'a str,
    #[serde(rename = "newPassword")]
    new_password: &'a str,
}

/// API client for the opsdeck Auth Service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Parse a successful response body, keeping decode failures distinct
    /// from transport errors.
    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("login"))
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let auth: LoginResponse = Self::parse_json(response).await?;
        debug!("login accepted by auth service");
        Ok(auth.access_token)
    }

    async fn fetch_identity(&self, token: &str) -> Result<Identity, ApiError> {
        let response = self
            .client
            .get(self.url("me"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let me: MeResponse = Self::parse_json(response).await?;
        debug!(role = %me.role, first_login = me.is_first_login, "identity record fetched");
        Ok(me.into_identity())
    }

    async fn reset_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("resetPassword"))
            .bearer_auth(token)
            .json(&ResetPasswordRequest {
                current_password,
                new_password,
            })
            .send()
            .await?;

        Self::check_response(response).await?;
        debug!("password reset accepted by auth service");
        Ok(())
    }
}
