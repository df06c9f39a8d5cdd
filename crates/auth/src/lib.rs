//! Auth client for the PawCare Supabase backend
//!
//! This crate covers the password flow the application relies on:
//! sign up, sign in, sign out and fetching the current user. The active
//! session is held in memory and its access token is reused by the table
//! client for row-level-security checks.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Auth errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing session")]
    MissingSession,
}

impl AuthError {
    /// The human readable message carried by an API error body, if any.
    ///
    /// The auth server reports failures as JSON using one of
    /// `error_description`, `msg` or `message`.
    pub fn api_message(&self) -> Option<String> {
        let AuthError::ApiError(body) = self else {
            return None;
        };

        let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
        ["error_description", "msg", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string)
    }
}

/// User information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Session information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: User,
}

/// Response of the sign-up endpoint.
///
/// With email confirmation disabled the server answers with a full session;
/// otherwise it returns only the created user and no session is started.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    User(User),
}

impl SignUpResponse {
    /// The created user
    pub fn user(&self) -> &User {
        match self {
            SignUpResponse::Session(session) => &session.user,
            SignUpResponse::User(user) => user,
        }
    }

    /// The started session, if the server issued one
    pub fn session(&self) -> Option<&Session> {
        match self {
            SignUpResponse::Session(session) => Some(session),
            SignUpResponse::User(_) => None,
        }
    }
}

/// Password credentials
#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client options
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub persist_session: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
        }
    }
}

/// Auth client
pub struct Auth {
    url: String,
    key: String,
    http_client: Client,
    options: AuthOptions,
    current_session: Arc<RwLock<Option<Session>>>,
}

impl Auth {
    /// Create a new auth client for the project at `url`
    pub fn new(url: &str, key: &str, http_client: Client, options: AuthOptions) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            options,
            current_session: Arc::new(RwLock::new(None)),
        }
    }

    /// Register a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, AuthError> {
        let url = format!("{}/auth/v1/signup", self.url);

        let request = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .json(&PasswordCredentials { email, password });

        let response: SignUpResponse = self.send(request).await?;

        if let Some(session) = response.session() {
            self.store_session(Some(session.clone()));
        }

        Ok(response)
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.url);

        let request = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .json(&PasswordCredentials { email, password });

        let session: Session = self.send(request).await?;
        self.store_session(Some(session.clone()));

        Ok(session)
    }

    /// The current session
    pub fn get_session(&self) -> Option<Session> {
        self.current_session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current session, e.g. to restore one obtained elsewhere
    pub fn set_session(&self, session: Option<Session>) {
        *self
            .current_session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Access token of the current session
    pub fn access_token(&self) -> Option<String> {
        self.get_session().map(|session| session.access_token)
    }

    /// Fetch the user the current session belongs to
    pub async fn get_user(&self) -> Result<User, AuthError> {
        let token = self.access_token().ok_or(AuthError::MissingSession)?;
        let url = format!("{}/auth/v1/user", self.url);

        let request = self
            .http_client
            .get(&url)
            .header("apikey", &self.key)
            .bearer_auth(token);

        self.send(request).await
    }

    /// Sign out.
    ///
    /// The local session is dropped even when the server rejects the call.
    /// Without a session there is nothing to revoke and this succeeds.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.url);
        let result = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .bearer_auth(token)
            .send()
            .await;

        self.set_session(None);

        let response = result?;
        Self::check(response).await?;
        Ok(())
    }

    fn store_session(&self, session: Option<Session>) {
        if self.options.persist_session {
            self.set_session(session);
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AuthError> {
        let response = Self::check(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await?;
        log::warn!("auth request failed with status {}: {}", status, error_text);
        Err(AuthError::ApiError(error_text))
    }
}
