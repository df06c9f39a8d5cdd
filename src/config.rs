//! Configuration for the PawCare client

use std::time::Duration;
use url::Url;

use crate::error::{PawcareError, Result};

/// Connection options for the backend
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Keep the session returned by sign-in / sign-up for later requests
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema the tables live in
    pub db_schema: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }
}

/// Project URL, anon key and options, handed to the backend at construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub url: Url,
    pub anon_key: String,
    pub options: ClientOptions,
}

impl AppConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: impl Into<String>) -> Result<Self> {
        let url = Url::parse(url_str)?;
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(PawcareError::Config("anon_key cannot be empty".to_string()));
        }
        Ok(Self {
            url,
            anon_key,
            options: ClientOptions::default(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL").map_err(|_| {
            PawcareError::Config("SUPABASE_URL environment variable not found".to_string())
        })?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY").map_err(|_| {
            PawcareError::Config("SUPABASE_ANON_KEY environment variable not found".to_string())
        })?;
        Self::new(&url_str, anon_key)
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Project URL without the trailing slash `Url` adds to bare hosts
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_valid() {
        let config = AppConfig::new("http://localhost:54321", "dummy-anon-key").unwrap();

        assert_eq!(config.url.as_str(), "http://localhost:54321/");
        assert_eq!(config.base_url(), "http://localhost:54321");
        assert_eq!(config.anon_key, "dummy-anon-key");
        assert!(config.options.persist_session);
    }

    #[test]
    fn config_new_invalid_url() {
        let config = AppConfig::new("not a valid url", "some_anon_key");
        assert!(matches!(config, Err(PawcareError::UrlParse(_))));
    }

    #[test]
    fn config_new_empty_key() {
        match AppConfig::new("http://localhost:54321", "  ") {
            Err(PawcareError::Config(msg)) => assert!(msg.contains("anon_key cannot be empty")),
            other => panic!("Expected Config error for empty key, got {:?}", other),
        }
    }

    #[test]
    fn options_builder() {
        let options = ClientOptions::default()
            .with_persist_session(false)
            .with_request_timeout(None)
            .with_db_schema("pets_app");

        assert!(!options.persist_session);
        assert_eq!(options.request_timeout, None);
        assert_eq!(options.db_schema, "pets_app");
    }
}
