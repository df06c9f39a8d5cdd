//! Error handling for the PawCare client

use std::fmt;
use thiserror::Error;

use pawcare_auth::AuthError;
use pawcare_postgrest::PostgrestError;

/// Message shown when a failure carries no usable text
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Unified error type
#[derive(Error, Debug)]
pub enum PawcareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Postgrest(#[from] PostgrestError),

    #[error("Network request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, PawcareError>;

impl PawcareError {
    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        PawcareError::General(msg.to_string())
    }

    /// Reduce the error to the one line shown to the user.
    ///
    /// Backend errors yield the message the server sent; everything else
    /// its display form. Blank messages fall back to [`GENERIC_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        let message = match self {
            PawcareError::Auth(err) => err.api_message().unwrap_or_else(|| err.to_string()),
            PawcareError::Postgrest(err) => err.api_message().unwrap_or_else(|| err.to_string()),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}
