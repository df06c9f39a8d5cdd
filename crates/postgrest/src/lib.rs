//! PostgREST table client for the PawCare Supabase backend
//!
//! A small query builder covering what the application reads and writes:
//!
//! - column selection (`select`)
//! - equality filters (`eq`)
//! - ordering and limits
//! - zero-or-one row reads (`maybe_single`)
//! - inserts returning the stored representation

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Detail fields of a PostgREST API error
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostgrestApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("Code", &self.code),
            ("Message", &self.message),
            ("Details", &self.details),
            ("Hint", &self.hint),
        ]
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Errors
#[derive(Error, Debug)]
pub enum PostgrestError {
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: PostgrestApiErrorDetails,
        status: StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApiError { message: String, status: StatusCode },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl PostgrestError {
    /// The server supplied message of an API error, if any
    pub fn api_message(&self) -> Option<String> {
        match self {
            PostgrestError::ApiError { details, .. } => details
                .message
                .clone()
                .filter(|message| !message.trim().is_empty()),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Query builder for one table
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    base_url: String,
    api_key: String,
    table: String,
    http_client: Client,
    auth_token: Option<String>,
    schema: Option<String>,
    query_params: Vec<(String, String)>,
}

impl PostgrestClient {
    /// Create a client for `table` of the project at `base_url`
    pub fn new(base_url: &str, api_key: &str, table: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            http_client,
            auth_token: None,
            schema: None,
            query_params: Vec::new(),
        }
    }

    /// Authorize requests with a user's access token instead of the API key
    pub fn with_auth(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    /// Target a schema other than the server default
    pub fn schema(mut self, schema_name: &str) -> Self {
        self.schema = Some(schema_name.to_string());
        self
    }

    /// Columns to return
    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    /// Equality filter
    pub fn eq(self, column: &str, value: &str) -> Self {
        self.param(column, format!("eq.{}", value))
    }

    /// Sort by `column`
    pub fn order(self, column: &str, order: SortOrder) -> Self {
        self.param("order", format!("{}.{}", column, order.as_str()))
    }

    /// Return at most `count` rows
    pub fn limit(self, count: usize) -> Self {
        self.param("limit", count.to_string())
    }

    /// Fetch the matching rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, PostgrestError> {
        let url = self.build_url()?;
        let response = Self::check(self.request(self.http_client.get(url)).send().await?).await?;

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
    }

    /// Fetch zero or one row.
    ///
    /// An empty result is `None`; more than one matching row is an error.
    pub async fn maybe_single<T: DeserializeOwned>(&self) -> Result<Option<T>, PostgrestError> {
        let mut rows = self.clone().limit(2).execute::<T>().await?;
        if rows.len() > 1 {
            return Err(PostgrestError::InvalidParameters(format!(
                "expected at most one row from {}, got {}",
                self.table,
                rows.len()
            )));
        }
        Ok(rows.pop())
    }

    /// Insert `values` (a row or an array of rows).
    ///
    /// Returns the stored representation, or `Value::Null` when the server
    /// answers with an empty body.
    pub async fn insert<T: Serialize>(&self, values: T) -> Result<Value, PostgrestError> {
        let url = self.build_url()?;
        let request = self
            .request(self.http_client.post(url))
            .header(
                HeaderName::from_static("prefer"),
                HeaderValue::from_static("return=representation"),
            )
            .json(&values);

        let response = Self::check(request.send().await?).await?;
        let body_text = response.text().await.map_err(|e| {
            PostgrestError::DeserializationError(format!("Failed to read response body: {}", e))
        })?;

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str::<Value>(&body_text)
            .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.query_params.retain(|(k, _)| k != key);
        self.query_params.push((key.to_string(), value));
        self
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.auth_token.as_deref().unwrap_or(&self.api_key);
        let mut builder = builder.header("apikey", &self.api_key).bearer_auth(token);

        if let Some(schema) = &self.schema {
            builder = builder
                .header("Accept-Profile", schema)
                .header("Content-Profile", schema);
        }
        builder
    }

    fn build_url(&self) -> Result<Url, PostgrestError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))?;

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, PostgrestError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        log::warn!("PostgREST request failed with status {}: {}", status, error_text);

        match serde_json::from_str::<PostgrestApiErrorDetails>(&error_text) {
            Ok(details) => Err(PostgrestError::ApiError { details, status }),
            Err(_) => Err(PostgrestError::UnparsedApiError {
                message: error_text,
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, table: &str) -> PostgrestClient {
        PostgrestClient::new(&server.uri(), "fake-key", table, Client::new())
    }

    #[tokio::test]
    async fn test_select_with_filters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/pets"))
            .and(query_param("select", "*"))
            .and(query_param("owner_id", "eq.user-1"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "fake-key"))
            .and(header("authorization", "Bearer fake-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "p2", "name": "Rex" },
                { "id": "p1", "name": "Milo" }
            ])))
            .mount(&mock_server)
            .await;

        let rows = client(&mock_server, "pets")
            .select("*")
            .eq("owner_id", "user-1")
            .order("created_at", SortOrder::Descending)
            .execute::<Value>()
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Rex");
    }

    #[tokio::test]
    async fn test_maybe_single_empty_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let row = client(&mock_server, "profiles")
            .select("name")
            .eq("id", "nobody")
            .maybe_single::<Value>()
            .await
            .unwrap();

        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_maybe_single_rejects_multiple_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "A" },
                { "name": "B" }
            ])))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server, "profiles")
            .maybe_single::<Value>()
            .await;

        assert!(matches!(result, Err(PostgrestError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_insert_with_user_token() {
        let mock_server = MockServer::start().await;
        let row = json!({ "id": "user-1", "name": "Ada", "email": "ada@example.com" });

        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .and(header("prefer", "return=representation"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("content-profile", "public"))
            .and(body_json(&row))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row.clone()])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let stored = client(&mock_server, "profiles")
            .with_auth("user-token")
            .schema("public")
            .insert(&row)
            .await
            .unwrap();

        assert_eq!(stored[0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_api_error_details() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/pets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "new row violates row-level security policy for table \"pets\"",
                "details": null,
                "hint": null
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server, "pets")
            .insert(json!({ "name": "Rex" }))
            .await
            .unwrap_err();

        match &err {
            PostgrestError::ApiError { details, status } => {
                assert_eq!(*status, StatusCode::FORBIDDEN);
                assert_eq!(details.code.as_deref(), Some("42501"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            err.api_message().as_deref(),
            Some("new row violates row-level security policy for table \"pets\"")
        );
    }

    #[tokio::test]
    async fn test_unparsed_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/activities"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server, "activities")
            .execute::<Value>()
            .await
            .unwrap_err();

        assert!(matches!(err, PostgrestError::UnparsedApiError { .. }));
        assert_eq!(err.api_message(), None);
    }

    #[test]
    fn test_later_param_replaces_earlier() {
        let client = PostgrestClient::new("http://localhost:54321/", "k", "activities", Client::new())
            .limit(10)
            .limit(5);
        let url = client.build_url().unwrap();

        assert_eq!(url.as_str(), "http://localhost:54321/rest/v1/activities?limit=5");
    }

    #[test]
    fn test_error_details_display() {
        let details = PostgrestApiErrorDetails {
            code: Some("PGRST116".to_string()),
            message: Some("no rows".to_string()),
            details: None,
            hint: None,
        };
        assert_eq!(details.to_string(), "Code: PGRST116, Message: no rows");
    }
}
