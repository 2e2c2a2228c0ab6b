//! I/O boundary traits for testability
//!
//! The reorder engine only talks to the remote category store through
//! [`CategoryStore`], so services can be tested with in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use crate::domain::{CategoryNode, ReorderRequest};
use crate::infrastructure::session::Session;
use crate::infrastructure::{InfraError, InfraResult};

/// Path of the category listing, relative to the API base URL.
pub const CATEGORIES_PATH: &str = "categories";

/// Path of the batch reorder endpoint, relative to the API base URL.
pub const REORDER_PATH: &str = "categories/reorder";

/// Remote system of record for the category forest.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Fetch the whole two-level forest.
    async fn list(&self) -> InfraResult<Vec<CategoryNode>>;

    /// Persist a flattened change-set. Only success or failure matters.
    async fn reorder(&self, request: &ReorderRequest) -> InfraResult<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// JSON-over-HTTP category store.
#[derive(Debug, Clone)]
pub struct HttpCategoryStore {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpCategoryStore {
    pub fn new(api: &ApiConfig, session: Session) -> InfraResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| InfraError::http("build HTTP client", e))?;
        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the body text, mapping non-2xx to `InfraError::Remote`.
    async fn send(&self, builder: RequestBuilder, context: &str) -> InfraResult<String> {
        let response = builder
            .send()
            .await
            .map_err(|e| InfraError::http(context, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InfraError::http(context, e))?;
        debug!(%status, bytes = body.len(), "{context}");

        if !status.is_success() {
            return Err(InfraError::Remote {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl CategoryStore for HttpCategoryStore {
    #[instrument(level = "debug", skip(self))]
    async fn list(&self) -> InfraResult<Vec<CategoryNode>> {
        let context = "GET categories";
        let body = self
            .send(self.request(Method::GET, CATEGORIES_PATH), context)
            .await?;
        serde_json::from_str(&body).map_err(|e| InfraError::Decode {
            context: context.to_string(),
            source: e,
        })
    }

    #[instrument(level = "debug", skip_all, fields(items = request.items.len()))]
    async fn reorder(&self, request: &ReorderRequest) -> InfraResult<()> {
        let builder = self.request(Method::POST, REORDER_PATH).json(request);
        self.send(builder, "POST categories/reorder").await?;
        Ok(())
    }
}

/// Normalize an error response body into one operator-facing message.
///
/// - `{"errors": {"field": ["msg", ...]}}` → first field's first message
/// - `{"message": "msg"}` → `msg`
/// - anything else → the raw text, or `"Unknown error"` when empty
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let validation = value
            .get("errors")
            .and_then(Value::as_object)
            .and_then(|fields| fields.values().next())
            .and_then(first_message);
        if let Some(message) = validation {
            return message;
        }
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    match body.trim() {
        "" => "Unknown error".to_string(),
        text => text.to_string(),
    }
}

fn first_message(field: &Value) -> Option<String> {
    let message = match field {
        Value::Array(messages) => messages.first().and_then(Value::as_str),
        Value::String(message) => Some(message.as_str()),
        _ => None,
    };
    message.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"errors":{"name":["Name is required","too short"],"slug":["taken"]}}"#, "Name is required")]
    #[case(r#"{"errors":{"name":"Name is required"}}"#, "Name is required")]
    #[case(r#"{"message":"Unauthenticated."}"#, "Unauthenticated.")]
    #[case(r#"{"errors":{},"message":"fallback"}"#, "fallback")]
    #[case("Bad Gateway", "Bad Gateway")]
    #[case("", "Unknown error")]
    #[case("   ", "Unknown error")]
    fn given_error_body_when_extracting_then_message_is_normalized(
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(extract_error_message(body), expected);
    }

    #[test]
    fn given_trailing_slash_when_building_url_then_single_separator() {
        let api = ApiConfig {
            base_url: "http://localhost:8000/api/".into(),
            timeout_secs: 5,
        };
        let store = HttpCategoryStore::new(&api, Session::anonymous()).unwrap();
        assert_eq!(
            store.url(REORDER_PATH),
            "http://localhost:8000/api/categories/reorder"
        );
    }
}
