// src/greptile/client.rs
// =============================================================================
// HTTP implementation of IndexApi on top of reqwest.
//
// Every request carries:
//   Authorization: Bearer <api key>
//   X-Github-Token: <token>          (only when a token is configured)
//
// Responses are read as text first. That way a failure can report the
// body verbatim, and a success can be decoded with serde_json.
// =============================================================================

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use super::types::{IndexRequest, QueryRequest, RepositoryStatus, SearchResult, SubmitResponse};
use super::IndexApi;
use crate::config::Config;
use crate::error::ApiError;

const GITHUB_TOKEN_HEADER: &str = "X-Github-Token";

/// Client for the indexing/query service
#[derive(Debug, Clone)]
pub struct GreptileClient {
    http: Client,
    base_url: String,
    api_key: String,
    github_token: Option<String>,
}

impl GreptileClient {
    /// Builds a client from validated configuration.
    ///
    /// The reqwest Client is created once and reused for every call
    /// (connection pooling).
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("here-be-dragons/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            github_token: config.github_token.clone(),
        })
    }

    // Adds the bearer credential and, if we have one, the GitHub token
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(&self.api_key);
        match &self.github_token {
            Some(token) => builder.header(GITHUB_TOKEN_HEADER, token),
            None => builder,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Percent-encodes a repository key so `github:main:owner/name` fits in
/// a single path segment (`github%3Amain%3Aowner%2Fname`).
pub fn encode_key(key: &str) -> String {
    form_urlencoded::byte_serialize(key.as_bytes()).collect()
}

// Turns a response into T, or into ApiError::Status with the body attached
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

impl IndexApi for GreptileClient {
    fn repository_status<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<RepositoryStatus, ApiError>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("repositories/{}", encode_key(key)));
            tracing::debug!(%url, "checking repository status");

            let response = self.authorized(self.http.get(&url)).send().await?;
            read_json(response).await
        })
    }

    fn submit_repository<'a>(
        &'a self,
        request: &'a IndexRequest,
    ) -> BoxFuture<'a, Result<SubmitResponse, ApiError>> {
        Box::pin(async move {
            let url = self.endpoint("repositories");
            tracing::debug!(
                repository = %request.repository,
                branch = %request.branch,
                "submitting repository for indexing"
            );

            let response = self
                .authorized(self.http.post(&url))
                .json(request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            // An accepted submission sometimes comes back with an empty or
            // non-JSON body; that still counts as accepted.
            let accepted: SubmitResponse = serde_json::from_str(&body).unwrap_or_default();
            if let Some(endpoint) = &accepted.status_endpoint {
                tracing::debug!(%endpoint, "submission accepted");
            }
            Ok(accepted)
        })
    }

    fn query<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<SearchResult, ApiError>> {
        Box::pin(async move {
            let url = self.endpoint("query");
            tracing::debug!(
                repositories = request.repositories.len(),
                "sending query"
            );

            let response = self
                .authorized(self.http.post(&url))
                .json(request)
                .send()
                .await?;
            read_json(response).await
        })
    }
}
