//! HTTP client for the Hasura-style GraphQL data API.

use std::time::Instant;

use metrics::{counter, histogram};
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use rudra_api_types::{GraphQlRequest, GraphQlResponse};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

use crate::application::repos::RepoError;
use crate::config::GraphQlSettings;
use crate::infra::error::InfraError;

pub mod operations;
mod repos;

pub use operations::Operation;
pub use repos::HasuraRepositories;

const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";
const CONSTRAINT_VIOLATION: &str = "constraint-violation";

#[derive(Debug, Error)]
pub enum GraphQlError {
    #[error("request timed out")]
    Timeout,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        code: Option<String>,
    },
    #[error("response carried neither data nor errors")]
    MissingData,
}

impl From<GraphQlError> for RepoError {
    fn from(err: GraphQlError) -> Self {
        match err {
            GraphQlError::Timeout => RepoError::Timeout,
            GraphQlError::Upstream { message, code }
                if code.as_deref() == Some(CONSTRAINT_VIOLATION) =>
            {
                RepoError::Duplicate {
                    constraint: message,
                }
            }
            GraphQlError::Decode(message) => RepoError::Integrity { message },
            err @ GraphQlError::MissingData => RepoError::Integrity {
                message: err.to_string(),
            },
            other => RepoError::from_persistence(other),
        }
    }
}

/// Shared GraphQL client; cheap to clone.
#[derive(Clone, Debug)]
pub struct GraphQlClient {
    http: Client,
    endpoint: Url,
}

impl GraphQlClient {
    pub fn new(settings: &GraphQlSettings) -> Result<Self, InfraError> {
        let mut headers = HeaderMap::new();
        if let Some(secret) = settings.admin_secret.as_deref() {
            let mut value = HeaderValue::from_str(secret).map_err(|_| {
                InfraError::configuration("graphql.admin_secret contains invalid header characters")
            })?;
            value.set_sensitive(true);
            headers.insert(ADMIN_SECRET_HEADER, value);
        }

        let http = Client::builder()
            .user_agent(Self::user_agent())
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::graphql(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("rudra/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST `operation` and decode its `data` member.
    pub async fn execute<V, T>(&self, operation: Operation, variables: V) -> Result<T, GraphQlError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let result = self.send(operation, variables).await;
        histogram!("rudra_graphql_request_ms", "operation" => operation.name)
            .record(started.elapsed().as_secs_f64() * 1000.0);

        if let Err(err) = &result {
            counter!("rudra_graphql_error_total", "operation" => operation.name).increment(1);
            tracing::warn!(
                target = "rudra::graphql",
                operation = operation.name,
                error = %err,
                "GraphQL request failed"
            );
        }
        result
    }

    async fn send<V, T>(&self, operation: Operation, variables: V) -> Result<T, GraphQlError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest {
            query: operation.document,
            operation_name: operation.name,
            variables,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(classify_transport)?;
        let envelope = serde_json::from_slice::<GraphQlResponse<T>>(&bytes);

        if !status.is_success() {
            // Hasura reports some failures with a non-2xx status and an error envelope.
            if let Ok(envelope) = envelope
                && let Some(first) = envelope.errors.into_iter().next()
            {
                return Err(upstream(first));
            }
            return Err(GraphQlError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let envelope = envelope.map_err(|err| GraphQlError::Decode(err.to_string()))?;
        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(upstream(first));
        }
        envelope.data.ok_or(GraphQlError::MissingData)
    }
}

fn upstream(entry: rudra_api_types::GraphQlErrorEntry) -> GraphQlError {
    let code = entry.code().map(str::to_string);
    GraphQlError::Upstream {
        message: entry.message,
        code,
    }
}

fn classify_transport(err: reqwest::Error) -> GraphQlError {
    if err.is_timeout() {
        GraphQlError::Timeout
    } else if err.is_decode() {
        GraphQlError::Decode(err.to_string())
    } else {
        GraphQlError::Http(err)
    }
}
