use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::repos::RepoError, infra::error::InfraError};

/// Diagnostic attached to a response's extensions and logged by the
/// response middleware. Operators only ever see the public message.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    /// Capture `error` and every `source()` beneath it, outermost first.
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }

    /// Outermost message, used as the log line's `detail`.
    pub fn detail(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A plain-text error response: a fixed public message for the body and a
/// report carrying the real cause for the logs.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self::with_report(
            status,
            public_message,
            ErrorReport::from_message(source, detail),
        )
    }

    pub fn with_report(
        status: StatusCode,
        public_message: &'static str,
        report: ErrorReport,
    ) -> Self {
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Failures that end a CLI command or the server start-up.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_walks_the_source_chain() {
        let io = std::io::Error::other("disk full");
        let err = AppError::from(InfraError::from(io));

        let report = ErrorReport::from_error("tests", &err);
        assert_eq!(report.messages, ["io error: disk full", "disk full"]);
        assert_eq!(report.detail(), Some("io error: disk full"));
    }

    #[test]
    fn http_error_body_hides_the_detail() {
        let err = HttpError::new(
            "tests",
            StatusCode::SERVICE_UNAVAILABLE,
            "Upstream unavailable",
            "connect to 10.0.0.7:8080 refused",
        );
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = err.into_response();
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.detail(), Some("connect to 10.0.0.7:8080 refused"));
    }
}
