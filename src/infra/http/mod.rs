mod admin;
mod middleware;
pub mod session;

pub use admin::{AdminState, build_admin_router};

use crate::application::error::ErrorReport;
use crate::application::error::HttpError;
use crate::application::repos::RepoError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

fn upstream_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error("infra::http::upstream_health", &err)
                .attach(&mut response);
            response
        }
    }
}

/// Map a repository error to a consistent HTTP error response.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::Duplicate { constraint } => {
            HttpError::new(source, StatusCode::CONFLICT, "Duplicate record", constraint)
        }
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::Integrity { message } => HttpError::new(
            source,
            StatusCode::BAD_GATEWAY,
            "Unexpected upstream response",
            message,
        ),
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Upstream timeout",
            "GraphQL request timed out",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Upstream unavailable",
            message,
        ),
    }
}

/// Status used when a page renders a repository failure inline.
pub(crate) fn repo_error_status(err: &RepoError) -> StatusCode {
    match err {
        RepoError::NotFound => StatusCode::NOT_FOUND,
        RepoError::Integrity { .. } => StatusCode::BAD_GATEWAY,
        RepoError::Duplicate { .. } => StatusCode::CONFLICT,
        RepoError::Timeout | RepoError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Operator-facing summary of a repository failure. Upstream URLs and raw
/// GraphQL messages stay in the attached `ErrorReport`.
pub(crate) fn repo_error_summary(err: &RepoError) -> &'static str {
    match err {
        RepoError::Duplicate { .. } => "duplicate record",
        RepoError::NotFound => "record not found",
        RepoError::Integrity { .. } => "the data service returned an unexpected response",
        RepoError::Timeout => "the data service timed out",
        RepoError::Persistence(_) => "the data service is unavailable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_do_not_leak_upstream_detail() {
        let err = RepoError::Persistence(
            "error sending request for url (http://10.0.0.7:8080/v1/graphql)".to_string(),
        );
        assert_eq!(repo_error_summary(&err), "the data service is unavailable");
        assert_eq!(repo_error_status(&err), StatusCode::SERVICE_UNAVAILABLE);

        let err = RepoError::Integrity {
            message: "field 'audit_trail' not found in type: 'query_root'".to_string(),
        };
        assert!(!repo_error_summary(&err).contains("audit_trail"));
        assert_eq!(repo_error_status(&err), StatusCode::BAD_GATEWAY);
    }
}
