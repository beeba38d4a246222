//! Application failure types.
//!
//! [`ApiError`] is the single failure type request handlers return. The
//! set of variants is closed on purpose: a new failure kind means a new
//! variant with its own status and message mapping, so nothing reaches
//! the wire without a decided presentation.

use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Map;
use thiserror::Error;

use crate::{
    application::envelope::{self, DEFAULT_ERROR_MESSAGE},
    application::repos::RepoError,
    infra::error::InfraError,
};

/// Structured failure details captured for request logging.
///
/// Failure responses carry one of these as an extension. The logging
/// boundary pulls it back out to log the diagnostic chain and rebuild the
/// response body with the request path, so internal detail never lands in
/// the payload itself.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Module that produced the failure.
    pub source: &'static str,
    pub status: StatusCode,
    /// Message safe to show the caller.
    pub public_message: String,
    /// Diagnostic chain, outermost first. Logged, never returned.
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        error: &dyn StdError,
    ) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            public_message: public_message.into(),
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Message shown for failures that carry no message of their own.
pub fn fallback_message(status: StatusCode) -> &'static str {
    if status == StatusCode::NOT_FOUND {
        "Resource not found."
    } else if status.is_client_error() {
        "Request could not be processed."
    } else {
        DEFAULT_ERROR_MESSAGE
    }
}

/// Failures a request handler can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-supplied input failed validation.
    #[error("{0}")]
    Validation(String),
    /// The request was well formed but matched nothing.
    #[error("{0}")]
    NotFound(String),
    /// A repository call failed underneath the handler.
    #[error("{context} failed")]
    Upstream {
        context: &'static str,
        #[source]
        source: RepoError,
    },
    /// Anything that does not fit the other variants.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn upstream(context: &'static str, source: RepoError) -> Self {
        Self::Upstream { context, source }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// HTTP status this failure renders as.
    ///
    /// A repository `NotFound` surfaces as 404 even though the handler
    /// did not decide that itself. Every other repository failure is a
    /// plain 500.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream {
                source: RepoError::NotFound,
                ..
            } => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message included in the response body.
    ///
    /// Validation and not-found failures speak for themselves. Upstream
    /// and unexpected failures fall back to a generic message; their
    /// detail goes to the log through the [`ErrorReport`].
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(message) | ApiError::NotFound(message) => message.clone(),
            ApiError::Upstream { .. } | ApiError::Unexpected(_) => {
                fallback_message(self.http_status()).to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let message = self.public_message();
        let report =
            ErrorReport::from_error("application::error", status, message.clone(), &self);
        let body = envelope::error(&message, status, Map::new());
        let mut response = (status, Json(body)).into_response();
        report.attach(&mut response);
        response
    }
}

/// Failures raised while bootstrapping the process, before request
/// handling exists.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_bad_request_with_own_message() {
        let err = ApiError::validation("Waste name is required.");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Waste name is required.");
    }

    #[test]
    fn repo_not_found_surfaces_as_404() {
        let err = ApiError::upstream("listing waste types", RepoError::NotFound);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Resource not found.");
    }

    #[test]
    fn other_repo_failures_stay_internal() {
        let err = ApiError::upstream(
            "listing waste types",
            RepoError::Persistence("connection refused".to_string()),
        );
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn report_captures_the_source_chain() {
        let err = ApiError::upstream(
            "counting waste items",
            RepoError::Persistence("connection refused".to_string()),
        );
        let report = ErrorReport::from_error(
            "application::error",
            err.http_status(),
            err.public_message(),
            &err,
        );

        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[0], "counting waste items failed");
        assert!(report.messages[1].contains("connection refused"));
        assert_eq!(report.public_message, "Internal server error");
    }

    #[test]
    fn into_response_attaches_a_report() {
        let response = ApiError::not_found("No waste types found.").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("failure responses should carry a report");
        assert_eq!(report.public_message, "No waste types found.");
    }
}
