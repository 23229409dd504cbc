//! Client-facing error taxonomy.
//!
//! Every variant renders as an [`Envelope`] with `data: null`. Causes carried
//! by [`ApiError::Internal`] and [`ApiError::Unhandled`] are for logs only;
//! clients only ever see the generic message.

use tracing::error;

use crate::dispatcher::HandlerResponse;
use crate::envelope::Envelope;

pub const UNAVAILABLE_MESSAGE: &str = "Database is not currently available";
pub const MISSING_BODY_MESSAGE: &str = "Request body is required";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const UNHANDLED_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The datastore has never loaded successfully
    #[error("Database is not currently available")]
    Unavailable,
    /// Write verb without a usable JSON body
    #[error("Request body is required")]
    MissingBody,
    #[error("Resource not found")]
    NotFound,
    /// Failure inside a core handler; `message` is that handler's generic text
    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
    /// Anything that escaped the handlers
    #[error("An unexpected error occurred")]
    Unhandled(anyhow::Error),
}

impl ApiError {
    pub fn internal(message: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            message,
            cause: cause.into(),
        }
    }

    pub fn unhandled(cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Unhandled(cause.into())
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MissingBody => 400,
            ApiError::NotFound => 404,
            ApiError::Unavailable | ApiError::Internal { .. } | ApiError::Unhandled(_) => 500,
        }
    }

    /// Log the cause (for 500s) and render the envelope.
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        match &self {
            ApiError::Internal { message, cause } => {
                error!(error = %format!("{cause:#}"), "{message}");
            }
            ApiError::Unhandled(cause) => {
                error!(error = %format!("{cause:#}"), "Unhandled error");
            }
            _ => {}
        }
        Envelope::error(self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statuses_and_messages() {
        let cases = [
            (ApiError::Unavailable, 500, UNAVAILABLE_MESSAGE),
            (ApiError::MissingBody, 400, MISSING_BODY_MESSAGE),
            (ApiError::NotFound, 404, NOT_FOUND_MESSAGE),
            (
                ApiError::internal("Error processing shift data", anyhow::anyhow!("boom")),
                500,
                "Error processing shift data",
            ),
            (ApiError::unhandled(anyhow::anyhow!("boom")), 500, UNHANDLED_MESSAGE),
        ];
        for (err, status, message) in cases {
            let res = err.into_response();
            assert_eq!(res.status, status);
            assert_eq!(
                res.body,
                json!({ "code": status, "message": message, "data": null })
            );
        }
    }

    #[test]
    fn test_cause_never_reaches_client() {
        let res = ApiError::internal("Error retrieving resource", anyhow::anyhow!("secret path /etc"))
            .into_response();
        assert!(!res.body.to_string().contains("secret"));
    }
}
