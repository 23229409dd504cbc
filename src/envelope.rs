//! The uniform `{ code, message, data }` wrapper used by the shift and menu routes.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

use crate::dispatcher::HandlerResponse;

pub const SUCCESS_MESSAGE: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: Cow<'static, str>,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// `200` with `message: "success"`.
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: Cow::Borrowed(SUCCESS_MESSAGE),
            data: Some(data),
        }
    }

    /// Serialize into a handler response whose HTTP status mirrors `code`.
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        let status = self.code;
        match serde_json::to_value(&self) {
            Ok(body) => HandlerResponse::json(status, body),
            Err(e) => {
                tracing::error!(error = %e, "Envelope serialization failed");
                Envelope::error(500, "An unexpected error occurred").into_response()
            }
        }
    }
}

impl Envelope<Value> {
    /// Error envelope with `data: null`.
    #[must_use]
    pub fn error(code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let res = Envelope::success(json!({ "id": "a" })).into_response();
        assert_eq!(res.status, 200);
        assert_eq!(
            res.body,
            json!({ "code": 200, "message": "success", "data": { "id": "a" } })
        );
    }

    #[test]
    fn test_error_has_null_data() {
        let res = Envelope::error(404, "Resource not found").into_response();
        assert_eq!(res.status, 404);
        assert_eq!(
            res.body,
            json!({ "code": 404, "message": "Resource not found", "data": null })
        );
    }
}
