//! `GET /shift_daily` and `GET /shift_daily/{id}`.

use anyhow::Context;
use std::sync::LazyLock;

use super::snapshot_of;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::shift::{ShiftPage, ShiftQuery, ShiftQueryEngine};
use crate::store::schema::SHIFT_DAILY;

pub const LIST_ERROR_MESSAGE: &str = "Error processing shift data";
pub const GET_ERROR_MESSAGE: &str = "Error retrieving resource";

static ENGINE: LazyLock<ShiftQueryEngine> = LazyLock::new(ShiftQueryEngine::default);

/// Filtered, searched, sorted and paginated listing.
pub fn list_shift_daily(req: &HandlerRequest) -> HandlerResponse {
    match run_listing(req) {
        Ok(page) => Envelope::success(page).into_response(),
        Err(e) => ApiError::internal(LIST_ERROR_MESSAGE, e).into_response(),
    }
}

fn run_listing(req: &HandlerRequest) -> anyhow::Result<ShiftPage> {
    let snapshot = snapshot_of(req)?;
    let records = snapshot
        .collection(SHIFT_DAILY)
        .context("loading shift_daily")?;
    let query = ShiftQuery::from_params(&req.query_params);
    Ok(ENGINE.run(records, &query)?)
}

/// Single record by exact string `id`.
pub fn get_shift_daily(req: &HandlerRequest) -> HandlerResponse {
    let snapshot = match snapshot_of(req) {
        Ok(snapshot) => snapshot,
        Err(e) => return ApiError::internal(GET_ERROR_MESSAGE, e).into_response(),
    };
    let id = req.get_path_param("id").unwrap_or_default();
    match snapshot.find_by_id(SHIFT_DAILY, id) {
        Some(record) => Envelope::success(record).into_response(),
        None => ApiError::NotFound.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{request, store_with};
    use http::Method;
    use serde_json::{json, Value};

    fn db() -> Value {
        json!({
            "shift_daily": [
                { "id": "a", "shift_code": "MORNING", "day_type": "Working Day", "created_at": "2024-01-01T00:00:00.000Z" },
                { "id": "b", "shift_code": "NIGHT", "day_type": "OFF", "created_at": "2024-01-03T00:00:00.000Z" },
                { "id": "c", "shift_code": "EVENING", "day_type": "Working Day", "created_at": "2024-01-02T00:00:00.000Z" }
            ]
        })
    }

    #[test]
    fn test_list_envelope_and_meta() {
        let (_dir, store) = store_with(&db());
        let req = request(&store, Method::GET, "/shift_daily", &[]).with_query(vec![
            ("filter_day_type".into(), "true".into()),
            ("_limit".into(), "1".into()),
        ]);
        let res = list_shift_daily(&req);
        assert_eq!(res.status, 200);
        assert_eq!(res.body["code"], 200);
        assert_eq!(res.body["message"], "success");
        assert_eq!(
            res.body["data"]["meta"],
            json!({ "current_page": 1, "per_page": 1, "total_page": 2, "total_data": 2 })
        );
        assert_eq!(res.body["data"]["results"][0]["id"], "c");
    }

    #[test]
    fn test_list_search_failure_is_internal_error() {
        let (_dir, store) = store_with(&json!({ "shift_daily": [{ "id": "x" }] }));
        let req = request(&store, Method::GET, "/shift_daily", &[])
            .with_query(vec![("search".into(), "mor".into())]);
        let res = list_shift_daily(&req);
        assert_eq!(res.status, 500);
        assert_eq!(
            res.body,
            json!({ "code": 500, "message": "Error processing shift data", "data": null })
        );
    }

    #[test]
    fn test_list_without_collection_is_internal_error() {
        let (_dir, store) = store_with(&json!({ "posts": [] }));
        let res = list_shift_daily(&request(&store, Method::GET, "/shift_daily", &[]));
        assert_eq!(res.status, 500);
        assert_eq!(res.body["message"], LIST_ERROR_MESSAGE);
    }

    #[test]
    fn test_get_found_and_missing() {
        let (_dir, store) = store_with(&db());
        let res = get_shift_daily(&request(&store, Method::GET, "/shift_daily/b", &[("id", "b")]));
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["shift_code"], "NIGHT");

        let res = get_shift_daily(&request(
            &store,
            Method::GET,
            "/shift_daily/abc123",
            &[("id", "abc123")],
        ));
        assert_eq!(res.status, 404);
        assert_eq!(
            res.body,
            json!({ "code": 404, "message": "Resource not found", "data": null })
        );
    }
}
