//! `GET /find_all_menu`: the whole resource, unmodified.

use serde_json::Value;

use super::snapshot_of;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::store::schema::FIND_ALL_MENU;
use crate::store::Resource;

pub const MENU_ERROR_MESSAGE: &str = "Error retrieving menu data";

/// A missing `find_all_menu` key yields `data: null`.
pub fn find_all_menu(req: &HandlerRequest) -> HandlerResponse {
    match snapshot_of(req) {
        Ok(snapshot) => {
            let menu = snapshot
                .resource(FIND_ALL_MENU)
                .map_or(Value::Null, Resource::to_value);
            Envelope::success(menu).into_response()
        }
        Err(e) => ApiError::internal(MENU_ERROR_MESSAGE, e).into_response(),
    }
}
