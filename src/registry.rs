//! Route table and handler registration.
//!
//! Order matters: the router takes the first match, so the `shift_daily`
//! and `find_all_menu` routes shadow the generic `/{collection}` ones.

use http::Method;

use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::handlers::{collections, menu, shift_daily};
use crate::router::{RouteMeta, Router};

pub type HandlerFn = fn(&HandlerRequest) -> HandlerResponse;

/// One route: method, path pattern, handler name, handler.
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub name: &'static str,
    pub handler: HandlerFn,
}

fn entry(method: Method, path: &'static str, name: &'static str, handler: HandlerFn) -> RouteEntry {
    RouteEntry {
        method,
        path,
        name,
        handler,
    }
}

/// Every route served, in match order.
#[must_use]
pub fn route_table() -> Vec<RouteEntry> {
    vec![
        entry(Method::GET, "/shift_daily", "list_shift_daily", shift_daily::list_shift_daily),
        entry(Method::GET, "/shift_daily/{id}", "get_shift_daily", shift_daily::get_shift_daily),
        entry(Method::GET, "/find_all_menu", "find_all_menu", menu::find_all_menu),
        entry(Method::GET, "/{collection}", "list_collection", collections::list_collection),
        entry(Method::GET, "/{collection}/{id}", "get_record", collections::get_record),
        entry(Method::POST, "/{collection}", "create_record", collections::create_record),
        entry(Method::PUT, "/{collection}/{id}", "replace_record", collections::replace_record),
        entry(Method::PATCH, "/{collection}/{id}", "patch_record", collections::patch_record),
        entry(Method::DELETE, "/{collection}/{id}", "delete_record", collections::delete_record),
        entry(Method::PUT, "/{collection}", "replace_singular", collections::replace_singular),
        entry(Method::PATCH, "/{collection}", "patch_singular", collections::patch_singular),
    ]
}

/// Route metadata for [`Router::new`].
#[must_use]
pub fn routes() -> Vec<RouteMeta> {
    route_table()
        .iter()
        .map(|e| RouteMeta::new(e.method.clone(), e.path, e.name))
        .collect()
}

/// Compile the router over [`routes`].
///
/// # Errors
///
/// Returns the regex error if a pattern fails to compile.
pub fn build_router() -> Result<Router, regex::Error> {
    Router::new(routes())
}

/// Spawn one handler coroutine per route.
///
/// # Safety
///
/// Spawns `may` coroutines; the runtime must be configured first.
pub unsafe fn register_all(dispatcher: &mut Dispatcher) {
    for RouteEntry { name, handler, .. } in route_table() {
        dispatcher.register_handler(name, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_routes_shadow_fallback() {
        let router = build_router().unwrap();
        let cases = [
            (Method::GET, "/shift_daily", "list_shift_daily"),
            (Method::GET, "/shift_daily/abc", "get_shift_daily"),
            (Method::GET, "/find_all_menu", "find_all_menu"),
            (Method::GET, "/posts", "list_collection"),
            (Method::POST, "/shift_daily", "create_record"),
            (Method::PUT, "/shift_daily/abc", "replace_record"),
            (Method::PATCH, "/profile", "patch_singular"),
        ];
        for (method, path, handler) in cases {
            let m = router.route(&method, path).unwrap();
            assert_eq!(m.handler_name, handler, "{method} {path}");
        }
        assert!(router.route(&Method::DELETE, "/posts").is_none());
    }

    #[test]
    fn test_handler_names_unique() {
        let table = route_table();
        let mut names: Vec<&str> = table.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), table.len());
    }
}
