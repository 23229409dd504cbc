//! # Router Module
//!
//! Path matching and route resolution.
//!
//! Path patterns (`/shift_daily/{id}`, `/{collection}`) are compiled into
//! anchored regexes at startup. For each request the table is scanned in
//! declaration order and the first route whose method and pattern match
//! wins, returning the route metadata and the decoded path parameters.
//!
//! ```rust
//! use http::Method;
//! use shiftdesk::router::{RouteMeta, Router};
//!
//! let router = Router::new(vec![
//!     RouteMeta::new(Method::GET, "/shift_daily/{id}", "get_shift_daily"),
//!     RouteMeta::new(Method::GET, "/{collection}/{id}", "get_record"),
//! ])
//! .unwrap();
//!
//! let m = router.route(&Method::GET, "/shift_daily/abc").unwrap();
//! assert_eq!(m.handler_name, "get_shift_daily");
//! assert_eq!(m.get_path_param("id"), Some("abc"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
