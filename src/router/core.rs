//! Router core module - path matching for every request.

use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 4;

/// Stack-allocated path parameter storage.
///
/// Param names use `Arc<str>` because they come from the static route table
/// and are cloned into every match.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One entry of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Pattern with `{name}` placeholders, e.g. `/shift_daily/{id}`
    pub path_pattern: String,
    /// Name of the dispatcher handler serving this route
    pub handler_name: String,
}

impl RouteMeta {
    #[must_use]
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Percent-decoded path parameters (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name repeats in the pattern.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    regex: Regex,
    param_names: Vec<Arc<str>>,
    meta: RouteMeta,
}

/// Router matching requests against an ordered route table.
///
/// Routes are tried in declaration order and the first match wins, so
/// specific routes (`/shift_daily/{id}`) must be declared before generic
/// ones (`/{collection}/{id}`).
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Compile the route table.
    ///
    /// # Errors
    ///
    /// Returns the regex error for a pattern that does not compile.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        let compiled = routes
            .into_iter()
            .map(|meta| {
                let (regex, param_names) = Self::path_to_regex(&meta.path_pattern)?;
                Ok(CompiledRoute {
                    regex,
                    param_names,
                    meta,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let routes_summary: Vec<String> = compiled
            .iter()
            .map(|r| format!("{} {} -> {}", r.meta.method, r.meta.path_pattern, r.meta.handler_name))
            .collect();
        info!(
            routes_count = compiled.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self { routes: compiled })
    }

    /// Match an HTTP request to a route.
    ///
    /// A single trailing slash is ignored (`/shift_daily/` matches `/shift_daily`).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        for route in self.routes.iter().filter(|r| r.meta.method == *method) {
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            let mut path_params = ParamVec::new();
            for (idx, name) in route.param_names.iter().enumerate() {
                let raw = caps.get(idx + 1).map_or("", |m| m.as_str());
                let value = urlencoding::decode(raw)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                path_params.push((Arc::clone(name), value));
            }
            debug!(
                method = %method,
                path = %path,
                handler_name = %route.meta.handler_name,
                route_pattern = %route.meta.path_pattern,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                path_params,
                handler_name: route.meta.handler_name.clone(),
            });
        }

        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Convert a path pattern to an anchored regex and its parameter names
    ///
    /// `/users/{id}` becomes `^/users/([^/]+)$` with params `["id"]`. Static
    /// segments are escaped.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(name));
            } else {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}
