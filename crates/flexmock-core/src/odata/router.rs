//! Route table mapping method and URL shape to a handler.

use crate::odata::request::HttpMethod;
use regex::Regex;

/// What a matched route asks the service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Batch,
    Metadata,
    Count,
    Query,
    Update,
    Delete,
    Create,
    Reset,
}

/// A matched route together with the entity key captured from the URL, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub handler: Handler,
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
struct Route {
    method: HttpMethod,
    pattern: Regex,
    handler: Handler,
}

/// Routes evaluated in priority order; the first match wins.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Route table of the TripPin `People` service.
    pub fn people_service() -> Self {
        let entity = r"People\('(.+)'\)";
        let table = [
            (HttpMethod::Post, r"\$batch$", Handler::Batch),
            (HttpMethod::Get, r"\$metadata", Handler::Metadata),
            (HttpMethod::Get, r"/\$count", Handler::Count),
            (HttpMethod::Get, r"People\?", Handler::Query),
            (HttpMethod::Patch, entity, Handler::Update),
            (HttpMethod::Delete, entity, Handler::Delete),
            (HttpMethod::Post, r"People/?(\?.*)?$", Handler::Create),
            (HttpMethod::Post, r"ResetDataSource", Handler::Reset),
        ];

        let routes = table
            .into_iter()
            .map(|(method, pattern, handler)| Route {
                method,
                pattern: Regex::new(pattern).expect("valid route pattern"),
                handler,
            })
            .collect();

        Self { routes }
    }

    /// Find the first route matching method and URL.
    pub fn resolve(&self, method: HttpMethod, url: &str) -> Option<RouteMatch> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                let caps = route.pattern.captures(url)?;
                let key = match route.handler {
                    Handler::Update | Handler::Delete => {
                        caps.get(1).map(|m| m.as_str().to_string())
                    }
                    _ => None,
                };
                Some(RouteMatch {
                    handler: route.handler,
                    key,
                })
            })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::people_service()
    }
}
