use std::{collections::HashMap, future::Future};

use futures::{future::BoxFuture, FutureExt};
use http::{Method, StatusCode};
use lambda_http::{Body, Request, RequestExt, Response};
use matchit::{InsertError, Router};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::utils::response;

pub type E = lambda_http::Error;

pub type HandlerResponse = Result<Response<Body>, E>;

/// represents for a functional ALB request handler.
pub type RequestHandler = fn(Request) -> HandlerResponse;
pub type BoxedHandler<'a> =
    Box<dyn Fn(Request) -> BoxFuture<'a, HandlerResponse> + Send + Sync + 'a>;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no router for method {0}")]
    UnsupportedMethod(Method),
    #[error(transparent)]
    Insert(#[from] InsertError),
}

/// specialises the matchit.Router to work with ALB and API Gateway lambda targets.
pub struct AlbRouter<'b> {
    routers: HashMap<Method, Router<BoxedHandler<'b>>>,
    not_found: RequestHandler,
}

impl<'c> AlbRouter<'c> {
    pub fn new() -> Self {
        AlbRouter::new_with_default(not_found)
    }

    pub fn new_with_default(not_found: RequestHandler) -> Self {
        let routers: HashMap<Method, Router<BoxedHandler>> = HashMap::from([
            (Method::DELETE, Router::new()),
            (Method::GET, Router::new()),
            (Method::HEAD, Router::new()),
            (Method::OPTIONS, Router::new()),
            (Method::PATCH, Router::new()),
            (Method::POST, Router::new()),
            (Method::PUT, Router::new()),
        ]);

        AlbRouter { routers, not_found }
    }

    /// Registers `handler` for `method` on a matchit route such as
    /// `/artists/{artistId}/albums`.
    pub fn insert<F, Fut>(
        &mut self,
        method: Method,
        route: impl Into<String>,
        handler: F,
    ) -> Result<(), RouteError>
    where
        F: 'c + Send + Sync + (Fn(Request) -> Fut),
        Fut: 'c + Send + Future<Output = HandlerResponse>,
    {
        let router = self
            .routers
            .get_mut(&method)
            .ok_or(RouteError::UnsupportedMethod(method))?;

        router.insert(route, Box::new(move |request| handler(request).boxed()))?;
        Ok(())
    }

    pub async fn handle(&self, request: Request) -> HandlerResponse {
        // raw_http_path is only populated for API Gateway events.
        let raw_path = request.raw_http_path().to_string();
        let path = if raw_path.is_empty() {
            request.uri().path().to_owned()
        } else {
            raw_path
        };
        info!("{} {}", request.method(), path);

        let not_found_handler = &self.not_found;
        let router = match self.routers.get(request.method()) {
            Some(router) => router,
            None => return not_found_handler(request),
        };

        let matched = match router.at(&path) {
            Ok(matched) => matched,
            Err(_) => return not_found_handler(request),
        };

        let handler = matched.value;
        let params: HashMap<String, Vec<String>> = matched
            .params
            .iter()
            .map(|(key, val)| (key.to_owned(), vec![val.to_owned()]))
            .collect();
        info!("path_parameters: {:?}", params);

        let event = request.with_path_parameters(params);
        handler(event).await
    }
}

impl Default for AlbRouter<'_> {
    fn default() -> Self {
        AlbRouter::new()
    }
}

pub fn not_found(event: Request) -> HandlerResponse {
    let body = json!({
        "error": format!("endpoint {} not found", event.uri().path()),
    })
    .to_string();
    Ok(response(StatusCode::NOT_FOUND, body))
}
