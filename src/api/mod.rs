//! HTTP handlers. Each handler turns every outcome, failures included, into a
//! response envelope; `Err` is reserved for the runtime itself.

use std::fmt::Display;

use http::StatusCode;
use lambda_http::{Body, Request, RequestExt, Response};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::utils::{json_response, response};

pub mod artists;
pub mod musicbrainz;

pub use crate::alb::{HandlerResponse, E};

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body is empty")]
    Empty,
    #[error("invalid payload, cannot parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_body<T: DeserializeOwned>(event: &Request) -> Result<T, BodyError> {
    let body: &[u8] = event.body();
    if body.is_empty() {
        return Err(BodyError::Empty);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Unparseable bodies are treated as an empty payload; the handler's own
/// required-field checks decide what happens next.
pub(crate) fn body_or_default<T: DeserializeOwned + Default>(event: &Request) -> T {
    parse_body(event).unwrap_or_else(|err| {
        warn!("{}", err);
        T::default()
    })
}

/// Field deserializer that reads a value of the wrong type as absent, so one
/// bad field does not discard the rest of the payload.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

pub(crate) fn path_param(event: &Request, name: &str) -> String {
    event
        .path_parameters()
        .first(name)
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

/// Response whose body is a bare JSON string, e.g. `"Not Found"`.
pub(crate) fn message(status_code: StatusCode, text: &str) -> Response<Body> {
    json_response(status_code, text)
}

pub(crate) fn not_found() -> Response<Body> {
    message(StatusCode::NOT_FOUND, "Not Found")
}

pub(crate) fn server_error(err: impl Display) -> Response<Body> {
    error!("{}", err);
    response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": err.to_string() }).to_string(),
    )
}
