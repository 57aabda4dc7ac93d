use std::time;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_smithy_types::timeout::TimeoutConfig;
use http::{
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
    HeaderValue,
};
use lambda_http::{http::StatusCode, Body, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::config::Config;

pub fn setup_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
}

pub async fn setup_sdk_config(config: &Config) -> SdkConfig {
    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(time::Duration::from_secs(2))
        .operation_attempt_timeout(time::Duration::from_secs(2))
        .read_timeout(time::Duration::from_secs(2))
        .connect_timeout(time::Duration::from_secs(2))
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.sdk_region().to_owned()))
        .timeout_config(timeout_config);

    if let Some(endpoint) = &config.dynamo_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}

/// Builds the response envelope shared by every handler: JSON body plus a
/// permissive CORS header.
pub fn response(status_code: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::Text(body));
    *response.status_mut() = status_code;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    response
}

/// Serializes `value` into an envelope, falling back to a 500 if that fails.
pub fn json_response<T: Serialize + ?Sized>(status_code: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_string(value) {
        Ok(body) => response(status_code, body),
        Err(err) => {
            error!("cannot serialize response body: {}", err);
            response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }).to_string(),
            )
        }
    }
}

/// Random v4 identifier for new artists and albums.
pub fn uuidv4() -> String {
    Uuid::new_v4().to_string()
}

/// Drops every element the probe considers equal to an earlier one. Order is
/// preserved and the first occurrence wins.
pub fn uniq_by<T, F>(items: Vec<T>, same: F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !kept.iter().any(|seen| same(seen, &item)) {
            kept.push(item);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_cors_and_content_type() {
        let resp = response(StatusCode::OK, "\"OK\"".to_owned());

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(resp.body(), &Body::Text("\"OK\"".to_owned()));
    }

    #[test]
    fn json_response_serializes_strings_as_json() {
        let resp = json_response(StatusCode::NOT_FOUND, "Not Found");

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body(), &Body::Text("\"Not Found\"".to_owned()));
    }

    #[test]
    fn uuidv4_is_a_v4_uuid() {
        let id = uuidv4();
        let parsed = Uuid::parse_str(&id).expect("valid uuid");

        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(id, uuidv4());
    }

    #[test]
    fn uniq_by_keeps_first_occurrence() {
        let items = vec![(1, 'a'), (2, 'b'), (1, 'c'), (3, 'd'), (2, 'e')];
        let kept = uniq_by(items, |x, y| x.0 == y.0);

        assert_eq!(kept, vec![(1, 'a'), (2, 'b'), (3, 'd')]);
    }

    #[test]
    fn uniq_by_with_identity_probe() {
        let kept = uniq_by(vec!["x", "y", "x", "x"], |a, b| a == b);
        assert_eq!(kept, vec!["x", "y"]);
    }
}
