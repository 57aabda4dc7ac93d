//! Process configuration, read once from the environment at cold start.

use std::env;

use thiserror::Error;

pub const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_USER_AGENT: &str = concat!("album-catalog/", env!("CARGO_PKG_VERSION"));

/// `AWS_REGION=localhost` points the store at DynamoDB Local.
pub const LOCAL_REGION: &str = "localhost";
pub const LOCAL_DYNAMO_ENDPOINT: &str = "http://localhost:8000";
const LOCAL_SIGNING_REGION: &str = "us-east-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub region: String,
    pub table_name: String,
    pub dynamo_endpoint: Option<String>,
    pub musicbrainz_url: String,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let region = get("AWS_REGION").ok_or(ConfigError::Missing("AWS_REGION"))?;
        let table_name = get("ARTISTS_TABLE").ok_or(ConfigError::Missing("ARTISTS_TABLE"))?;
        let dynamo_endpoint = get("AWS_DYNAMO_ENDPOINT")
            .or_else(|| (region == LOCAL_REGION).then(|| LOCAL_DYNAMO_ENDPOINT.to_owned()));

        Ok(Config {
            region,
            table_name,
            dynamo_endpoint,
            musicbrainz_url: get("MUSICBRAINZ_URL")
                .unwrap_or_else(|| DEFAULT_MUSICBRAINZ_URL.to_owned()),
            user_agent: get("MUSICBRAINZ_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        })
    }

    pub fn is_local(&self) -> bool {
        self.region == LOCAL_REGION
    }

    /// Region handed to the SDK for request signing.
    pub fn sdk_region(&self) -> &str {
        if self.is_local() {
            LOCAL_SIGNING_REGION
        } else {
            &self.region
        }
    }
}
