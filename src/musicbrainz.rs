//! # MusicBrainz search client
//!
//! Queries the MusicBrainz web service (v2, JSON format) and reshapes artist and
//! release results into the catalog's reduced schema. Results without a country
//! are dropped.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("musicbrainz request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("musicbrainz answered with status {status}")]
    Upstream { status: u16, payload: Option<Value> },
}

impl SearchError {
    /// Body returned by MusicBrainz alongside a failure, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            SearchError::Upstream { payload, .. } => payload.as_ref(),
            SearchError::Http(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lifespan {
    pub begin: Option<String>,
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistMatch {
    pub id: String,
    pub name: String,
    pub lifespan: Option<Lifespan>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseMatch {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub year: Option<String>,
    pub country: Option<String>,
    pub tracks: Option<u32>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    artists: Vec<RawArtist>,
}

#[derive(Debug, Deserialize)]
struct RawArtist {
    id: String,
    name: String,
    #[serde(rename = "life-span")]
    life_span: Option<RawLifespan>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLifespan {
    begin: Option<String>,
    end: Option<String>,
    ended: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseSearchResponse {
    #[serde(default)]
    releases: Vec<RawRelease>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    id: String,
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<RawCredit>,
    date: Option<String>,
    country: Option<String>,
    #[serde(rename = "track-count")]
    track_count: Option<u32>,
    #[serde(default)]
    media: Vec<RawMedium>,
}

#[derive(Debug, Deserialize)]
struct RawCredit {
    artist: RawCreditArtist,
}

#[derive(Debug, Deserialize)]
struct RawCreditArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawMedium {
    format: Option<String>,
}

/// Four-digit year of a MusicBrainz partial date (`YYYY`, `YYYY-MM` or
/// `YYYY-MM-DD`).
pub fn year_of(date: &str) -> Option<String> {
    let padded = match date.len() {
        4 => format!("{}-01-01", date),
        7 => format!("{}-01", date),
        _ => date.to_owned(),
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
        .ok()
        .map(|day| format!("{:04}", day.year()))
}

/// Reduces a date to its year, leaving unparseable values untouched.
fn shorten(date: Option<String>) -> Option<String> {
    date.map(|date| year_of(&date).unwrap_or(date))
}

pub fn reshape_artists(response: ArtistSearchResponse) -> Vec<ArtistMatch> {
    response
        .artists
        .into_iter()
        .filter(|artist| artist.country.is_some())
        .map(|artist| ArtistMatch {
            id: artist.id,
            name: artist.name,
            lifespan: artist.life_span.map(|span| Lifespan {
                begin: shorten(span.begin),
                end: shorten(span.end),
                ended: span.ended,
            }),
            country: artist.country,
        })
        .collect()
}

pub fn reshape_releases(response: ReleaseSearchResponse) -> Vec<ReleaseMatch> {
    response
        .releases
        .into_iter()
        .filter(|release| release.country.is_some())
        .map(|release| ReleaseMatch {
            id: release.id,
            title: release.title,
            artist: release
                .artist_credit
                .into_iter()
                .next()
                .map(|credit| credit.artist.name),
            year: shorten(release.date),
            country: release.country,
            tracks: release.track_count,
            format: release.media.into_iter().next().and_then(|m| m.format),
        })
        .collect()
}

#[async_trait]
pub trait MetadataSearch: Send + Sync {
    async fn artists(&self, query: &str) -> Result<Vec<ArtistMatch>, SearchError>;
    async fn albums(&self, query: &str) -> Result<Vec<ReleaseMatch>, SearchError>;
}

#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    http: reqwest::Client,
    base_url: String,
}

impl MusicBrainzClient {
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        // MusicBrainz rejects anonymous clients, so the user agent is mandatory.
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(MusicBrainzClient {
            http,
            base_url: config.musicbrainz_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn search<T: DeserializeOwned>(&self, entity: &str, query: &str) -> Result<T, SearchError> {
        let url = format!("{}/{}", self.base_url, entity);
        info!("GET {} query={}", url, query);

        let response = self
            .http
            .get(&url)
            .query(&[("query", query), ("fmt", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload = response.json::<Value>().await.ok();
            warn!("musicbrainz returned {} for {}", status, url);
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                payload,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MetadataSearch for MusicBrainzClient {
    #[instrument(skip(self))]
    async fn artists(&self, query: &str) -> Result<Vec<ArtistMatch>, SearchError> {
        let response: ArtistSearchResponse = self.search("artist", query).await?;
        Ok(reshape_artists(response))
    }

    #[instrument(skip(self))]
    async fn albums(&self, query: &str) -> Result<Vec<ReleaseMatch>, SearchError> {
        let response: ReleaseSearchResponse = self.search("release", query).await?;
        Ok(reshape_releases(response))
    }
}
