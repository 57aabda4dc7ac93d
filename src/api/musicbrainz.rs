use http::StatusCode;
use lambda_http::{Body, Request, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::{body_or_default, message, HandlerResponse};
use crate::musicbrainz::{MetadataSearch, ReleaseMatch, SearchError};
use crate::utils::{response, uniq_by};

/// Fixed filters of every album search.
pub const ALBUM_FILTERS: [&str; 2] = [r#"country:"US""#, r#"status:"official""#];

#[derive(Debug, Default, Deserialize)]
struct ArtistSearchRequest {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AlbumSearchRequest {
    title: Option<String>,
    artist: Option<String>,
}

/// Prefix query on the artist name, spaces escaped for Lucene.
pub fn artist_query(name: &str) -> String {
    format!("artist:{}*", name.replace(' ', "\\ "))
}

pub fn album_query(title: Option<&str>, artist: Option<&str>) -> String {
    let mut parts: Vec<String> = ALBUM_FILTERS.iter().map(|f| f.to_string()).collect();
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        parts.push(format!("release:{}*", title));
    }
    if let Some(artist) = artist.filter(|a| !a.is_empty()) {
        parts.push(format!("artist:{}*", artist));
    }
    parts.join(" AND ")
}

fn same_release(a: &ReleaseMatch, b: &ReleaseMatch) -> bool {
    a.title == b.title
        && a.artist == b.artist
        && a.country == b.country
        && a.year == b.year
        && a.tracks == b.tracks
        && a.format == b.format
}

/// Collapses releases that look identical to a collector even when they are
/// distinct MusicBrainz entries.
pub fn dedup_releases(releases: Vec<ReleaseMatch>) -> Vec<ReleaseMatch> {
    uniq_by(releases, same_release)
}

fn pretty<T: Serialize>(value: &T) -> Response<Body> {
    match serde_json::to_string_pretty(value) {
        Ok(body) => response(StatusCode::OK, body),
        Err(err) => super::server_error(err),
    }
}

fn search_failed(err: SearchError) -> Response<Body> {
    error!("{}", err);
    let body = err
        .payload()
        .map(|payload| payload.to_string())
        .unwrap_or_else(|| "null".to_owned());
    response(StatusCode::INTERNAL_SERVER_ERROR, body)
}

/// `POST /musicbrainz/artists`
#[instrument(skip(search))]
pub async fn artists<M: MetadataSearch + ?Sized>(search: &M, event: Request) -> HandlerResponse {
    let req: ArtistSearchRequest = body_or_default(&event);
    let name = match req.name.filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => return Ok(message(StatusCode::BAD_REQUEST, "Name is required")),
    };

    match search.artists(&artist_query(&name)).await {
        Ok(artists) => {
            info!("{} artists matched", artists.len());
            Ok(pretty(&artists))
        }
        Err(err) => Ok(search_failed(err)),
    }
}

/// `POST /musicbrainz/albums`
#[instrument(skip(search))]
pub async fn albums<M: MetadataSearch + ?Sized>(search: &M, event: Request) -> HandlerResponse {
    let req: AlbumSearchRequest = body_or_default(&event);
    let query = album_query(req.title.as_deref(), req.artist.as_deref());

    match search.albums(&query).await {
        Ok(releases) => {
            let releases = dedup_releases(releases);
            info!("{} distinct releases matched", releases.len());
            Ok(pretty(&releases))
        }
        Err(err) => Ok(search_failed(err)),
    }
}
