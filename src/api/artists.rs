use http::StatusCode;
use lambda_http::Request;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::{
    body_or_default, lenient, message, not_found, path_param, server_error, HandlerResponse,
};
use crate::artists::{ArtistRepository, ArtistSort};
use crate::model::{Album, Artist, Year};
use crate::store::DocumentStore;
use crate::utils::{json_response, uuidv4};

const ALBUM_FIELDS_REQUIRED: &str = "Title, Year and Condition are required";

#[derive(Debug, Default, Deserialize)]
struct CreateArtistRequest {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    albums: Option<Vec<Album>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct UpdateArtistRequest {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AlbumRequest {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    year: Option<Year>,
    #[serde(default, deserialize_with = "lenient")]
    condition: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Title, year and condition of an album payload, present and non-blank.
struct AlbumFields {
    title: String,
    year: Year,
    condition: String,
}

impl AlbumRequest {
    fn required_fields(&self) -> Option<AlbumFields> {
        let title = self.title.clone().filter(|t| !t.is_empty())?;
        let year = self.year.clone().filter(|y| !y.is_blank())?;
        let condition = self.condition.clone().filter(|c| !c.is_empty())?;
        Some(AlbumFields {
            title,
            year,
            condition,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `GET /artists`
#[instrument(skip(repo))]
pub async fn get_all<S: DocumentStore>(repo: &ArtistRepository<S>, event: Request) -> HandlerResponse {
    match repo.get_all(ArtistSort::Name).await {
        Ok(artists) => Ok(json_response(StatusCode::OK, &artists)),
        Err(err) => Ok(server_error(err)),
    }
}

/// `GET /artists/{artistId}`
#[instrument(skip(repo))]
pub async fn get_one<S: DocumentStore>(repo: &ArtistRepository<S>, event: Request) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");

    match repo.get_one(&artist_id).await {
        Ok(Some(artist)) => Ok(json_response(StatusCode::OK, &artist)),
        Ok(None) => Ok(not_found()),
        Err(err) => Ok(server_error(err)),
    }
}

/// `GET /artists/{artistId}/albums`
#[instrument(skip(repo))]
pub async fn get_albums<S: DocumentStore>(
    repo: &ArtistRepository<S>,
    event: Request,
) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");

    match repo.get_one(&artist_id).await {
        Ok(Some(artist)) => Ok(json_response(StatusCode::OK, &artist.albums)),
        Ok(None) => Ok(not_found()),
        Err(err) => Ok(server_error(err)),
    }
}

/// `GET /artists/{artistId}/albums/{albumId}`
#[instrument(skip(repo))]
pub async fn get_album<S: DocumentStore>(
    repo: &ArtistRepository<S>,
    event: Request,
) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");
    let album_id = path_param(&event, "albumId");

    let artist = match repo.get_one(&artist_id).await {
        Ok(Some(artist)) => artist,
        Ok(None) => return Ok(not_found()),
        Err(err) => return Ok(server_error(err)),
    };

    match artist.album(&album_id) {
        Some(album) => Ok(json_response(StatusCode::OK, album)),
        None => Ok(not_found()),
    }
}

/// `DELETE /artists/{artistId}/albums/{albumId}`
#[instrument(skip(repo))]
pub async fn delete_album<S: DocumentStore>(
    repo: &ArtistRepository<S>,
    event: Request,
) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");
    let album_id = path_param(&event, "albumId");

    let artist = match repo.get_one(&artist_id).await {
        Ok(Some(artist)) => artist,
        Ok(None) => return Ok(not_found()),
        Err(err) => return Ok(server_error(err)),
    };

    let before = artist.albums.len();
    let albums: Vec<Album> = artist
        .albums
        .into_iter()
        .filter(|album| album.id != album_id)
        .collect();

    if albums.len() == before {
        return Ok(not_found());
    }

    info!("removing album {} from artist {}", album_id, artist_id);
    match repo.set_albums(&artist_id, albums).await {
        Ok(_) => Ok(message(StatusCode::OK, "OK")),
        Err(err) => Ok(server_error(err)),
    }
}

/// `POST /artists/{artistId}/albums`
///
/// The first album of an artist replaces the (possibly missing) list; later
/// ones are appended in place.
#[instrument(skip(repo))]
pub async fn add_album<S: DocumentStore>(
    repo: &ArtistRepository<S>,
    event: Request,
) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");
    let req: AlbumRequest = body_or_default(&event);

    let fields = match req.required_fields() {
        Some(fields) => fields,
        None => return Ok(message(StatusCode::BAD_REQUEST, ALBUM_FIELDS_REQUIRED)),
    };

    let album = Album {
        id: non_empty(req.id).unwrap_or_else(uuidv4),
        title: fields.title,
        year: Some(fields.year),
        condition: fields.condition,
        extra: req.extra,
    };

    let artist = match repo.get_one(&artist_id).await {
        Ok(Some(artist)) => artist,
        Ok(None) => return Ok(not_found()),
        Err(err) => return Ok(server_error(err)),
    };

    if artist.album(&album.id).is_some() {
        warn!("album {} already exists on artist {}", album.id, artist_id);
        return Ok(message(StatusCode::CONFLICT, "Duplicate Album"));
    }

    let result = if artist.albums.is_empty() {
        repo.set_albums(&artist_id, vec![album]).await
    } else {
        repo.add_album(&artist_id, album).await
    };

    match result {
        Ok(Some(artist)) => Ok(json_response(StatusCode::OK, &artist)),
        Ok(None) => Ok(not_found()),
        Err(err) => Ok(server_error(err)),
    }
}

/// `PUT /artists/{artistId}/albums/{albumId}`
#[instrument(skip(repo))]
pub async fn update_album<S: DocumentStore>(
    repo: &ArtistRepository<S>,
    event: Request,
) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");
    let album_id = path_param(&event, "albumId");
    let req: AlbumRequest = body_or_default(&event);

    // An id in the body never renames the album.
    let fields = match req.required_fields() {
        Some(fields) => fields,
        None => return Ok(message(StatusCode::BAD_REQUEST, ALBUM_FIELDS_REQUIRED)),
    };

    let mut artist = match repo.get_one(&artist_id).await {
        Ok(Some(artist)) => artist,
        Ok(None) => return Ok(not_found()),
        Err(err) => return Ok(server_error(err)),
    };

    let album = match artist.albums.iter_mut().find(|album| album.id == album_id) {
        Some(album) => album,
        None => return Ok(not_found()),
    };
    album.title = fields.title;
    album.year = Some(fields.year);
    album.condition = fields.condition;
    album.extra.extend(req.extra);

    match repo.set_albums(&artist_id, artist.albums).await {
        Ok(Some(artist)) => Ok(json_response(StatusCode::OK, &artist)),
        Ok(None) => Ok(not_found()),
        Err(err) => Ok(server_error(err)),
    }
}

/// `PUT /artists/{artistId}`
#[instrument(skip(repo))]
pub async fn update<S: DocumentStore>(repo: &ArtistRepository<S>, event: Request) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");

    match repo.get_one(&artist_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found()),
        Err(err) => return Ok(server_error(err)),
    }

    let req: UpdateArtistRequest = body_or_default(&event);
    let patch = match non_empty(req.name) {
        Some(name) => UpdateArtistRequest { name: Some(name) },
        None => return Ok(message(StatusCode::BAD_REQUEST, "Name is required")),
    };

    match repo.update(&artist_id, &patch).await {
        Ok(Some(artist)) => Ok(json_response(StatusCode::OK, &artist)),
        Ok(None) => Ok(not_found()),
        Err(err) => Ok(server_error(err)),
    }
}

/// `DELETE /artists/{artistId}`
#[instrument(skip(repo))]
pub async fn delete<S: DocumentStore>(repo: &ArtistRepository<S>, event: Request) -> HandlerResponse {
    let artist_id = path_param(&event, "artistId");

    match repo.get_one(&artist_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found()),
        Err(err) => return Ok(server_error(err)),
    }

    match repo.delete(&artist_id).await {
        Ok(()) => Ok(message(StatusCode::OK, "OK")),
        Err(err) => Ok(server_error(err)),
    }
}

/// `POST /artists`
///
/// Names are unique by convention only: the check is a scan, not a constraint.
#[instrument(skip(repo))]
pub async fn create<S: DocumentStore>(repo: &ArtistRepository<S>, event: Request) -> HandlerResponse {
    let req: CreateArtistRequest = body_or_default(&event);

    let name = match non_empty(req.name) {
        Some(name) => name,
        None => return Ok(message(StatusCode::BAD_REQUEST, "Name is required")),
    };

    match repo.get_by_name(&name).await {
        Ok(Some(existing)) => {
            warn!("artist name {} already used by {}", name, existing.id);
            return Ok(message(StatusCode::CONFLICT, "Duplicate Artist"));
        }
        Ok(None) => {}
        Err(err) => return Ok(server_error(err)),
    }

    let id = non_empty(req.id);
    if let Some(id) = &id {
        match repo.get_one(id).await {
            Ok(Some(_)) => {
                warn!("artist id {} already exists", id);
                return Ok(message(StatusCode::CONFLICT, "Duplicate Artist"));
            }
            Ok(None) => {}
            Err(err) => return Ok(server_error(err)),
        }
    }

    let record = Artist {
        id: String::new(),
        name,
        albums: req.albums.unwrap_or_default(),
        extra: req.extra,
    };

    match repo.put(id.as_deref(), record).await {
        Ok(Some(artist)) => Ok(json_response(StatusCode::OK, &artist)),
        Ok(None) => Ok(not_found()),
        Err(err) => Ok(server_error(err)),
    }
}
