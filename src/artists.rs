//! # Artist repository
//!
//! Composes document-store primitives into the catalog operations. Every read
//! goes through [`Artist::normalize`]; writes re-read the record afterwards, so
//! callers always see what the table holds (last writer wins).

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::errors::{Error, Result};
use crate::expression::{Filter, Update};
use crate::model::{Album, Artist};
use crate::store::{DocumentStore, KEY_ATTRIBUTE};
use crate::utils::uuidv4;

const ALBUMS: &str = "albums";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistSort {
    Name,
    Unsorted,
}

pub struct ArtistRepository<S> {
    store: S,
}

fn process_artist_response(document: Value) -> Result<Artist> {
    Ok(serde_json::from_value::<Artist>(document)?.normalize())
}

fn to_object<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_document(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

impl<S: DocumentStore> ArtistRepository<S> {
    pub fn new(store: S) -> Self {
        ArtistRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scans with an equality filter built from every field of `record`.
    async fn query(&self, record: Map<String, Value>) -> Result<Vec<Artist>> {
        let filter = Filter::from_fields(&record);
        self.store
            .scan(Some(&filter))
            .await?
            .into_iter()
            .map(process_artist_response)
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self, sort: ArtistSort) -> Result<Vec<Artist>> {
        let mut artists = self
            .store
            .scan(None)
            .await?
            .into_iter()
            .map(process_artist_response)
            .collect::<Result<Vec<_>>>()?;

        if sort == ArtistSort::Name {
            artists.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name))
            });
        }

        Ok(artists)
    }

    #[instrument(skip(self))]
    pub async fn get_one(&self, id: &str) -> Result<Option<Artist>> {
        if id.is_empty() {
            return Ok(None);
        }

        self.store
            .get(id)
            .await?
            .map(process_artist_response)
            .transpose()
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Artist>> {
        Ok(self.get_all_by_name(name).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    pub async fn get_all_by_name(&self, name: &str) -> Result<Vec<Artist>> {
        let mut record = Map::new();
        record.insert("name".to_owned(), Value::String(name.to_owned()));
        self.query(record).await
    }

    /// Writes the whole record under `id`, or under a fresh id when none is given.
    #[instrument(skip(self, record))]
    pub async fn put(&self, id: Option<&str>, mut record: Artist) -> Result<Option<Artist>> {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => uuidv4(),
        };
        record.id = id.clone();

        info!("storing artist {}", id);
        self.store.put(serde_json::to_value(&record)?).await?;

        self.get_one(&id).await
    }

    /// Sets every non-null field of `record` except the key, then re-reads.
    #[instrument(skip(self, record))]
    pub async fn update<T: Serialize>(&self, id: &str, record: &T) -> Result<Option<Artist>> {
        let mut fields = to_object(record)?;
        fields.remove(KEY_ATTRIBUTE);

        let update = Update::from_fields(&fields);
        if !update.is_empty() {
            self.store.update(id, &update).await?;
        }

        self.get_one(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await
    }

    /// Appends at the store level; the artist must already have an album list.
    #[instrument(skip(self, album))]
    pub async fn add_album(&self, id: &str, album: Album) -> Result<Option<Artist>> {
        let update = Update::new().append(ALBUMS, vec![serde_json::to_value(&album)?]);
        self.store.update(id, &update).await?;

        self.get_one(id).await
    }

    /// Replaces the whole album list.
    #[instrument(skip(self, albums))]
    pub async fn set_albums(&self, id: &str, albums: Vec<Album>) -> Result<Option<Artist>> {
        let update = Update::new().set(ALBUMS, serde_json::to_value(&albums)?);
        self.store.update(id, &update).await?;

        self.get_one(id).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::Year;
    use crate::store::MemoryStore;

    fn album(id: &str, year: Year) -> Album {
        Album {
            id: id.to_owned(),
            title: format!("Album {}", id),
            year: Some(year),
            condition: "VG+".to_owned(),
            ..Album::default()
        }
    }

    fn repository() -> ArtistRepository<MemoryStore> {
        ArtistRepository::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn put_generates_id_when_missing() {
        let repo = repository();
        let artist = repo
            .put(None, Artist::new("Test Band"))
            .await
            .expect("put succeeds")
            .expect("artist is readable");

        assert!(!artist.id.is_empty());
        assert_eq!(artist.name, "Test Band");
    }

    #[tokio::test]
    async fn get_one_after_put_is_normalized() {
        let repo = ArtistRepository::new(MemoryStore::new());
        repo.store()
            .put(json!({
                "id": "a1",
                "name": "Test Band",
                "albums": [
                    { "id": "late", "title": "Late", "year": 2005, "condition": "Mint" },
                    { "id": "early", "title": "Early", "year": "1971" }
                ]
            }))
            .await
            .expect("raw put");

        let artist = repo
            .get_one("a1")
            .await
            .expect("get succeeds")
            .expect("artist exists");

        assert_eq!(artist.albums[0].id, "early");
        assert_eq!(artist.albums[0].condition, "");
        assert_eq!(artist.albums[1].id, "late");
    }

    #[tokio::test]
    async fn put_with_id_then_get_one() {
        let repo = repository();
        let mut record = Artist::new("Test Band");
        record.albums = vec![album("b", Year::from(1999)), album("a", Year::from(1980))];

        repo.put(Some("fixed-id"), record).await.expect("put");
        let artist = repo
            .get_one("fixed-id")
            .await
            .expect("get")
            .expect("artist exists");

        assert_eq!(artist.id, "fixed-id");
        let ids: Vec<&str> = artist.albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn get_one_with_empty_id_is_none() {
        let repo = repository();
        assert_eq!(repo.get_one("").await.expect("get"), None);
    }

    #[tokio::test]
    async fn get_all_sorts_by_name() {
        let repo = repository();
        for name in ["beta", "Alpha", "gamma"] {
            repo.put(None, Artist::new(name)).await.expect("put");
        }

        let names: Vec<String> = repo
            .get_all(ArtistSort::Name)
            .await
            .expect("scan")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);

        let unsorted: Vec<String> = repo
            .get_all(ArtistSort::Unsorted)
            .await
            .expect("scan")
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(unsorted, vec!["beta", "Alpha", "gamma"]);
    }

    #[tokio::test]
    async fn get_by_name_filters_scan() {
        let repo = repository();
        repo.put(Some("1"), Artist::new("A")).await.expect("put");
        repo.put(Some("2"), Artist::new("B")).await.expect("put");
        repo.put(Some("3"), Artist::new("B")).await.expect("put");

        let found = repo.get_by_name("B").await.expect("scan").expect("match");
        assert_eq!(found.id, "2");
        assert_eq!(repo.get_all_by_name("B").await.expect("scan").len(), 2);
        assert_eq!(repo.get_by_name("C").await.expect("scan"), None);
    }

    #[tokio::test]
    async fn update_ignores_id_and_rereads() {
        let repo = repository();
        repo.put(Some("1"), Artist::new("Old")).await.expect("put");

        let updated = repo
            .update("1", &json!({ "id": "hijack", "name": "New" }))
            .await
            .expect("update")
            .expect("artist exists");

        assert_eq!(updated.id, "1");
        assert_eq!(updated.name, "New");
        assert_eq!(repo.get_one("hijack").await.expect("get"), None);
    }

    #[tokio::test]
    async fn add_album_appends_to_existing_list() {
        let repo = repository();
        let mut record = Artist::new("A");
        record.albums = vec![album("first", Year::from(2000))];
        repo.put(Some("1"), record).await.expect("put");

        let artist = repo
            .add_album("1", album("second", Year::from(1990)))
            .await
            .expect("append")
            .expect("artist exists");

        let ids: Vec<&str> = artist.albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn set_albums_replaces_list() {
        let repo = repository();
        let mut record = Artist::new("A");
        record.albums = vec![album("x", Year::from(2000)), album("y", Year::from(2001))];
        repo.put(Some("1"), record).await.expect("put");

        let artist = repo
            .set_albums("1", vec![album("z", Year::from(1999))])
            .await
            .expect("set")
            .expect("artist exists");

        assert_eq!(artist.albums.len(), 1);
        assert_eq!(artist.albums[0].id, "z");
    }

    #[tokio::test]
    async fn delete_removes_artist() {
        let repo = repository();
        repo.put(Some("1"), Artist::new("A")).await.expect("put");
        repo.delete("1").await.expect("delete");

        assert_eq!(repo.get_one("1").await.expect("get"), None);
    }
}
