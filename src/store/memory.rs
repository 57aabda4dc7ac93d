//! In-memory document store for tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{DocumentStore, KEY_ATTRIBUTE};
use crate::errors::{Error, Result};
use crate::expression::{Filter, Update};

/// Keeps documents in insertion order, so scans are deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<Vec<Map<String, Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn key_of(document: &Map<String, Value>) -> Option<&str> {
    document.get(KEY_ATTRIBUTE).and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Value>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|doc| key_of(doc) == Some(id))
            .cloned()
            .map(Value::Object))
    }

    async fn put(&self, document: Value) -> Result<()> {
        let document = match document {
            Value::Object(map) if key_of(&map).is_some() => map,
            _ => return Err(Error::invalid_document("document needs a string id")),
        };

        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|doc| key_of(doc) == key_of(&document)) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
        Ok(())
    }

    async fn update(&self, id: &str, update: &Update) -> Result<()> {
        let mut documents = self.documents.write().await;
        let position = documents.iter().position(|doc| key_of(doc) == Some(id));

        // UpdateItem creates the item when the key is unknown.
        let mut document = match position {
            Some(position) => documents[position].clone(),
            None => {
                let mut fresh = Map::new();
                fresh.insert(KEY_ATTRIBUTE.to_owned(), Value::String(id.to_owned()));
                fresh
            }
        };

        update
            .apply(&mut document)
            .map_err(|err| Error::Store {
                op: "UpdateItem",
                message: err.to_string(),
            })?;

        match position {
            Some(position) => documents[position] = document,
            None => documents.push(document),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.retain(|doc| key_of(doc) != Some(id));
        Ok(())
    }

    async fn scan(&self, filter: Option<&Filter>) -> Result<Vec<Value>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .cloned()
            .map(Value::Object)
            .filter(|doc| filter.map_or(true, |filter| filter.matches(doc)))
            .collect())
    }
}
