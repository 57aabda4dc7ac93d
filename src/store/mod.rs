//! Document store abstraction over the artists table.
//!
//! Documents are JSON objects keyed by their `id` attribute. The DynamoDB
//! implementation is used by the Lambda binaries; the in-memory one backs the
//! tests (and the `mock` feature).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::expression::{Filter, Update};

mod dynamodb;
#[cfg(any(test, feature = "mock"))]
mod memory;

pub use dynamodb::DynamoStore;
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;

/// Partition key of the artists table.
pub const KEY_ATTRIBUTE: &str = "id";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Value>>;

    /// Writes the whole document, replacing any existing one with the same key.
    async fn put(&self, document: Value) -> Result<()>;

    async fn update(&self, id: &str, update: &Update) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Returns the first page of matching documents only.
    async fn scan(&self, filter: Option<&Filter>) -> Result<Vec<Value>>;
}
