//! # Extension traits for `DynamoStore`.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_attribute_value, to_item};
use serde_json::Value;

use crate::errors::{Error, Result};

pub type Item = HashMap<String, AttributeValue>;

/// Read access to artist items as returned by GetItem and Scan.
pub trait AttributeValuesExt {
    fn get_s(&self, key: &str) -> Option<String>;
    fn to_document(&self) -> Result<Value>;
}

impl AttributeValuesExt for Item {
    /// String attribute `key`; `None` when absent or not an `S` value.
    fn get_s(&self, key: &str) -> Option<String> {
        Some(self.get(key)?.as_s().ok()?.to_owned())
    }

    fn to_document(&self) -> Result<Value> {
        Ok(from_item(self.clone())?)
    }
}

/// The reverse direction: JSON documents into DynamoDB items.
pub trait DocumentExt {
    fn to_item(&self) -> Result<Item>;
}

impl DocumentExt for Value {
    fn to_item(&self) -> Result<Item> {
        if !self.is_object() {
            return Err(Error::invalid_document("only JSON objects can be stored"));
        }
        Ok(to_item(self)?)
    }
}

/// Converts expression attribute values rendered by [`crate::expression`].
pub fn to_attribute_values(values: HashMap<String, Value>) -> Result<Item> {
    values
        .into_iter()
        .map(|(token, value)| Ok::<_, Error>((token, to_attribute_value(value)?)))
        .collect()
}
