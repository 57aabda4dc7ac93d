use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use serde_json::Value;
use tracing::{info, instrument};

use super::{DocumentStore, KEY_ATTRIBUTE};
use crate::errors::{Error, Result};
use crate::expression::{Filter, Update};
use crate::ext::{to_attribute_values, AttributeValuesExt, DocumentExt};

/// DynamoDB-backed document store for a single table.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        DynamoStore {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_owned())
    }
}

#[async_trait]
impl DocumentStore for DynamoStore {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Value>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, DynamoStore::key(id))
            .send()
            .await
            .map_err(|err| Error::store("GetItem", err))?;

        output.item.map(|item| item.to_document()).transpose()
    }

    #[instrument(skip_all)]
    async fn put(&self, document: Value) -> Result<()> {
        let item = document.to_item()?;
        info!("putting item {:?}", item.get_s(KEY_ATTRIBUTE));

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|err| Error::store("PutItem", err))?;

        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: &str, update: &Update) -> Result<()> {
        let rendered = match update.render() {
            Some(rendered) => rendered,
            None => return Ok(()),
        };
        info!("update expression: {}", rendered.expression);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, DynamoStore::key(id))
            .update_expression(rendered.expression)
            .set_expression_attribute_names(Some(rendered.names))
            .set_expression_attribute_values(Some(to_attribute_values(rendered.values)?))
            .send()
            .await
            .map_err(|err| Error::store("UpdateItem", err))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, DynamoStore::key(id))
            .send()
            .await
            .map_err(|err| Error::store("DeleteItem", err))?;

        Ok(())
    }

    #[instrument(skip(self, filter))]
    async fn scan(&self, filter: Option<&Filter>) -> Result<Vec<Value>> {
        let mut request = self.client.scan().table_name(&self.table_name);

        if let Some(rendered) = filter.and_then(Filter::render) {
            info!("filter expression: {}", rendered.expression);
            request = request
                .filter_expression(rendered.expression)
                .set_expression_attribute_names(Some(rendered.names))
                .set_expression_attribute_values(Some(to_attribute_values(rendered.values)?));
        }

        let output = request
            .send()
            .await
            .map_err(|err| Error::store("Scan", err))?;

        output
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| item.to_document())
            .collect()
    }
}
