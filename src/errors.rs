use std::error;
use std::fmt;

use aws_sdk_dynamodb::error::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{op} failed: {message}")]
    Store { op: &'static str, message: String },
    #[error("cannot serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cannot convert attribute values: {0}")]
    Conversion(#[from] serde_dynamo::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl Error {
    /// Wraps a DynamoDB SDK failure, keeping the whole source chain in the message.
    pub fn store<E, R>(op: &'static str, value: SdkError<E, R>) -> Error
    where
        E: error::Error + 'static,
        R: fmt::Debug + 'static,
    {
        Error::Store {
            op,
            message: DisplayErrorContext(&value).to_string(),
        }
    }

    pub fn invalid_document(msg: impl Into<String>) -> Error {
        Error::InvalidDocument(msg.into())
    }
}
