//! # album-catalog
//!
//! Lambda handlers for an artist/album catalog stored in DynamoDB, plus a small
//! search proxy in front of the MusicBrainz web service.

pub mod alb;
pub mod api;
pub mod artists;
pub mod config;
pub mod errors;
pub mod expression;
pub mod ext;
pub mod model;
pub mod musicbrainz;
pub mod store;
pub mod utils;
