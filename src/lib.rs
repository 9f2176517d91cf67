//! Case search indexer: projects case mutation events into a searchable
//! document store and serves structured case searches over it.

pub mod api;
pub mod casetype;
pub mod config;
pub mod error;
pub mod events;
pub mod index;
pub mod info;
pub mod model;
pub mod search;

pub use error::{AppError, Result};
