//! rowjson-common: shared error taxonomy and serializer configuration.

pub mod config;
pub mod error;

pub use config::SerializerConfig;
pub use error::{RowJsonError, RowJsonResult};
