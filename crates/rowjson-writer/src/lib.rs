//! rowjson-writer: streaming JSON generator, typed leaf writers, and the
//! key/value row to JSON object serializer.

pub mod generator;
pub mod leaf;
pub mod serializer;

pub use generator::JsonGenerator;
pub use leaf::{JsonValueWriter, LeafWriterProvider, StandardLeafWriters};
pub use serializer::RowToJsonSerializer;
