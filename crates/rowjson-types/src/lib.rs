//! rowjson-types: LogicalType, TypedValue, RowValue, and positional row access.

pub mod block;
pub mod logical_type;
pub mod type_utils;
pub mod value;

pub use block::RowBlock;
pub use logical_type::LogicalType;
pub use value::{RowValue, TypedValue};
