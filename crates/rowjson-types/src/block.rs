//! Positional access to the components of a single row.
//!
//! Serializers never see how a row is stored. They only ask for the value at
//! a position, and for the two decoded shapes they care about directly:
//! text (for keys) and nested rows.

use rowjson_common::{RowJsonError, RowJsonResult};

use crate::value::{RowValue, TypedValue};

/// Read-only view over the components of one row.
///
/// Implemented for `RowValue` and for plain `[TypedValue]` slices.
pub trait RowBlock {
    /// Number of components in the row.
    fn position_count(&self) -> usize;

    fn value_at(&self, position: usize) -> Option<&TypedValue>;

    fn is_null(&self, position: usize) -> bool {
        self.value_at(position).is_none_or(TypedValue::is_null)
    }

    /// Decode the textual value at `position`.
    fn read_text(&self, position: usize) -> RowJsonResult<&str> {
        match self.value_at(position) {
            Some(TypedValue::String(s)) => Ok(s.as_str()),
            Some(TypedValue::Null) => Err(RowJsonError::InvalidArgument(format!(
                "value at index {position} is null"
            ))),
            Some(other) => Err(RowJsonError::InvalidArgument(format!(
                "value at index {position} is not text: found {}",
                other.kind_name()
            ))),
            None => Err(out_of_range(position, self.position_count())),
        }
    }

    /// Decode the nested row at `position`.
    fn read_row(&self, position: usize) -> RowJsonResult<&RowValue> {
        match self.value_at(position) {
            Some(TypedValue::Row(row)) => Ok(row),
            Some(other) => Err(RowJsonError::InvalidArgument(format!(
                "value at index {position} is not a row: found {}",
                other.kind_name()
            ))),
            None => Err(out_of_range(position, self.position_count())),
        }
    }
}

fn out_of_range(position: usize, count: usize) -> RowJsonError {
    RowJsonError::InvalidArgument(format!(
        "position {position} is out of range for a row of {count} values"
    ))
}

impl RowBlock for RowValue {
    #[inline]
    fn position_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn value_at(&self, position: usize) -> Option<&TypedValue> {
        self.get(position)
    }
}

impl RowBlock for [TypedValue] {
    #[inline]
    fn position_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn value_at(&self, position: usize) -> Option<&TypedValue> {
        self.get(position)
    }
}

impl RowBlock for Vec<TypedValue> {
    #[inline]
    fn position_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn value_at(&self, position: usize) -> Option<&TypedValue> {
        self.get(position)
    }
}
