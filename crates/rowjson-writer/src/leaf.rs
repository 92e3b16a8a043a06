//! Leaf writers — render one non-row value of a declared type as JSON.
//!
//! A `JsonValueWriter` is built from a `LogicalType` once and then applied to
//! values. The writer, not the runtime value, decides the rendering: a
//! `Decimal` value is only meaningful together with the scale of its type.

use std::io;

use rowjson_common::{RowJsonError, RowJsonResult};
use rowjson_types::type_utils::{is_json_convertible, is_json_map_key};
use rowjson_types::{LogicalType, RowBlock, TypedValue};

use crate::generator::JsonGenerator;

/// Field name written for the unnamed components of a nested row.
const ANONYMOUS_FIELD: &str = "";

/// Days between 0001-01-01 (day 1 of the common era) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Renders values of one declared type into a `JsonGenerator`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonValueWriter {
    /// `unknown`: only nulls.
    Unknown,
    Boolean,
    /// Any integer width.
    Integer,
    Real,
    Double,
    Decimal { scale: u8 },
    /// `char` and `varchar`.
    Text,
    /// Stored JSON text, emitted as-is after a well-formedness check.
    Json,
    Date,
    Timestamp,
    Array(Box<JsonValueWriter>),
    Map {
        key: Box<JsonValueWriter>,
        value: Box<JsonValueWriter>,
    },
    /// Row nested inside an array or map: written as a JSON object with one
    /// field per component. Row fields carry no names, so every key is `""`.
    Row(Vec<JsonValueWriter>),
}

impl JsonValueWriter {
    /// Build the writer for `ty`. Fails for types that have no JSON form.
    pub fn for_type(ty: &LogicalType) -> RowJsonResult<Self> {
        if !is_json_convertible(ty) {
            return Err(RowJsonError::InvalidArgument(format!(
                "cannot convert {ty} to JSON"
            )));
        }
        Self::build(ty)
    }

    fn build(ty: &LogicalType) -> RowJsonResult<Self> {
        Ok(match ty {
            LogicalType::Unknown => Self::Unknown,
            LogicalType::Boolean => Self::Boolean,
            LogicalType::TinyInt
            | LogicalType::SmallInt
            | LogicalType::Integer
            | LogicalType::BigInt => Self::Integer,
            LogicalType::Real => Self::Real,
            LogicalType::Double => Self::Double,
            LogicalType::Decimal { scale, .. } => Self::Decimal { scale: *scale },
            LogicalType::Char(_) | LogicalType::Varchar(_) => Self::Text,
            LogicalType::Json => Self::Json,
            LogicalType::Date => Self::Date,
            LogicalType::Timestamp => Self::Timestamp,
            LogicalType::Array(element) => Self::Array(Box::new(Self::build(element)?)),
            LogicalType::Map { key, value } => {
                if !is_json_map_key(key) {
                    return Err(RowJsonError::InvalidArgument(format!(
                        "map key type {key} cannot be a JSON field name"
                    )));
                }
                Self::Map {
                    key: Box::new(Self::build(key)?),
                    value: Box::new(Self::build(value)?),
                }
            }
            LogicalType::Row(params) => {
                Self::Row(params.iter().map(Self::build).collect::<RowJsonResult<_>>()?)
            }
            LogicalType::Varbinary => {
                return Err(RowJsonError::InvalidArgument(format!(
                    "cannot convert {ty} to JSON"
                )));
            }
        })
    }

    /// Short name of the rendering, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Double => "double",
            Self::Decimal { .. } => "decimal",
            Self::Text => "text",
            Self::Json => "json",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Array(_) => "array",
            Self::Map { .. } => "map",
            Self::Row(_) => "row",
        }
    }

    /// Write the value at `position` of `block`.
    pub fn write_position<W, B>(
        &self,
        generator: &mut JsonGenerator<W>,
        block: &B,
        position: usize,
    ) -> RowJsonResult<()>
    where
        W: io::Write,
        B: RowBlock + ?Sized,
    {
        let value = block.value_at(position).ok_or_else(|| {
            RowJsonError::InvalidArgument(format!(
                "position {position} is out of range for a row of {} values",
                block.position_count()
            ))
        })?;
        self.write_value(generator, value).map_err(|err| match err {
            RowJsonError::InvalidArgument(msg) => {
                RowJsonError::InvalidArgument(format!("value at index {position}: {msg}"))
            }
            other => other,
        })
    }

    pub fn write_value<W: io::Write>(
        &self,
        generator: &mut JsonGenerator<W>,
        value: &TypedValue,
    ) -> RowJsonResult<()> {
        match (self, value) {
            (_, TypedValue::Null) => generator.write_null(),
            (Self::Boolean, TypedValue::Boolean(v)) => generator.write_bool(*v),
            (Self::Integer, TypedValue::TinyInt(v)) => generator.write_i64(i64::from(*v)),
            (Self::Integer, TypedValue::SmallInt(v)) => generator.write_i64(i64::from(*v)),
            (Self::Integer, TypedValue::Integer(v)) => generator.write_i64(i64::from(*v)),
            (Self::Integer, TypedValue::BigInt(v)) => generator.write_i64(*v),
            (Self::Real, TypedValue::Real(v)) => generator.write_f32(*v),
            (Self::Double, TypedValue::Double(v)) => generator.write_f64(*v),
            (Self::Decimal { scale }, TypedValue::Decimal(unscaled)) => {
                generator.write_number_str(&decimal_text(*unscaled, *scale))
            }
            (Self::Text, TypedValue::String(s)) => generator.write_string(s),
            (Self::Json, TypedValue::String(s)) => {
                let text = s.trim();
                serde_json::from_str::<serde::de::IgnoredAny>(text).map_err(|err| {
                    RowJsonError::InvalidArgument(format!("stored JSON text is malformed: {err}"))
                })?;
                generator.write_raw_value(text)
            }
            (Self::Date, TypedValue::Date(days)) => generator.write_string(&date_text(*days)?),
            (Self::Timestamp, TypedValue::Timestamp(millis)) => {
                generator.write_string(&timestamp_text(*millis)?)
            }
            (Self::Array(element), TypedValue::Array(items)) => {
                generator.write_start_array()?;
                for item in items {
                    element.write_value(generator, item)?;
                }
                generator.write_end_array()
            }
            (Self::Map { key, value }, TypedValue::Map(entries)) => {
                let mut rendered = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    rendered.push((key.key_text(k)?, v));
                }
                rendered.sort_by(|a, b| a.0.cmp(&b.0));
                generator.write_start_object()?;
                for (name, v) in rendered {
                    generator.write_field_name(&name)?;
                    value.write_value(generator, v)?;
                }
                generator.write_end_object()
            }
            (Self::Row(fields), TypedValue::Row(row)) => {
                if fields.len() != row.len() {
                    return Err(RowJsonError::InvalidArgument(format!(
                        "row has {} values but its type declares {}",
                        row.len(),
                        fields.len()
                    )));
                }
                generator.write_start_object()?;
                for (field, v) in fields.iter().zip(row.values()) {
                    generator.write_field_name(ANONYMOUS_FIELD)?;
                    field.write_value(generator, v)?;
                }
                generator.write_end_object()
            }
            (writer, other) => Err(RowJsonError::InvalidArgument(format!(
                "cannot write {} value as {}",
                other.kind_name(),
                writer.name()
            ))),
        }
    }

    /// Text form of a map key.
    fn key_text(&self, value: &TypedValue) -> RowJsonResult<String> {
        match (self, value) {
            (_, TypedValue::Null) => Err(RowJsonError::InvalidArgument(
                "map key is null".into(),
            )),
            (Self::Boolean, TypedValue::Boolean(v)) => Ok(v.to_string()),
            (Self::Integer, TypedValue::TinyInt(v)) => Ok(v.to_string()),
            (Self::Integer, TypedValue::SmallInt(v)) => Ok(v.to_string()),
            (Self::Integer, TypedValue::Integer(v)) => Ok(v.to_string()),
            (Self::Integer, TypedValue::BigInt(v)) => Ok(v.to_string()),
            (Self::Real, TypedValue::Real(v)) => float_key_text(f64::from(*v)),
            (Self::Double, TypedValue::Double(v)) => float_key_text(*v),
            (Self::Decimal { scale }, TypedValue::Decimal(unscaled)) => {
                Ok(decimal_text(*unscaled, *scale))
            }
            (Self::Text, TypedValue::String(s)) => Ok(s.to_string()),
            (writer, other) => Err(RowJsonError::InvalidArgument(format!(
                "cannot use {} value as {} map key",
                other.kind_name(),
                writer.name()
            ))),
        }
    }
}

/// Chooses and applies the leaf writer for a declared type.
///
/// This is the seam between the row serializer and value rendering: the
/// serializer only walks rows and hands every other value to a provider.
pub trait LeafWriterProvider {
    /// Whether `ty`, including all nested types, can be rendered.
    fn is_json_convertible(&self, ty: &LogicalType) -> bool {
        is_json_convertible(ty)
    }

    /// Write exactly one JSON value for the component at `position`, at the
    /// generator's current position.
    fn write_leaf<W, B>(
        &self,
        generator: &mut JsonGenerator<W>,
        ty: &LogicalType,
        block: &B,
        position: usize,
    ) -> RowJsonResult<()>
    where
        W: io::Write,
        B: RowBlock + ?Sized;
}

/// Default provider backed by `JsonValueWriter`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardLeafWriters;

impl LeafWriterProvider for StandardLeafWriters {
    fn write_leaf<W, B>(
        &self,
        generator: &mut JsonGenerator<W>,
        ty: &LogicalType,
        block: &B,
        position: usize,
    ) -> RowJsonResult<()>
    where
        W: io::Write,
        B: RowBlock + ?Sized,
    {
        JsonValueWriter::for_type(ty)?.write_position(generator, block, position)
    }
}

/// Render an unscaled decimal with `scale` fractional digits.
pub fn decimal_text(unscaled: i128, scale: u8) -> String {
    let digits = unscaled.unsigned_abs().to_string();
    let scale = usize::from(scale);
    let mut out = String::with_capacity(digits.len() + scale + 3);
    if unscaled < 0 {
        out.push('-');
    }
    if scale == 0 {
        out.push_str(&digits);
    } else if digits.len() <= scale {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', scale - digits.len()));
        out.push_str(&digits);
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn float_key_text(value: f64) -> RowJsonResult<String> {
    if value.is_nan() {
        return Ok("NaN".into());
    }
    if value.is_infinite() {
        return Ok(if value > 0.0 { "Infinity" } else { "-Infinity" }.into());
    }
    serde_json::to_string(&value).map_err(RowJsonError::sink)
}

fn date_text(days: i32) -> RowJsonResult<String> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| RowJsonError::InvalidArgument(format!("date {days} is out of range")))
}

fn timestamp_text(millis: i64) -> RowJsonResult<String> {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .map(|ts| ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .ok_or_else(|| {
            RowJsonError::InvalidArgument(format!("timestamp {millis} is out of range"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowjson_types::RowValue;

    fn render(ty: &LogicalType, value: &TypedValue) -> RowJsonResult<String> {
        let writer = JsonValueWriter::for_type(ty)?;
        let mut generator = JsonGenerator::new(Vec::new(), 32);
        writer.write_value(&mut generator, value)?;
        let bytes = generator.finish()?;
        Ok(String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn scalars() {
        assert_eq!(render(&LogicalType::Boolean, &true.into()).unwrap(), "true");
        assert_eq!(render(&LogicalType::Integer, &2.into()).unwrap(), "2");
        assert_eq!(
            render(&LogicalType::TinyInt, &TypedValue::TinyInt(-3)).unwrap(),
            "-3"
        );
        assert_eq!(render(&LogicalType::Double, &2.5.into()).unwrap(), "2.5");
        assert_eq!(
            render(&LogicalType::Real, &TypedValue::Real(0.25)).unwrap(),
            "0.25"
        );
        assert_eq!(
            render(&LogicalType::VARCHAR, &"banana".into()).unwrap(),
            "\"banana\""
        );
        assert_eq!(
            render(&LogicalType::Char(3), &"ab ".into()).unwrap(),
            "\"ab \""
        );
    }

    #[test]
    fn nulls_of_any_type() {
        for ty in [
            LogicalType::Unknown,
            LogicalType::Integer,
            LogicalType::VARCHAR,
            LogicalType::array(LogicalType::Integer),
        ] {
            assert_eq!(render(&ty, &TypedValue::Null).unwrap(), "null");
        }
    }

    #[test]
    fn decimals() {
        let ty = LogicalType::Decimal {
            precision: 10,
            scale: 2,
        };
        assert_eq!(render(&ty, &TypedValue::Decimal(12345)).unwrap(), "123.45");
        assert_eq!(render(&ty, &TypedValue::Decimal(-5)).unwrap(), "-0.05");
        assert_eq!(decimal_text(7, 0), "7");
        assert_eq!(decimal_text(100, 2), "1.00");
        assert_eq!(decimal_text(-1234, 1), "-123.4");
    }

    #[test]
    fn dates_and_timestamps() {
        assert_eq!(
            render(&LogicalType::Date, &TypedValue::Date(0)).unwrap(),
            "\"1970-01-01\""
        );
        assert_eq!(
            render(&LogicalType::Date, &TypedValue::Date(18_628)).unwrap(),
            "\"2021-01-01\""
        );
        assert_eq!(
            render(&LogicalType::Date, &TypedValue::Date(-1)).unwrap(),
            "\"1969-12-31\""
        );
        assert_eq!(
            render(
                &LogicalType::Timestamp,
                &TypedValue::Timestamp(1_609_459_261_005)
            )
            .unwrap(),
            "\"2021-01-01 00:01:01.005\""
        );
        assert!(render(&LogicalType::Date, &TypedValue::Date(i32::MAX)).is_err());
    }

    #[test]
    fn json_text() {
        assert_eq!(
            render(&LogicalType::Json, &" {\"a\":[1,2]} ".into()).unwrap(),
            "{\"a\":[1,2]}"
        );
        let err = render(&LogicalType::Json, &"{not json".into()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn arrays() {
        let ty = LogicalType::array(LogicalType::Integer);
        let value = TypedValue::Array(vec![1.into(), 2.into(), 3.into(), 44.into()]);
        assert_eq!(render(&ty, &value).unwrap(), "[1,2,3,44]");
        assert_eq!(render(&ty, &TypedValue::Array(vec![])).unwrap(), "[]");
    }

    #[test]
    fn maps_sort_by_rendered_key() {
        let ty = LogicalType::map(LogicalType::VARCHAR, LogicalType::Integer);
        let value = TypedValue::Map(vec![
            ("b".into(), 2.into()),
            ("a".into(), 1.into()),
        ]);
        assert_eq!(render(&ty, &value).unwrap(), r#"{"a":1,"b":2}"#);

        let ty = LogicalType::map(LogicalType::BigInt, LogicalType::Boolean);
        let value = TypedValue::Map(vec![(TypedValue::BigInt(10), true.into())]);
        assert_eq!(render(&ty, &value).unwrap(), r#"{"10":true}"#);
    }

    #[test]
    fn map_null_key_rejected() {
        let ty = LogicalType::map(LogicalType::VARCHAR, LogicalType::Integer);
        let value = TypedValue::Map(vec![(TypedValue::Null, 1.into())]);
        let err = render(&ty, &value).unwrap_err();
        assert!(err.to_string().contains("map key is null"));
    }

    #[test]
    fn rows_inside_arrays_are_objects_with_empty_names() {
        let ty = LogicalType::array(LogicalType::Row(vec![
            LogicalType::Integer,
            LogicalType::VARCHAR,
        ]));
        let value = TypedValue::Array(vec![
            TypedValue::Row(RowValue::new(vec![1.into(), "x".into()])),
            TypedValue::Null,
        ]);
        assert_eq!(render(&ty, &value).unwrap(), r#"[{"":1,"":"x"},null]"#);
    }

    #[test]
    fn rows_inside_maps_are_objects() {
        let ty = LogicalType::map(
            LogicalType::VARCHAR,
            LogicalType::Row(vec![LogicalType::Boolean]),
        );
        let value = TypedValue::Map(vec![(
            "k".into(),
            TypedValue::Row(RowValue::new(vec![true.into()])),
        )]);
        assert_eq!(render(&ty, &value).unwrap(), r#"{"k":{"":true}}"#);
    }

    #[test]
    fn mismatched_value_rejected() {
        let err = render(&LogicalType::Integer, &"one".into()).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("cannot write string value as integer"));
    }

    #[test]
    fn varbinary_has_no_writer() {
        let err = JsonValueWriter::for_type(&LogicalType::Varbinary).unwrap_err();
        assert!(err.to_string().contains("cannot convert varbinary to JSON"));
    }

    #[test]
    fn write_position_names_index() {
        let block = vec![TypedValue::string("k"), TypedValue::string("nope")];
        let mut generator = JsonGenerator::new(Vec::new(), 8);
        let err = JsonValueWriter::Integer
            .write_position(&mut generator, &block, 1)
            .unwrap_err();
        assert!(err.to_string().contains("value at index 1"));
    }
}
