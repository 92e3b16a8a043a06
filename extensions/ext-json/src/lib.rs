//! ext-json: JSON scalar functions.
//!
//! Provides `to_json_object(row)`, which reads a row as alternating keys and
//! values and returns the matching JSON object as `varchar`:
//!
//! `to_json_object(ROW('k1', 2, 'k2', 'banana'))` → `{"k1":2,"k2":"banana"}`

use rowjson_common::{RowJsonError, RowJsonResult, SerializerConfig};
use rowjson_function::{FunctionRegistry, ParamConstraint, ScalarExtension};
use rowjson_types::{LogicalType, TypedValue};
use rowjson_writer::RowToJsonSerializer;
use smol_str::SmolStr;

pub const TO_JSON_OBJECT: &str = "to_json_object";

/// JSON function extension.
#[derive(Clone, Debug, Default)]
pub struct JsonExtension {
    config: SerializerConfig,
}

impl JsonExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }
}

impl ScalarExtension for JsonExtension {
    fn name(&self) -> &str {
        "json"
    }

    fn register(&self, registry: &mut FunctionRegistry) {
        let serializer = RowToJsonSerializer::with_config(self.config.clone());
        registry.register(
            TO_JSON_OBJECT,
            "Serialize a row of alternating keys and values as a JSON object",
            vec![ParamConstraint::AnyRow],
            LogicalType::VARCHAR,
            Box::new(move |types: &[LogicalType], args: &[TypedValue]| {
                to_json_object(&serializer, types, args)
            }),
        );
    }
}

fn to_json_object(
    serializer: &RowToJsonSerializer,
    types: &[LogicalType],
    args: &[TypedValue],
) -> RowJsonResult<TypedValue> {
    let (Some(ty), Some(arg)) = (types.first(), args.first()) else {
        return Err(RowJsonError::Internal(format!(
            "{TO_JSON_OBJECT} bound without an argument"
        )));
    };
    let row = arg.as_row().ok_or_else(|| {
        RowJsonError::InvalidArgument(format!(
            "{TO_JSON_OBJECT} expects a row value, found {}",
            arg.kind_name()
        ))
    })?;
    let json = serializer.serialize(ty, row).inspect_err(|err| {
        tracing::debug!("{TO_JSON_OBJECT}({ty}) failed: {err}");
    })?;
    Ok(TypedValue::String(SmolStr::from(json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowjson_types::RowValue;

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.load(&JsonExtension::new());
        registry
    }

    fn call(ty: LogicalType, row: RowValue) -> RowJsonResult<TypedValue> {
        registry().invoke(TO_JSON_OBJECT, &[(ty, TypedValue::Row(row))])
    }

    #[test]
    fn registers_to_json_object() {
        let registry = registry();
        let row_type = LogicalType::Row(vec![LogicalType::VARCHAR, LogicalType::Integer]);
        let sig = registry.resolve("TO_JSON_OBJECT", &[row_type]).unwrap();
        assert_eq!(sig.name, TO_JSON_OBJECT);
        assert_eq!(sig.return_type, LogicalType::VARCHAR);
        assert!(sig.description.contains("JSON object"));
    }

    #[test]
    fn serializes_mixed_row() {
        let ty = LogicalType::Row(vec![
            LogicalType::Varchar(Some(2)),
            LogicalType::Integer,
            LogicalType::Varchar(Some(2)),
            LogicalType::Varchar(Some(6)),
            LogicalType::Varchar(Some(2)),
            LogicalType::array(LogicalType::Integer),
        ]);
        let row = RowValue::new(vec![
            "k1".into(),
            2.into(),
            "k2".into(),
            "banana".into(),
            "k3".into(),
            TypedValue::Array(vec![1.into(), 2.into(), 3.into(), 44.into()]),
        ]);
        let out = call(ty, row).unwrap();
        assert_eq!(
            out.as_str(),
            Some(r#"{"k1":2,"k2":"banana","k3":[1,2,3,44]}"#)
        );
    }

    #[test]
    fn nested_row_argument() {
        let ty = LogicalType::Row(vec![
            LogicalType::VARCHAR,
            LogicalType::Row(vec![LogicalType::VARCHAR, LogicalType::Integer]),
        ]);
        let row = RowValue::new(vec![
            "a".into(),
            RowValue::new(vec!["b".into(), 1.into()]).into(),
        ]);
        let out = call(ty, row).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(out.as_str().unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!({"a": {"b": 1}}));
    }

    #[test]
    fn null_row_returns_null() {
        let ty = LogicalType::Row(vec![LogicalType::VARCHAR, LogicalType::Integer]);
        let out = registry()
            .invoke(TO_JSON_OBJECT, &[(ty, TypedValue::Null)])
            .unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn invalid_rows_are_invalid_arguments() {
        let numeric_key = LogicalType::Row(vec![LogicalType::Integer, LogicalType::VARCHAR]);
        let err = call(numeric_key, RowValue::new(vec![1.into(), "x".into()])).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("index 0"));

        let odd = LogicalType::Row(vec![
            LogicalType::VARCHAR,
            LogicalType::Integer,
            LogicalType::VARCHAR,
        ]);
        let err = call(odd, RowValue::new(vec!["a".into(), 1.into(), "b".into()])).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("odd number"));
    }

    #[test]
    fn non_row_argument_does_not_bind() {
        let err = registry()
            .invoke(TO_JSON_OBJECT, &[(LogicalType::VARCHAR, "x".into())])
            .unwrap_err();
        assert!(matches!(err, RowJsonError::Binder(_)));
    }

    #[test]
    fn config_is_applied() {
        let mut registry = FunctionRegistry::new();
        registry.load(&JsonExtension::with_config(SerializerConfig {
            max_depth: 1,
            ..SerializerConfig::default()
        }));
        let ty = LogicalType::Row(vec![
            LogicalType::VARCHAR,
            LogicalType::Row(vec![LogicalType::VARCHAR, LogicalType::Integer]),
        ]);
        let row = RowValue::new(vec![
            "a".into(),
            RowValue::new(vec!["b".into(), 1.into()]).into(),
        ]);
        let err = registry
            .invoke(TO_JSON_OBJECT, &[(ty, TypedValue::Row(row))])
            .unwrap_err();
        assert!(err.to_string().contains("maximum depth of 1"));
    }
}
