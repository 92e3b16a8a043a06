//! RowToJsonSerializer — turn a key/value row into a JSON object.
//!
//! The row type is read as alternating key and value parameters:
//! `row(varchar, integer, varchar, array(integer))` becomes a two-field
//! object. Keys must be textual. Values whose declared type is itself a row
//! are expanded recursively into nested objects on the same generator; all
//! other values go to the `LeafWriterProvider`.

use std::io;

use rowjson_common::{RowJsonError, RowJsonResult, SerializerConfig};
use rowjson_types::type_utils::container_depth;
use rowjson_types::{LogicalType, RowBlock};

use crate::generator::JsonGenerator;
use crate::leaf::{LeafWriterProvider, StandardLeafWriters};

/// Serializes key/value rows as JSON objects.
///
/// Stateless between calls: one instance can be shared by any number of
/// threads, each call owning its own output buffer.
#[derive(Clone, Debug, Default)]
pub struct RowToJsonSerializer<P = StandardLeafWriters> {
    provider: P,
    config: SerializerConfig,
}

impl RowToJsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            provider: StandardLeafWriters,
            config,
        }
    }
}

impl<P: LeafWriterProvider> RowToJsonSerializer<P> {
    /// Use a custom leaf writer provider.
    pub fn with_provider(provider: P, config: SerializerConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Serialize `row`, declared as `ty`, into a JSON object string.
    ///
    /// Nothing is returned unless the whole row was written: any failure
    /// discards the partial output.
    pub fn serialize<B: RowBlock + ?Sized>(
        &self,
        ty: &LogicalType,
        row: &B,
    ) -> RowJsonResult<String> {
        let buffer = Vec::with_capacity(self.config.initial_capacity);
        let bytes = self.serialize_into(ty, row, buffer)?;
        String::from_utf8(bytes).map_err(|err| {
            RowJsonError::Internal(format!("serializer produced invalid UTF-8: {err}"))
        })
    }

    /// Serialize into a caller-supplied sink and hand the sink back.
    ///
    /// On failure the sink may already hold a partial object and should be
    /// discarded.
    pub fn serialize_into<W, B>(&self, ty: &LogicalType, row: &B, writer: W) -> RowJsonResult<W>
    where
        W: io::Write,
        B: RowBlock + ?Sized,
    {
        let result = self.validate(ty).and_then(|params| {
            tracing::trace!(pairs = params.len() / 2, "serializing row as JSON object");
            let mut generator = JsonGenerator::new(writer, self.config.max_depth);
            self.write_row(&mut generator, params, row)?;
            generator.finish()
        });
        match &result {
            Err(RowJsonError::Internal(msg)) => {
                tracing::warn!("JSON output failed for {ty}: {msg}");
            }
            Err(err) => tracing::debug!("rejected row: {err}"),
            Ok(_) => {}
        }
        result
    }

    /// Top-level checks, done once per call: row shape, even arity, nesting
    /// depth, and JSON-convertibility of every reachable type.
    ///
    /// Depth is measured without recursion and checked before anything
    /// else walks the type recursively.
    fn validate<'t>(&self, ty: &'t LogicalType) -> RowJsonResult<&'t [LogicalType]> {
        let params = ty.row_parameters().ok_or_else(|| {
            RowJsonError::InvalidArgument(format!("expected a row type, found {ty}"))
        })?;
        check_even_arity(params)?;
        let depth = container_depth(ty);
        if depth > self.config.max_depth {
            return Err(RowJsonError::InvalidArgument(format!(
                "type nesting depth {depth} exceeds the maximum depth of {}",
                self.config.max_depth
            )));
        }
        if !self.provider.is_json_convertible(ty) {
            return Err(RowJsonError::InvalidArgument(format!(
                "cannot convert {ty} to JSON"
            )));
        }
        Ok(params)
    }

    fn write_row<W, B>(
        &self,
        generator: &mut JsonGenerator<W>,
        params: &[LogicalType],
        row: &B,
    ) -> RowJsonResult<()>
    where
        W: io::Write,
        B: RowBlock + ?Sized,
    {
        if row.position_count() != params.len() {
            return Err(RowJsonError::InvalidArgument(format!(
                "row has {} values but its type declares {}",
                row.position_count(),
                params.len()
            )));
        }

        generator.write_start_object()?;
        for (index, param) in params.iter().enumerate() {
            if index % 2 == 0 {
                if !param.is_textual() {
                    return Err(RowJsonError::InvalidArgument(format!(
                        "key at index {index} is not a textual type: {param}"
                    )));
                }
                if row.is_null(index) {
                    return Err(RowJsonError::InvalidArgument(format!(
                        "key at index {index} is null"
                    )));
                }
                generator.write_field_name(row.read_text(index)?)?;
            } else if let LogicalType::Row(nested) = param {
                if row.is_null(index) {
                    generator.write_null()?;
                } else {
                    check_even_arity(nested)?;
                    self.write_row(generator, nested, row.read_row(index)?)?;
                }
            } else {
                self.provider.write_leaf(generator, param, row, index)?;
            }
        }
        generator.write_end_object()
    }
}

fn check_even_arity(params: &[LogicalType]) -> RowJsonResult<()> {
    if params.len() % 2 != 0 {
        return Err(RowJsonError::InvalidArgument(format!(
            "odd number of key/value type parameters ({}); a value must be supplied for every key",
            params.len()
        )));
    }
    Ok(())
}
