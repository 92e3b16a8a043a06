//! JsonGenerator — write-forward JSON emitter over any `io::Write` sink.
//!
//! Tracks an explicit scope stack so callers only say what to write (start
//! object, field name, value, ...) and never handle separators. Nothing is
//! buffered here: every call goes straight to the underlying writer, and
//! nested serializers share one generator instead of building substrings.

use std::io;

use rowjson_common::{RowJsonError, RowJsonResult};
use serde_json::ser::{CompactFormatter, Formatter};

#[derive(Clone, Copy, Debug)]
enum Scope {
    Object { first: bool, has_key: bool },
    Array { first: bool },
}

/// Streaming JSON writer with separator bookkeeping and a nesting limit.
pub struct JsonGenerator<W: io::Write> {
    writer: W,
    formatter: CompactFormatter,
    scopes: Vec<Scope>,
    max_depth: usize,
    root_written: bool,
}

impl<W: io::Write> JsonGenerator<W> {
    pub fn new(writer: W, max_depth: usize) -> Self {
        Self {
            writer,
            formatter: CompactFormatter,
            scopes: Vec::new(),
            max_depth,
            root_written: false,
        }
    }

    /// Current number of open containers.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn write_start_object(&mut self) -> RowJsonResult<()> {
        self.check_depth()?;
        self.begin_value()?;
        self.formatter
            .begin_object(&mut self.writer)
            .map_err(RowJsonError::sink)?;
        self.scopes.push(Scope::Object {
            first: true,
            has_key: false,
        });
        Ok(())
    }

    pub fn write_end_object(&mut self) -> RowJsonResult<()> {
        match self.scopes.pop() {
            Some(Scope::Object { has_key: false, .. }) => {}
            Some(Scope::Object { has_key: true, .. }) => {
                return Err(RowJsonError::Internal(
                    "cannot close object: field name has no value".into(),
                ));
            }
            _ => {
                return Err(RowJsonError::Internal(
                    "cannot close object: no object is open".into(),
                ));
            }
        }
        self.formatter
            .end_object(&mut self.writer)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    pub fn write_field_name(&mut self, name: &str) -> RowJsonResult<()> {
        let first = match self.scopes.last_mut() {
            Some(Scope::Object { has_key: true, .. }) => {
                return Err(RowJsonError::Internal(format!(
                    "cannot write field name '{name}': previous field has no value"
                )));
            }
            Some(Scope::Object { first, has_key }) => {
                *has_key = true;
                std::mem::replace(first, false)
            }
            _ => {
                return Err(RowJsonError::Internal(format!(
                    "cannot write field name '{name}' outside of an object"
                )));
            }
        };
        self.formatter
            .begin_object_key(&mut self.writer, first)
            .map_err(RowJsonError::sink)?;
        self.write_escaped(name)?;
        self.formatter
            .end_object_key(&mut self.writer)
            .map_err(RowJsonError::sink)
    }

    pub fn write_start_array(&mut self) -> RowJsonResult<()> {
        self.check_depth()?;
        self.begin_value()?;
        self.formatter
            .begin_array(&mut self.writer)
            .map_err(RowJsonError::sink)?;
        self.scopes.push(Scope::Array { first: true });
        Ok(())
    }

    pub fn write_end_array(&mut self) -> RowJsonResult<()> {
        if !matches!(self.scopes.pop(), Some(Scope::Array { .. })) {
            return Err(RowJsonError::Internal(
                "cannot close array: no array is open".into(),
            ));
        }
        self.formatter
            .end_array(&mut self.writer)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    pub fn write_null(&mut self) -> RowJsonResult<()> {
        self.begin_value()?;
        self.formatter
            .write_null(&mut self.writer)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    pub fn write_bool(&mut self, value: bool) -> RowJsonResult<()> {
        self.begin_value()?;
        self.formatter
            .write_bool(&mut self.writer, value)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    pub fn write_i64(&mut self, value: i64) -> RowJsonResult<()> {
        self.begin_value()?;
        self.formatter
            .write_i64(&mut self.writer, value)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    /// Non-finite values have no JSON number form and are written as the
    /// strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
    pub fn write_f32(&mut self, value: f32) -> RowJsonResult<()> {
        if !value.is_finite() {
            return self.write_string(non_finite_name(f64::from(value)));
        }
        self.begin_value()?;
        self.formatter
            .write_f32(&mut self.writer, value)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    pub fn write_f64(&mut self, value: f64) -> RowJsonResult<()> {
        if !value.is_finite() {
            return self.write_string(non_finite_name(value));
        }
        self.begin_value()?;
        self.formatter
            .write_f64(&mut self.writer, value)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    /// Write pre-rendered number text (e.g. a decimal) without quoting.
    pub fn write_number_str(&mut self, value: &str) -> RowJsonResult<()> {
        self.begin_value()?;
        self.formatter
            .write_number_str(&mut self.writer, value)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    pub fn write_string(&mut self, value: &str) -> RowJsonResult<()> {
        self.begin_value()?;
        self.write_escaped(value)?;
        self.end_value()
    }

    /// Write already-encoded JSON text as one value. The caller guarantees
    /// that `json` is a single well-formed JSON value.
    pub fn write_raw_value(&mut self, json: &str) -> RowJsonResult<()> {
        self.begin_value()?;
        self.formatter
            .write_raw_fragment(&mut self.writer, json)
            .map_err(RowJsonError::sink)?;
        self.end_value()
    }

    /// Flush and hand back the sink. Fails if any container is still open.
    pub fn finish(mut self) -> RowJsonResult<W> {
        if !self.scopes.is_empty() {
            return Err(RowJsonError::Internal(format!(
                "{} JSON container(s) left open",
                self.scopes.len()
            )));
        }
        self.writer.flush().map_err(RowJsonError::sink)?;
        Ok(self.writer)
    }

    fn write_escaped(&mut self, text: &str) -> RowJsonResult<()> {
        serde_json::to_writer(&mut self.writer, text).map_err(RowJsonError::sink)
    }

    fn check_depth(&self) -> RowJsonResult<()> {
        if self.scopes.len() >= self.max_depth {
            return Err(RowJsonError::InvalidArgument(format!(
                "value nesting exceeds the maximum depth of {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn begin_value(&mut self) -> RowJsonResult<()> {
        match self.scopes.last_mut() {
            None if self.root_written => Err(RowJsonError::Internal(
                "a JSON document holds a single root value".into(),
            )),
            None => {
                self.root_written = true;
                Ok(())
            }
            Some(Scope::Array { first }) => {
                let first = std::mem::replace(first, false);
                self.formatter
                    .begin_array_value(&mut self.writer, first)
                    .map_err(RowJsonError::sink)
            }
            Some(Scope::Object { has_key: true, .. }) => self
                .formatter
                .begin_object_value(&mut self.writer)
                .map_err(RowJsonError::sink),
            Some(Scope::Object { has_key: false, .. }) => Err(RowJsonError::Internal(
                "cannot write an object value before its field name".into(),
            )),
        }
    }

    fn end_value(&mut self) -> RowJsonResult<()> {
        match self.scopes.last_mut() {
            None => Ok(()),
            Some(Scope::Array { .. }) => self
                .formatter
                .end_array_value(&mut self.writer)
                .map_err(RowJsonError::sink),
            Some(Scope::Object { has_key, .. }) => {
                *has_key = false;
                self.formatter
                    .end_object_value(&mut self.writer)
                    .map_err(RowJsonError::sink)
            }
        }
    }
}

fn non_finite_name(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> JsonGenerator<Vec<u8>> {
        JsonGenerator::new(Vec::new(), 16)
    }

    fn text(generator: JsonGenerator<Vec<u8>>) -> String {
        String::from_utf8(generator.finish().unwrap()).unwrap()
    }

    #[test]
    fn object_separators() {
        let mut g = generator();
        g.write_start_object().unwrap();
        g.write_field_name("a").unwrap();
        g.write_i64(1).unwrap();
        g.write_field_name("b").unwrap();
        g.write_start_array().unwrap();
        g.write_bool(true).unwrap();
        g.write_null().unwrap();
        g.write_string("x").unwrap();
        g.write_end_array().unwrap();
        g.write_field_name("c").unwrap();
        g.write_start_object().unwrap();
        g.write_end_object().unwrap();
        g.write_end_object().unwrap();
        assert_eq!(text(g), r#"{"a":1,"b":[true,null,"x"],"c":{}}"#);
    }

    #[test]
    fn strings_are_escaped() {
        let mut g = generator();
        g.write_start_object().unwrap();
        g.write_field_name("quote\"key").unwrap();
        g.write_string("line\nbreak \\ \u{1}").unwrap();
        g.write_end_object().unwrap();
        assert_eq!(
            text(g),
            r#"{"quote\"key":"line\nbreak \\ \u0001"}"#
        );
    }

    #[test]
    fn floats_and_non_finite() {
        let mut g = generator();
        g.write_start_array().unwrap();
        g.write_f64(2.5).unwrap();
        g.write_f32(1.5).unwrap();
        g.write_f64(f64::NAN).unwrap();
        g.write_f64(f64::INFINITY).unwrap();
        g.write_f32(f32::NEG_INFINITY).unwrap();
        g.write_end_array().unwrap();
        assert_eq!(text(g), r#"[2.5,1.5,"NaN","Infinity","-Infinity"]"#);
    }

    #[test]
    fn raw_and_number_text() {
        let mut g = generator();
        g.write_start_array().unwrap();
        g.write_number_str("123.45").unwrap();
        g.write_raw_value(r#"{"x":[1]}"#).unwrap();
        g.write_end_array().unwrap();
        assert_eq!(text(g), r#"[123.45,{"x":[1]}]"#);
    }

    #[test]
    fn value_without_field_name_is_internal() {
        let mut g = generator();
        g.write_start_object().unwrap();
        let err = g.write_i64(1).unwrap_err();
        assert!(matches!(err, RowJsonError::Internal(_)));
    }

    #[test]
    fn dangling_field_name_is_internal() {
        let mut g = generator();
        g.write_start_object().unwrap();
        g.write_field_name("k").unwrap();
        assert!(matches!(
            g.write_field_name("k2"),
            Err(RowJsonError::Internal(_))
        ));
        assert!(matches!(
            g.write_end_object(),
            Err(RowJsonError::Internal(_))
        ));
    }

    #[test]
    fn mismatched_close_is_internal() {
        let mut g = generator();
        g.write_start_array().unwrap();
        assert!(matches!(
            g.write_end_object(),
            Err(RowJsonError::Internal(_))
        ));
    }

    #[test]
    fn unclosed_scopes_fail_finish() {
        let mut g = generator();
        g.write_start_object().unwrap();
        assert!(matches!(g.finish(), Err(RowJsonError::Internal(_))));
    }

    #[test]
    fn second_root_value_is_internal() {
        let mut g = generator();
        g.write_i64(1).unwrap();
        assert!(matches!(g.write_i64(2), Err(RowJsonError::Internal(_))));
    }

    #[test]
    fn depth_limit() {
        let mut g = JsonGenerator::new(Vec::new(), 2);
        g.write_start_array().unwrap();
        g.write_start_array().unwrap();
        assert_eq!(g.depth(), 2);
        let err = g.write_start_array().unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("maximum depth of 2"));
    }

    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_is_internal() {
        let mut g = JsonGenerator::new(FailingWriter, 4);
        let err = g.write_start_object().unwrap_err();
        assert!(matches!(err, RowJsonError::Internal(_)));
        assert!(err.to_string().contains("sink closed"));
    }
}
