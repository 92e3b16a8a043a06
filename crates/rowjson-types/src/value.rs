use smol_str::SmolStr;

/// A decoded value as handed out by a block.
///
/// Values carry no type information of their own beyond the variant: the
/// declared `LogicalType` of the position they were read from decides how
/// they are interpreted (e.g. the scale of a `Decimal`).
#[derive(Clone, Debug)]
pub enum TypedValue {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    /// Unscaled decimal value; the scale comes from the declared type.
    Decimal(i128),
    /// Text of a `char`, `varchar`, or `json` value.
    String(SmolStr),
    Binary(Vec<u8>),
    /// Days since 1970-01-01.
    Date(i32),
    /// Milliseconds since 1970-01-01T00:00:00.
    Timestamp(i64),
    Array(Vec<TypedValue>),
    Map(Vec<(TypedValue, TypedValue)>),
    Row(RowValue),
}

// Manual PartialEq: use to_bits() for floats so NaN compares equal to itself.
impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::TinyInt(a), Self::TinyInt(b)) => a == b,
            (Self::SmallInt(a), Self::SmallInt(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Row(a), Self::Row(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypedValue {}

impl TypedValue {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(SmolStr::new(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to extract a nested row.
    pub fn as_row(&self) -> Option<&RowValue> {
        match self {
            Self::Row(row) => Some(row),
            _ => None,
        }
    }

    /// Name of the value variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::TinyInt(_) => "tinyint",
            Self::SmallInt(_) => "smallint",
            Self::Integer(_) => "integer",
            Self::BigInt(_) => "bigint",
            Self::Real(_) => "real",
            Self::Double(_) => "double",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Row(_) => "row",
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<RowValue> for TypedValue {
    fn from(row: RowValue) -> Self {
        Self::Row(row)
    }
}

/// One materialized row: an ordered, fixed-length list of component values
/// addressed by zero-based position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowValue {
    values: Vec<TypedValue>,
}

impl RowValue {
    pub fn new(values: Vec<TypedValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&TypedValue> {
        self.values.get(position)
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }
}

impl FromIterator<TypedValue> for RowValue {
    fn from_iter<I: IntoIterator<Item = TypedValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
