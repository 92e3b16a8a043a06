/// Declared SQL type of a value.
///
/// This is a closed set: serializers decide how to render a value by matching
/// on the declared type, never by inspecting the runtime value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LogicalType {
    /// Type of a bare `NULL` literal.
    Unknown,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal {
        precision: u8,
        scale: u8,
    },
    /// Fixed-width character type.
    Char(u32),
    /// Variable-width character type; `None` is unbounded.
    Varchar(Option<u32>),
    Varbinary,
    Date,
    /// Millisecond-precision timestamp without time zone.
    Timestamp,
    Json,
    Array(Box<LogicalType>),
    Map {
        key: Box<LogicalType>,
        value: Box<LogicalType>,
    },
    /// Anonymous row: the ordered component types are its type parameters.
    Row(Vec<LogicalType>),
}

impl LogicalType {
    /// Unbounded `varchar`.
    pub const VARCHAR: Self = Self::Varchar(None);

    pub fn array(element: LogicalType) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn map(key: LogicalType, value: LogicalType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Type parameters of a row type, `None` for every other type.
    pub fn row_parameters(&self) -> Option<&[LogicalType]> {
        match self {
            Self::Row(params) => Some(params),
            _ => None,
        }
    }

    /// Whether this is a character type (fixed or variable width).
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Char(_) | Self::Varchar(_))
    }

    /// Whether this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }

    /// SQL-style type name used in error messages.
    pub fn type_name(&self) -> std::borrow::Cow<'static, str> {
        match self {
            Self::Unknown => "unknown".into(),
            Self::Boolean => "boolean".into(),
            Self::TinyInt => "tinyint".into(),
            Self::SmallInt => "smallint".into(),
            Self::Integer => "integer".into(),
            Self::BigInt => "bigint".into(),
            Self::Real => "real".into(),
            Self::Double => "double".into(),
            Self::Decimal { precision, scale } => format!("decimal({precision},{scale})").into(),
            Self::Char(len) => format!("char({len})").into(),
            Self::Varchar(None) => "varchar".into(),
            Self::Varchar(Some(len)) => format!("varchar({len})").into(),
            Self::Varbinary => "varbinary".into(),
            Self::Date => "date".into(),
            Self::Timestamp => "timestamp(3)".into(),
            Self::Json => "json".into(),
            Self::Array(element) => format!("array({})", element.type_name()).into(),
            Self::Map { key, value } => {
                format!("map({}, {})", key.type_name(), value.type_name()).into()
            }
            Self::Row(params) => {
                let names: Vec<_> = params.iter().map(|p| p.type_name()).collect();
                format!("row({})", names.join(", ")).into()
            }
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
