use crate::logical_type::LogicalType;

/// Whether values of `ty` (including every type nested inside it) can be
/// rendered as JSON.
pub fn is_json_convertible(ty: &LogicalType) -> bool {
    match ty {
        LogicalType::Unknown
        | LogicalType::Boolean
        | LogicalType::TinyInt
        | LogicalType::SmallInt
        | LogicalType::Integer
        | LogicalType::BigInt
        | LogicalType::Real
        | LogicalType::Double
        | LogicalType::Decimal { .. }
        | LogicalType::Char(_)
        | LogicalType::Varchar(_)
        | LogicalType::Json
        | LogicalType::Date
        | LogicalType::Timestamp => true,
        LogicalType::Varbinary => false,
        LogicalType::Array(element) => is_json_convertible(element),
        LogicalType::Map { key, value } => is_json_map_key(key) && is_json_convertible(value),
        LogicalType::Row(params) => params.iter().all(is_json_convertible),
    }
}

/// Whether `ty` can be used as the key type of a map rendered as a JSON
/// object. Keys become JSON field names, so only scalars with an
/// unambiguous text form qualify.
pub fn is_json_map_key(ty: &LogicalType) -> bool {
    matches!(
        ty,
        LogicalType::Unknown
            | LogicalType::Boolean
            | LogicalType::Real
            | LogicalType::Double
            | LogicalType::Decimal { .. }
            | LogicalType::Char(_)
            | LogicalType::Varchar(_)
    ) || ty.is_integer()
}

/// Number of nested JSON containers a value of `ty` can open: 0 for
/// scalars, 1 for a flat row, array or map, and so on.
///
/// Walks with an explicit stack, so an arbitrarily deep type is measured
/// without recursing.
pub fn container_depth(ty: &LogicalType) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(ty, 0usize)];
    while let Some((ty, depth)) = pending.pop() {
        deepest = deepest.max(depth);
        match ty {
            LogicalType::Row(params) => {
                pending.extend(params.iter().map(|param| (param, depth + 1)));
            }
            LogicalType::Array(element) => pending.push((element, depth + 1)),
            LogicalType::Map { key, value } => {
                pending.push((key, depth + 1));
                pending.push((value, depth + 1));
            }
            _ => {}
        }
    }
    deepest
}
