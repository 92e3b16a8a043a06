//! Function registry — scalar function signatures and implementations.
//!
//! Resolves calls by name (case-insensitive) and argument types, then invokes
//! the bound implementation. Functions follow SQL null semantics: any `NULL`
//! argument makes the result `NULL` without calling the implementation.

use hashbrown::HashMap;
use rowjson_common::{RowJsonError, RowJsonResult};
use rowjson_types::{LogicalType, TypedValue};
use smol_str::SmolStr;

use crate::extension::ScalarExtension;

/// Unique function identifier for O(1) lookup after resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// What a parameter slot accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamConstraint {
    Exact(LogicalType),
    /// Any row type, whatever its parameters.
    AnyRow,
    Any,
}

impl ParamConstraint {
    /// Whether an argument of type `ty` binds to this slot. `unknown` (the
    /// type of a bare NULL) binds everywhere.
    pub fn accepts(&self, ty: &LogicalType) -> bool {
        if matches!(ty, LogicalType::Unknown) {
            return true;
        }
        match self {
            Self::Exact(expected) => expected == ty,
            Self::AnyRow => matches!(ty, LogicalType::Row(_)),
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for ParamConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(ty) => write!(f, "{ty}"),
            Self::AnyRow => write!(f, "row(..)"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Implementation of a scalar function: declared argument types plus the
/// (non-null) argument values.
pub type ScalarImpl =
    Box<dyn Fn(&[LogicalType], &[TypedValue]) -> RowJsonResult<TypedValue> + Send + Sync>;

/// A scalar function signature.
#[derive(Clone, Debug)]
pub struct FunctionSignature {
    pub id: FunctionId,
    pub name: SmolStr,
    pub description: SmolStr,
    pub params: Vec<ParamConstraint>,
    pub return_type: LogicalType,
}

struct RegisteredFunction {
    signature: FunctionSignature,
    implementation: ScalarImpl,
}

/// Registry of scalar functions.
///
/// Populated once at startup; immutable while evaluating.
pub struct FunctionRegistry {
    functions: Vec<RegisteredFunction>,
    name_index: HashMap<SmolStr, Vec<usize>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            name_index: HashMap::new(),
        }
    }

    /// Register a function. Returns the assigned FunctionId.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        params: Vec<ParamConstraint>,
        return_type: LogicalType,
        implementation: ScalarImpl,
    ) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        let lower_name = SmolStr::new(name.to_lowercase());
        let signature = FunctionSignature {
            id,
            name: lower_name.clone(),
            description: SmolStr::new(description),
            params,
            return_type,
        };
        let idx = self.functions.len();
        self.functions.push(RegisteredFunction {
            signature,
            implementation,
        });
        self.name_index.entry(lower_name).or_default().push(idx);
        id
    }

    /// Register every function an extension provides.
    pub fn load(&mut self, extension: &dyn ScalarExtension) {
        let before = self.len();
        extension.register(self);
        tracing::debug!(
            "loaded extension '{}' ({} functions)",
            extension.name(),
            self.len() - before
        );
    }

    /// Resolve a call: name + argument types → first matching signature.
    pub fn resolve(&self, name: &str, arg_types: &[LogicalType]) -> RowJsonResult<&FunctionSignature> {
        self.resolve_index(name, arg_types)
            .map(|idx| &self.functions[idx].signature)
    }

    fn resolve_index(&self, name: &str, arg_types: &[LogicalType]) -> RowJsonResult<usize> {
        let lower = name.to_lowercase();
        let overloads = self
            .name_index
            .get(lower.as_str())
            .ok_or_else(|| RowJsonError::Binder(format!("unknown function '{name}'")))?;

        overloads
            .iter()
            .copied()
            .find(|&idx| matches(&self.functions[idx].signature, arg_types))
            .ok_or_else(|| {
                let type_names: Vec<_> = arg_types.iter().map(|t| t.type_name()).collect();
                RowJsonError::Binder(format!(
                    "no matching overload for {}({})",
                    name,
                    type_names.join(", "),
                ))
            })
    }

    /// Resolve and evaluate a call on typed arguments.
    pub fn invoke(&self, name: &str, args: &[(LogicalType, TypedValue)]) -> RowJsonResult<TypedValue> {
        let (types, values): (Vec<_>, Vec<_>) = args.iter().cloned().unzip();
        let idx = self.resolve_index(name, &types)?;
        if values.iter().any(TypedValue::is_null) {
            return Ok(TypedValue::Null);
        }
        (self.functions[idx].implementation)(&types, &values)
    }

    /// Look up by FunctionId (O(1)).
    pub fn get(&self, id: FunctionId) -> Option<&FunctionSignature> {
        self.functions.get(id.0 as usize).map(|f| &f.signature)
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn matches(sig: &FunctionSignature, arg_types: &[LogicalType]) -> bool {
    sig.params.len() == arg_types.len()
        && sig
            .params
            .iter()
            .zip(arg_types)
            .all(|(param, arg)| param.accepts(arg))
}
