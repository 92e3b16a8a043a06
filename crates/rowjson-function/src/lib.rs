//! rowjson-function: scalar function registry and the extension trait used to
//! populate it.

pub mod extension;
pub mod registry;

pub use extension::ScalarExtension;
pub use registry::{FunctionId, FunctionRegistry, FunctionSignature, ParamConstraint, ScalarImpl};
