// src/lib.rs

pub mod core;

pub mod dsl;
pub mod engine;
pub mod functions;

// Re-exports para tener una API limpia desde fuera del crate
pub use crate::core::config::{ConfigError, EngineConfig};
pub use crate::core::kind::{KindPattern, OperandKindTag, Signature};
pub use crate::core::matrix::{DenseMatrix, Matrix, Shape, SparseMatrix, StorageKind};
pub use crate::core::scalar::Scalar;
pub use crate::core::value::Value;
pub use dsl::{execute_line, execute_script, DslError, DslOutput};
pub use engine::kernels::{dense_scalar, matrix_scalar, sparse_scalar, Order};
pub use engine::{Assembler, EngineError, Operation, OperationDecl, Registry};

/// `fix` from the standard registry
pub fn fix(args: &[Value]) -> Result<Value, EngineError> {
    Registry::standard()?.call(functions::fix::NAME, args)
}

/// `floor` from the standard registry
pub fn floor(args: &[Value]) -> Result<Value, EngineError> {
    Registry::standard()?.call(functions::floor::NAME, args)
}

/// `ceil` from the standard registry
pub fn ceil(args: &[Value]) -> Result<Value, EngineError> {
    Registry::standard()?.call(functions::ceil::NAME, args)
}
