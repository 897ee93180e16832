pub mod config;
pub mod kind;
pub mod matrix;
pub mod scalar;
pub mod value;

// Re-export commonly used types
pub use config::EngineConfig;
pub use kind::{KindPattern, OperandKindTag, Signature};
pub use matrix::{DenseMatrix, Matrix, Shape, SparseMatrix, StorageKind};
pub use scalar::Scalar;
pub use value::Value;
