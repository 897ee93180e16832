use crate::core::kind::OperandKindTag;
use thiserror::Error;

fn join_kinds(kinds: &[OperandKindTag]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No registered signature accepts the runtime operand kinds
    #[error("Unsupported operand kinds for '{operation}': ({})", join_kinds(.kinds))]
    UnsupportedOperandKinds {
        operation: String,
        kinds: Vec<OperandKindTag>,
    },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid decimal count: {0}")]
    InvalidDecimalCount(String),

    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Operation not found: {0}")]
    UnknownOperation(String),

    #[error("Operation '{0}' is already declared")]
    DuplicateOperation(String),

    #[error("Operation '{operation}' depends on undeclared '{dependency}'")]
    MissingDependency {
        operation: String,
        dependency: String,
    },

    #[error("Dependency cycle between operations: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
}

impl EngineError {
    pub fn unsupported(operation: &str, kinds: &[OperandKindTag]) -> Self {
        EngineError::UnsupportedOperandKinds {
            operation: operation.to_string(),
            kinds: kinds.to_vec(),
        }
    }
}
