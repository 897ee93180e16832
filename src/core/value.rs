// src/value.rs

use std::fmt;

use super::kind::OperandKindTag;
use super::matrix::{DenseMatrix, Matrix, SparseMatrix, StorageKind};
use super::scalar::Scalar;

/// Represents an operand - scalars, nested sequences or matrices
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>), // Nested sequence of any depth
    Matrix(Matrix),
}

impl Value {
    /// Get the dispatch tag of this value
    pub fn kind(&self) -> OperandKindTag {
        match self {
            Value::Scalar(s) => s.kind(),
            Value::Sequence(_) => OperandKindTag::Sequence,
            Value::Matrix(m) => match m.storage() {
                StorageKind::Dense => OperandKindTag::DenseMatrix,
                StorageKind::Sparse => OperandKindTag::SparseMatrix,
            },
        }
    }

    /// Sequence of plain numbers
    pub fn numbers(xs: &[f64]) -> Value {
        Value::Sequence(xs.iter().map(|x| Value::from(*x)).collect())
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// True for a scalar exactly equal to zero
    pub fn is_zero_scalar(&self) -> bool {
        matches!(self, Value::Scalar(s) if s.is_zero())
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(Scalar::Number(x))
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl From<DenseMatrix> for Value {
    fn from(m: DenseMatrix) -> Self {
        Value::Matrix(Matrix::Dense(m))
    }
}

impl From<SparseMatrix> for Value {
    fn from(m: SparseMatrix) -> Self {
        Value::Matrix(Matrix::Sparse(m))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Matrix(Matrix::Dense(m)) => {
                write!(f, "DenseMatrix{} {}", m.shape(), m.to_nested())
            }
            Value::Matrix(Matrix::Sparse(m)) => {
                write!(f, "SparseMatrix{} {{", m.shape())?;
                for (i, (r, c, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " ({}, {}): {}", r, c, v)?;
                }
                write!(f, " }}")
            }
        }
    }
}
