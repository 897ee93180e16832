// src/engine/kernels.rs

use crate::core::matrix::{DenseMatrix, Matrix, SparseMatrix};
use crate::core::scalar::Scalar;
use crate::core::value::Value;
use crate::engine::EngineError;

/// Argument order for a matrix/scalar binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// op(M[i], s)
    MatrixFirst,
    /// op(s, M[i])
    ScalarFirst,
}

#[inline]
fn apply_ordered<F>(op: &F, element: &Scalar, scalar: &Scalar, order: Order) -> Result<Scalar, EngineError>
where
    F: Fn(&Scalar, &Scalar) -> Result<Scalar, EngineError>,
{
    match order {
        Order::MatrixFirst => op(element, scalar),
        Order::ScalarFirst => op(scalar, element),
    }
}

/// True when `op` maps the implicit zero to zero for this scalar, i.e. the
/// sparse kernel may skip structural zeros.
pub fn preserves_zero<F>(op: &F, scalar: &Scalar, order: Order) -> Result<bool, EngineError>
where
    F: Fn(&Scalar, &Scalar) -> Result<Scalar, EngineError>,
{
    Ok(apply_ordered(op, &Scalar::Number(0.0), scalar, order)?.is_zero())
}

// ============================================================================
// DEEP TRAVERSAL
// ============================================================================

/// Applies `f` to every leaf of a nested sequence or matrix store.
///
/// With `skip_zero`, a leaf that is exactly zero is copied without calling
/// `f`; callers must only ask for this when `f(0) == 0`.
pub fn deep_map<F>(value: &Value, f: &F, skip_zero: bool) -> Result<Value, EngineError>
where
    F: Fn(&Value) -> Result<Value, EngineError>,
{
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| deep_map(item, f, skip_zero))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Matrix(matrix) => {
            let leaf = |s: &Scalar| match f(&Value::Scalar(s.clone()))? {
                Value::Scalar(out) => Ok(out),
                other => Err(EngineError::InvalidValue(format!(
                    "matrix element mapped to {}",
                    other.kind()
                ))),
            };
            map_matrix(matrix, &leaf, skip_zero).map(Value::Matrix)
        }
        leaf if skip_zero && leaf.is_zero_scalar() => Ok(leaf.clone()),
        leaf => f(leaf),
    }
}

/// `deep_map` with a fixed second argument: `f(leaf, arg)` per leaf.
pub fn deep_map_with<F>(value: &Value, f: &F, arg: &Value, skip_zero: bool) -> Result<Value, EngineError>
where
    F: Fn(&Value, &Value) -> Result<Value, EngineError>,
{
    deep_map(value, &|leaf: &Value| f(leaf, arg), skip_zero)
}

/// Shape- and storage-preserving map over a matrix value store.
pub fn map_matrix<F>(matrix: &Matrix, f: &F, skip_zero: bool) -> Result<Matrix, EngineError>
where
    F: Fn(&Scalar) -> Result<Scalar, EngineError>,
{
    match matrix {
        Matrix::Dense(m) => {
            let data = m
                .data()
                .iter()
                .map(|s| {
                    if skip_zero && s.is_zero() {
                        Ok(s.clone())
                    } else {
                        f(s)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            DenseMatrix::new(m.shape().clone(), data).map(Matrix::Dense)
        }
        Matrix::Sparse(m) if skip_zero => {
            let mut values = Vec::with_capacity(m.nnz());
            let mut index = Vec::with_capacity(m.nnz());
            let mut ptr = Vec::with_capacity(m.cols() + 1);
            ptr.push(0);
            for col in 0..m.cols() {
                for k in m.ptr()[col]..m.ptr()[col + 1] {
                    let out = f(&m.values()[k])?;
                    if !out.is_zero() {
                        values.push(out);
                        index.push(m.index()[k]);
                    }
                }
                ptr.push(values.len());
            }
            SparseMatrix::new(m.rows(), m.cols(), values, index, ptr).map(Matrix::Sparse)
        }
        Matrix::Sparse(m) => {
            // Every coordinate is visited, structural zeros included
            let mapped = map_matrix(&Matrix::Dense(m.to_dense()), f, false)?;
            SparseMatrix::from_dense(&mapped.to_dense()).map(Matrix::Sparse)
        }
    }
}

// ============================================================================
// DENSE ELEMENTWISE-SCALAR
// ============================================================================

/// R[i] = op(M[i], s) or op(s, M[i]) for every index of a dense matrix.
pub fn dense_scalar<F>(
    m: &DenseMatrix,
    scalar: &Scalar,
    op: &F,
    order: Order,
) -> Result<DenseMatrix, EngineError>
where
    F: Fn(&Scalar, &Scalar) -> Result<Scalar, EngineError>,
{
    if m.len() != m.shape().num_elements() {
        return Err(EngineError::ShapeMismatch(format!(
            "store holds {} values for shape {}",
            m.len(),
            m.shape()
        )));
    }
    let mut data = Vec::with_capacity(m.len());
    for element in m.data() {
        data.push(apply_ordered(op, element, scalar, order)?);
    }
    DenseMatrix::new(m.shape().clone(), data)
}

// ============================================================================
// SPARSE ELEMENTWISE-SCALAR
// ============================================================================

/// Sparse counterpart of `dense_scalar`, O(nnz).
///
/// Only stored entries are visited, so the caller must have checked
/// `preserves_zero(op, scalar, order)`. Results that come out as exact
/// zero are dropped from the output store.
pub fn sparse_scalar<F>(
    m: &SparseMatrix,
    scalar: &Scalar,
    op: &F,
    order: Order,
) -> Result<SparseMatrix, EngineError>
where
    F: Fn(&Scalar, &Scalar) -> Result<Scalar, EngineError>,
{
    let mut values = Vec::with_capacity(m.nnz());
    let mut index = Vec::with_capacity(m.nnz());
    let mut ptr = Vec::with_capacity(m.cols() + 1);
    ptr.push(0);

    for col in 0..m.cols() {
        for k in m.ptr()[col]..m.ptr()[col + 1] {
            let out = apply_ordered(op, &m.values()[k], scalar, order)?;
            if !out.is_zero() {
                values.push(out);
                index.push(m.index()[k]);
            }
        }
        ptr.push(values.len());
    }

    SparseMatrix::new(m.rows(), m.cols(), values, index, ptr)
}

/// Matrix/scalar elementwise op that keeps the matrix's storage.
///
/// Sparse inputs take the O(nnz) path when the op keeps zeros; otherwise
/// they are densified, computed densely and re-sparsified.
pub fn matrix_scalar<F>(
    matrix: &Matrix,
    scalar: &Scalar,
    op: &F,
    order: Order,
) -> Result<Matrix, EngineError>
where
    F: Fn(&Scalar, &Scalar) -> Result<Scalar, EngineError>,
{
    match matrix {
        Matrix::Dense(m) => dense_scalar(m, scalar, op, order).map(Matrix::Dense),
        Matrix::Sparse(m) => {
            if preserves_zero(op, scalar, order)? {
                sparse_scalar(m, scalar, op, order).map(Matrix::Sparse)
            } else {
                tracing::warn!(
                    rows = m.rows(),
                    cols = m.cols(),
                    nnz = m.nnz(),
                    "operation does not keep zeros, densifying sparse matrix"
                );
                let dense = dense_scalar(&m.to_dense(), scalar, op, order)?;
                SparseMatrix::from_dense(&dense).map(Matrix::Sparse)
            }
        }
    }
}
