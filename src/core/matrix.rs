// src/core/matrix.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scalar::Scalar;
use super::value::Value;
use crate::engine::EngineError;

/// Representa la forma (shape) de una matriz.
/// [3]       -> vector (rank 1)
/// [2, 3]    -> matriz 2x3 (rank 2)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub dims: Vec<usize>,
}

impl Shape {
    /// Crea un nuevo shape a partir de una lista de dimensiones
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        Self { dims: dims.into() }
    }

    /// Número de dimensiones (rank)
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Número total de elementos
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    Dense,
    Sparse,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Dense => f.write_str("dense"),
            StorageKind::Sparse => f.write_str("sparse"),
        }
    }
}

// ============================================================================
// DENSE
// ============================================================================

/// Matriz densa con layout row-major
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    shape: Shape,
    data: Vec<Scalar>,
}

impl DenseMatrix {
    /// Crea una matriz verificando que data.len() coincide con shape.num_elements()
    pub fn new(shape: Shape, data: Vec<Scalar>) -> Result<Self, EngineError> {
        if shape.rank() == 0 {
            return Err(EngineError::InvalidMatrix(
                "dense matrix needs at least one dimension".into(),
            ));
        }
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(EngineError::ShapeMismatch(format!(
                "data length {} does not match shape {} (expected {})",
                data.len(),
                shape,
                expected
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Shape) -> Result<Self, EngineError> {
        let data = vec![Scalar::Number(0.0); shape.num_elements()];
        Self::new(shape, data)
    }

    /// Builds a dense matrix from a rectangular nested sequence.
    ///
    /// The shape is read off the first element at every depth; any ragged
    /// row or non-scalar leaf is a `ShapeMismatch`.
    pub fn from_nested(items: &[Value]) -> Result<Self, EngineError> {
        let mut dims = Vec::new();
        let mut level = items;
        loop {
            dims.push(level.len());
            match level.first() {
                Some(Value::Sequence(inner)) => level = inner,
                _ => break,
            }
        }

        let mut data = Vec::with_capacity(dims.iter().product());
        collect_nested(items, 0, &dims, &mut data)?;
        Self::new(Shape::new(dims), data)
    }

    /// Inverse of `from_nested`
    pub fn to_nested(&self) -> Value {
        build_nested(&self.data, &self.shape.dims)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn data(&self) -> &[Scalar] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Scalar> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major lookup by index tuple
    pub fn get(&self, indices: &[usize]) -> Option<&Scalar> {
        if indices.len() != self.shape.rank() {
            return None;
        }
        let mut flat = 0;
        for (idx, dim) in indices.iter().zip(&self.shape.dims) {
            if idx >= dim {
                return None;
            }
            flat = flat * dim + idx;
        }
        self.data.get(flat)
    }
}

fn collect_nested(
    items: &[Value],
    depth: usize,
    dims: &[usize],
    out: &mut Vec<Scalar>,
) -> Result<(), EngineError> {
    if items.len() != dims[depth] {
        return Err(EngineError::ShapeMismatch(format!(
            "ragged sequence: expected {} items at depth {}, found {}",
            dims[depth],
            depth,
            items.len()
        )));
    }
    let innermost = depth + 1 == dims.len();
    for item in items {
        match (item, innermost) {
            (Value::Scalar(s), true) => out.push(s.clone()),
            (Value::Sequence(inner), false) => collect_nested(inner, depth + 1, dims, out)?,
            (other, _) => {
                return Err(EngineError::ShapeMismatch(format!(
                    "unexpected {} at depth {} of a {}-dimensional sequence",
                    other.kind(),
                    depth,
                    dims.len()
                )))
            }
        }
    }
    Ok(())
}

fn build_nested(data: &[Scalar], dims: &[usize]) -> Value {
    if dims.len() <= 1 {
        return Value::Sequence(data.iter().cloned().map(Value::Scalar).collect());
    }
    let inner = &dims[1..];
    let chunk = inner.iter().product::<usize>();
    if chunk == 0 {
        return Value::Sequence((0..dims[0]).map(|_| build_nested(&[], inner)).collect());
    }
    Value::Sequence(
        data.chunks(chunk)
            .map(|rows| build_nested(rows, inner))
            .collect(),
    )
}

// ============================================================================
// SPARSE (CSC)
// ============================================================================

/// Rank-2 sparse matrix in compressed sparse column layout.
///
/// - `ptr`: `[cols + 1]` offsets into `index`/`values`
/// - `index`: `[nnz]` row of each stored value, strictly increasing per column
/// - `values`: `[nnz]` stored values, never zero
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    values: Vec<Scalar>,
    index: Vec<usize>,
    ptr: Vec<usize>,
}

/// Length of the CSC column pointer array for `cols` columns.
fn column_pointer_len(cols: usize) -> Result<usize, EngineError> {
    cols.checked_add(1).ok_or_else(|| {
        EngineError::InvalidMatrix(format!("{} columns is too many for sparse storage", cols))
    })
}

impl SparseMatrix {
    pub fn new(
        rows: usize,
        cols: usize,
        values: Vec<Scalar>,
        index: Vec<usize>,
        ptr: Vec<usize>,
    ) -> Result<Self, EngineError> {
        let expected = column_pointer_len(cols)?;
        if ptr.len() != expected {
            return Err(EngineError::InvalidMatrix(format!(
                "column pointers must have length {}, got {}",
                expected,
                ptr.len()
            )));
        }
        if ptr[0] != 0 || ptr[cols] != values.len() {
            return Err(EngineError::InvalidMatrix(
                "column pointers must start at 0 and end at nnz".into(),
            ));
        }
        if index.len() != values.len() {
            return Err(EngineError::InvalidMatrix(
                "row indices and values must have the same length".into(),
            ));
        }
        if let Some(col) = ptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(EngineError::InvalidMatrix(format!(
                "column pointers decrease at column {}",
                col
            )));
        }
        for col in 0..cols {
            let (start, end) = (ptr[col], ptr[col + 1]);
            for k in start..end {
                if index[k] >= rows {
                    return Err(EngineError::InvalidMatrix(format!(
                        "row index {} out of bounds for {} rows",
                        index[k], rows
                    )));
                }
                if k > start && index[k] <= index[k - 1] {
                    return Err(EngineError::InvalidMatrix(format!(
                        "row indices not strictly increasing in column {}",
                        col
                    )));
                }
                if values[k].is_zero() {
                    return Err(EngineError::InvalidMatrix(format!(
                        "explicit zero stored at ({}, {})",
                        index[k], col
                    )));
                }
            }
        }
        Ok(Self {
            rows,
            cols,
            values,
            index,
            ptr,
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self, EngineError> {
        Ok(Self {
            rows,
            cols,
            values: Vec::new(),
            index: Vec::new(),
            ptr: vec![0; column_pointer_len(cols)?],
        })
    }

    /// Builds from `(row, col, value)` entries in any order. Zero values are
    /// dropped; duplicate coordinates are rejected.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        mut entries: Vec<(usize, usize, Scalar)>,
    ) -> Result<Self, EngineError> {
        entries.retain(|(_, _, v)| !v.is_zero());
        entries.sort_by_key(|(r, c, _)| (*c, *r));

        let mut values = Vec::with_capacity(entries.len());
        let mut index = Vec::with_capacity(entries.len());
        let mut ptr = vec![0; column_pointer_len(cols)?];
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in entries {
            if r >= rows || c >= cols {
                return Err(EngineError::InvalidMatrix(format!(
                    "entry ({}, {}) out of bounds for {}x{}",
                    r, c, rows, cols
                )));
            }
            if last == Some((r, c)) {
                return Err(EngineError::InvalidMatrix(format!(
                    "duplicate entry at ({}, {})",
                    r, c
                )));
            }
            last = Some((r, c));
            ptr[c + 1] += 1;
            index.push(r);
            values.push(v);
        }
        for c in 0..cols {
            ptr[c + 1] += ptr[c];
        }

        Self::new(rows, cols, values, index, ptr)
    }

    /// Sparsify a rank-2 dense matrix, skipping exact zeros.
    pub fn from_dense(dense: &DenseMatrix) -> Result<Self, EngineError> {
        if dense.shape().rank() != 2 {
            return Err(EngineError::ShapeMismatch(format!(
                "sparse storage needs a rank-2 shape, got {}",
                dense.shape()
            )));
        }
        let (rows, cols) = (dense.shape().dims[0], dense.shape().dims[1]);
        let mut values = Vec::new();
        let mut index = Vec::new();
        let mut ptr = Vec::with_capacity(column_pointer_len(cols)?);
        ptr.push(0);
        for c in 0..cols {
            for r in 0..rows {
                let v = &dense.data()[r * cols + c];
                if !v.is_zero() {
                    values.push(v.clone());
                    index.push(r);
                }
            }
            ptr.push(values.len());
        }
        Ok(Self {
            rows,
            cols,
            values,
            index,
            ptr,
        })
    }

    pub fn to_dense(&self) -> DenseMatrix {
        let mut data = vec![Scalar::Number(0.0); self.rows * self.cols];
        for (r, c, v) in self.iter() {
            data[r * self.cols + c] = v.clone();
        }
        DenseMatrix {
            shape: self.shape(),
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        Shape::new(vec![self.rows, self.cols])
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn ptr(&self) -> &[usize] {
        &self.ptr
    }

    /// Value at `(row, col)`; structural zeros read as `Number(0)`.
    pub fn get(&self, row: usize, col: usize) -> Option<Scalar> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let column = &self.index[self.ptr[col]..self.ptr[col + 1]];
        match column.binary_search(&row) {
            Ok(k) => Some(self.values[self.ptr[col] + k].clone()),
            Err(_) => Some(Scalar::Number(0.0)),
        }
    }

    /// Stored entries in column-major order as `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Scalar)> + '_ {
        (0..self.cols).flat_map(move |c| {
            (self.ptr[c]..self.ptr[c + 1]).map(move |k| (self.index[k], c, &self.values[k]))
        })
    }
}

// ============================================================================
// MATRIX
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    Dense(DenseMatrix),
    Sparse(SparseMatrix),
}

impl Matrix {
    pub fn shape(&self) -> Shape {
        match self {
            Matrix::Dense(m) => m.shape().clone(),
            Matrix::Sparse(m) => m.shape(),
        }
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            Matrix::Dense(_) => StorageKind::Dense,
            Matrix::Sparse(_) => StorageKind::Sparse,
        }
    }

    /// All-zero matrix of the given shape and storage.
    pub fn zeros(shape: &Shape, storage: StorageKind) -> Result<Matrix, EngineError> {
        match storage {
            StorageKind::Dense => DenseMatrix::zeros(shape.clone()).map(Matrix::Dense),
            StorageKind::Sparse => {
                if shape.rank() != 2 {
                    return Err(EngineError::ShapeMismatch(format!(
                        "sparse storage needs a rank-2 shape, got {}",
                        shape
                    )));
                }
                SparseMatrix::zeros(shape.dims[0], shape.dims[1]).map(Matrix::Sparse)
            }
        }
    }

    pub fn to_dense(&self) -> DenseMatrix {
        match self {
            Matrix::Dense(m) => m.clone(),
            Matrix::Sparse(m) => m.to_dense(),
        }
    }
}

impl From<DenseMatrix> for Matrix {
    fn from(m: DenseMatrix) -> Self {
        Matrix::Dense(m)
    }
}

impl From<SparseMatrix> for Matrix {
    fn from(m: SparseMatrix) -> Self {
        Matrix::Sparse(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> Scalar {
        Scalar::Number(x)
    }

    fn nums(xs: &[f64]) -> Vec<Value> {
        xs.iter().map(|x| Value::Scalar(n(*x))).collect()
    }

    #[test]
    fn test_dense_rejects_wrong_length() {
        let err = DenseMatrix::new(Shape::new(vec![2, 2]), vec![n(1.0)]).unwrap_err();
        assert!(matches!(err, EngineError::ShapeMismatch(_)));
    }

    #[test]
    fn test_nested_roundtrip_2d() {
        let nested = vec![
            Value::Sequence(nums(&[1.0, 2.0, 3.0])),
            Value::Sequence(nums(&[4.0, 5.0, 6.0])),
        ];
        let m = DenseMatrix::from_nested(&nested).unwrap();
        assert_eq!(m.shape().dims, vec![2, 3]);
        assert_eq!(m.get(&[1, 0]), Some(&n(4.0)));
        assert_eq!(m.to_nested(), Value::Sequence(nested));
    }

    #[test]
    fn test_nested_ragged_is_shape_mismatch() {
        let nested = vec![
            Value::Sequence(nums(&[1.0, 2.0])),
            Value::Sequence(nums(&[3.0])),
        ];
        assert!(matches!(
            DenseMatrix::from_nested(&nested),
            Err(EngineError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_sparse_from_triplets_drops_zeros_and_orders() {
        let s = SparseMatrix::from_triplets(
            3,
            2,
            vec![(2, 0, n(5.0)), (0, 1, n(0.0)), (0, 0, n(1.0)), (1, 1, n(7.0))],
        )
        .unwrap();
        assert_eq!(s.nnz(), 3);
        assert_eq!(s.ptr(), &[0, 2, 3]);
        assert_eq!(s.index(), &[0, 2, 1]);
        assert_eq!(s.get(2, 0), Some(n(5.0)));
        assert_eq!(s.get(0, 1), Some(n(0.0)));
        assert_eq!(s.get(3, 0), None);
    }

    #[test]
    fn test_sparse_rejects_stored_zero() {
        let err = SparseMatrix::new(2, 1, vec![n(0.0)], vec![0], vec![0, 1]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMatrix(_)));
    }

    #[test]
    fn test_sparse_dense_conversion() {
        let dense = DenseMatrix::new(
            Shape::new(vec![2, 2]),
            vec![n(0.0), n(2.0), n(3.0), n(0.0)],
        )
        .unwrap();
        let sparse = SparseMatrix::from_dense(&dense).unwrap();
        assert_eq!(sparse.nnz(), 2);
        assert_eq!(sparse.to_dense(), dense);
    }

    #[test]
    fn test_zeros_factory() {
        let shape = Shape::new(vec![2, 3]);
        let sparse = Matrix::zeros(&shape, StorageKind::Sparse).unwrap();
        assert_eq!(sparse.shape(), shape);
        assert_eq!(sparse.storage(), StorageKind::Sparse);
        let dense = Matrix::zeros(&shape, StorageKind::Dense).unwrap();
        assert!(dense.to_dense().data().iter().all(Scalar::is_zero));
        assert!(Matrix::zeros(&Shape::new(vec![4]), StorageKind::Sparse).is_err());
    }

    #[test]
    fn test_column_count_overflow_is_rejected() {
        let err = SparseMatrix::from_triplets(1, usize::MAX, Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMatrix(_)));
        assert!(matches!(
            SparseMatrix::zeros(0, usize::MAX),
            Err(EngineError::InvalidMatrix(_))
        ));
        assert!(matches!(
            SparseMatrix::new(1, usize::MAX, Vec::new(), Vec::new(), vec![0]),
            Err(EngineError::InvalidMatrix(_))
        ));
        assert!(Matrix::zeros(&Shape::new(vec![1, usize::MAX]), StorageKind::Sparse).is_err());
    }
}
