// src/engine/assembler.rs

use std::slice;

use super::error::EngineError;
use super::kernels::{deep_map, deep_map_with, dense_scalar, matrix_scalar, Order};
use super::operation::{implementation, scalar_arg, Operation};
use super::resolver::Resolver;
use crate::core::config::EngineConfig;
use crate::core::kind::{KindPattern, OperandKindTag, Signature};
use crate::core::matrix::{DenseMatrix, Matrix};
use crate::core::scalar::Scalar;
use crate::core::value::Value;

/// Builds one `Operation`: leaf policies first, then the collection and
/// matrix signatures that route through the kernels.
pub struct Assembler {
    name: String,
    dependencies: Vec<String>,
    resolver: Resolver,
}

impl Assembler {
    pub fn new(name: &str, config: &EngineConfig) -> Self {
        Self {
            name: name.to_string(),
            dependencies: Vec::new(),
            resolver: Resolver::new(config.dispatch.cache_resolutions),
        }
    }

    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.dependencies
            .extend(dependencies.iter().map(|d| d.to_string()));
        self
    }

    /// Registers a raw signature
    pub fn signature<F>(mut self, signature: Signature, f: F) -> Self
    where
        F: Fn(&Operation, &[Value]) -> Result<Value, EngineError> + Send + Sync + 'static,
    {
        self.resolver.register(signature, implementation(f));
        self
    }

    /// One scalar argument
    pub fn unary<P, F>(self, pattern: P, f: F) -> Self
    where
        P: Into<KindPattern>,
        F: Fn(&Scalar) -> Result<Scalar, EngineError> + Send + Sync + 'static,
    {
        let patterns: [KindPattern; 1] = [pattern.into()];
        self.signature(Signature::new(patterns), move |op, args| {
            f(scalar_arg(op, args, 0)?).map(Value::Scalar)
        })
    }

    /// Two scalar arguments
    pub fn binary<P, Q, F>(self, first: P, second: Q, f: F) -> Self
    where
        P: Into<KindPattern>,
        Q: Into<KindPattern>,
        F: Fn(&Scalar, &Scalar) -> Result<Scalar, EngineError> + Send + Sync + 'static,
    {
        let patterns: [KindPattern; 2] = [first.into(), second.into()];
        self.signature(
            Signature::new(patterns),
            move |op, args| f(scalar_arg(op, args, 0)?, scalar_arg(op, args, 1)?).map(Value::Scalar),
        )
    }

    /// Collection signatures for an operation with `op(0) == 0` and
    /// `op(0, n) == 0`:
    ///
    /// - `(collection)` and `(collection, Number | Decimal)`: deep traversal
    ///   with the skip-zero shortcut
    /// - `(scalar, Sequence)`: through a temporary dense matrix
    /// - `(scalar, DenseMatrix | SparseMatrix)`: elementwise kernels, with a
    ///   zero scalar short-circuiting to a zero matrix
    pub fn zero_preserving_collections(self) -> Self {
        use OperandKindTag as K;

        self.signature(Signature::new([KindPattern::collection()]), |op, args| {
            deep_map(&args[0], &|leaf: &Value| op.call(slice::from_ref(leaf)), true)
        })
        .signature(
            Signature::new([KindPattern::collection(), K::Number | K::Decimal]),
            |op, args| {
                deep_map_with(
                    &args[0],
                    &|leaf: &Value, n: &Value| op.call(&[leaf.clone(), n.clone()]),
                    &args[1],
                    true,
                )
            },
        )
        .signature(
            Signature::new([KindPattern::scalar(), KindPattern::from(K::Sequence)]),
            |op, args| {
                let x = scalar_arg(op, args, 0)?;
                let Value::Sequence(items) = &args[1] else {
                    return Err(unsupported_args(op, args));
                };
                let m = DenseMatrix::from_nested(items)?;
                let elementwise = |a: &Scalar, b: &Scalar| op.call_scalar2(a, b);
                Ok(dense_scalar(&m, x, &elementwise, Order::ScalarFirst)?.to_nested())
            },
        )
        .signature(
            Signature::new([KindPattern::scalar(), K::DenseMatrix | K::SparseMatrix]),
            |op, args| {
                let x = scalar_arg(op, args, 0)?;
                let Value::Matrix(m) = &args[1] else {
                    return Err(unsupported_args(op, args));
                };
                if x.is_zero() {
                    return Matrix::zeros(&m.shape(), m.storage()).map(Value::Matrix);
                }
                let elementwise = |a: &Scalar, b: &Scalar| op.call_scalar2(a, b);
                matrix_scalar(m, x, &elementwise, Order::ScalarFirst).map(Value::Matrix)
            },
        )
    }

    pub fn build(self) -> Operation {
        Operation::new(self.name, self.dependencies, self.resolver)
    }
}

fn unsupported_args(op: &Operation, args: &[Value]) -> EngineError {
    EngineError::unsupported(op.name(), &args.iter().map(Value::kind).collect::<Vec<_>>())
}
