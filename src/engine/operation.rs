use std::fmt;
use std::sync::Arc;

use super::error::EngineError;
use super::resolver::Resolver;
use crate::core::kind::{OperandKindTag, Signature};
use crate::core::scalar::Scalar;
use crate::core::value::Value;

/// Body of one signature. The first argument is the operation being
/// called, so collection branches can recurse into it per element.
pub type Implementation =
    Arc<dyn Fn(&Operation, &[Value]) -> Result<Value, EngineError> + Send + Sync>;

/// Wraps a closure as an `Implementation`
pub fn implementation<F>(f: F) -> Implementation
where
    F: Fn(&Operation, &[Value]) -> Result<Value, EngineError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named, dispatchable operation. Immutable once built.
pub struct Operation {
    name: String,
    dependencies: Vec<String>,
    resolver: Resolver,
}

impl Operation {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>, resolver: Resolver) -> Self {
        Self {
            name: name.into(),
            dependencies,
            resolver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn signatures(&self) -> impl Iterator<Item = &Signature> + '_ {
        self.resolver.signatures()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve on the runtime kinds of `args` and run the selected body.
    pub fn call(&self, args: &[Value]) -> Result<Value, EngineError> {
        let kinds: Vec<OperandKindTag> = args.iter().map(Value::kind).collect();
        let body = self.resolver.resolve(&self.name, &kinds)?;
        body(self, args)
    }

    /// Scalar-in, scalar-out call used by the elementwise kernels.
    pub fn call_scalar(&self, x: &Scalar) -> Result<Scalar, EngineError> {
        let out = self.call(&[Value::Scalar(x.clone())])?;
        self.expect_scalar(out)
    }

    pub fn call_scalar2(&self, x: &Scalar, y: &Scalar) -> Result<Scalar, EngineError> {
        let out = self.call(&[Value::Scalar(x.clone()), Value::Scalar(y.clone())])?;
        self.expect_scalar(out)
    }

    fn expect_scalar(&self, out: Value) -> Result<Scalar, EngineError> {
        match out {
            Value::Scalar(s) => Ok(s),
            other => Err(EngineError::InvalidValue(format!(
                "'{}' returned {} where a scalar was expected",
                self.name,
                other.kind()
            ))),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("signatures", &self.resolver.len())
            .finish()
    }
}

/// Positional scalar argument; the resolver has already checked the kind.
pub(crate) fn scalar_arg<'a>(
    operation: &Operation,
    args: &'a [Value],
    position: usize,
) -> Result<&'a Scalar, EngineError> {
    match args.get(position) {
        Some(Value::Scalar(s)) => Ok(s),
        _ => Err(EngineError::unsupported(
            operation.name(),
            &args.iter().map(Value::kind).collect::<Vec<_>>(),
        )),
    }
}
