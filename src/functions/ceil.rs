// src/functions/ceil.rs

use super::rounding::{declare_directed, Direction};
use crate::engine::OperationDecl;

pub const NAME: &str = "ceil";

/// Round toward positive infinity, optionally to `n` decimals.
pub fn declare() -> OperationDecl {
    declare_directed(NAME, Direction::Up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::core::matrix::DenseMatrix;
    use crate::core::scalar::Scalar;
    use crate::core::value::Value;
    use crate::engine::Registry;

    #[test]
    fn test_ceil_decimal_and_dense() {
        let registry = Registry::builder(EngineConfig::default())
            .declare(declare())
            .build()
            .unwrap();

        let out = registry
            .call(
                NAME,
                &[Scalar::decimal("-3.18").unwrap().into(), Value::from(1.0)],
            )
            .unwrap();
        assert_eq!(out, Value::from(Scalar::decimal("-3.1").unwrap()));

        let m = DenseMatrix::from_nested(&[Value::numbers(&[0.2, -0.2])]).unwrap();
        let out = registry.call(NAME, &[m.into()]).unwrap();
        let expected = DenseMatrix::from_nested(&[Value::numbers(&[1.0, -0.0])]).unwrap();
        assert_eq!(out, Value::from(expected));
    }
}
