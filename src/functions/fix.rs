// src/functions/fix.rs

use std::sync::Arc;

use super::{ceil, floor};
use crate::core::kind::OperandKindTag;
use crate::core::scalar::Scalar;
use crate::engine::{Assembler, EngineError, Operation, OperationDecl};

pub const NAME: &str = "fix";

/// Round toward zero. Positive values go through `floor`, the rest through
/// `ceil`; both are resolved once when the registry is built.
struct TowardZero {
    floor: Arc<Operation>,
    ceil: Arc<Operation>,
}

impl TowardZero {
    /// Number and Decimal: `x > 0` floors, everything else ceils.
    fn by_positive(&self, x: &Scalar) -> &Operation {
        if x.is_positive() {
            &self.floor
        } else {
            &self.ceil
        }
    }

    /// Rational: only negatives ceil.
    fn by_sign(&self, x: &Scalar) -> &Operation {
        if x.is_negative() {
            &self.ceil
        } else {
            &self.floor
        }
    }

    fn pick(&self, x: &Scalar) -> &Operation {
        match x {
            Scalar::Rational(_) => self.by_sign(x),
            _ => self.by_positive(x),
        }
    }

    fn apply(&self, x: &Scalar, n: Option<&Scalar>) -> Result<Scalar, EngineError> {
        if let Scalar::Complex(c) = x {
            let part = |v: f64| -> Result<f64, EngineError> {
                let out = self.apply(&Scalar::Number(v), n)?;
                out.as_number().ok_or_else(|| {
                    EngineError::InvalidValue(format!("{} is not a real part", out))
                })
            };
            return Ok(Scalar::complex(part(c.re)?, part(c.im)?));
        }
        let op = self.pick(x);
        match n {
            Some(n) => op.call_scalar2(x, n),
            None => op.call_scalar(x),
        }
    }
}

pub fn declare() -> OperationDecl {
    OperationDecl::new(NAME, &[floor::NAME, ceil::NAME], |deps, config| {
        use OperandKindTag::*;

        let toward_zero = Arc::new(TowardZero {
            floor: deps.get(floor::NAME)?,
            ceil: deps.get(ceil::NAME)?,
        });

        let mut assembler =
            Assembler::new(NAME, config).depends_on(&[floor::NAME, ceil::NAME]);
        for kind in [Number, Complex, Decimal, Rational] {
            let unary = Arc::clone(&toward_zero);
            let binary = Arc::clone(&toward_zero);
            assembler = assembler
                .unary(kind, move |x| unary.apply(x, None))
                .binary(kind, Number | Decimal, move |x, n| binary.apply(x, Some(n)));
        }
        Ok(assembler.zero_preserving_collections().build())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::core::value::Value;
    use crate::engine::Registry;

    fn registry() -> Registry {
        Registry::builder(EngineConfig::default())
            .declare(declare())
            .declare(floor::declare())
            .declare(ceil::declare())
            .build()
            .unwrap()
    }

    #[test]
    fn test_number_toward_zero() {
        let r = registry();
        assert_eq!(r.call(NAME, &[Value::from(3.7)]).unwrap(), Value::from(3.0));
        assert_eq!(r.call(NAME, &[Value::from(-3.7)]).unwrap(), Value::from(-3.0));
        assert_eq!(r.call(NAME, &[Value::from(0.0)]).unwrap(), Value::from(0.0));
        assert_eq!(
            r.call(NAME, &[Value::from(-3.18), Value::from(1.0)]).unwrap(),
            Value::from(-3.1)
        );
    }

    #[test]
    fn test_complex_componentwise() {
        let r = registry();
        let out = r.call(NAME, &[Scalar::complex(3.7, -2.2).into()]).unwrap();
        assert_eq!(out, Value::from(Scalar::complex(3.0, -2.0)));
        let out = r
            .call(NAME, &[Scalar::complex(-1.25, 1.25).into(), Value::from(1.0)])
            .unwrap();
        assert_eq!(out, Value::from(Scalar::complex(-1.2, 1.2)));
    }

    #[test]
    fn test_exact_kinds() {
        let r = registry();
        let out = r
            .call(NAME, &[Scalar::decimal("-7.75").unwrap().into(), Value::from(1.0)])
            .unwrap();
        assert_eq!(out, Value::from(Scalar::decimal("-7.7").unwrap()));
        let out = r.call(NAME, &[Scalar::rational(-7, 2).unwrap().into()]).unwrap();
        assert_eq!(out, Value::from(Scalar::rational(-3, 1).unwrap()));
        let out = r.call(NAME, &[Scalar::rational(7, 2).unwrap().into()]).unwrap();
        assert_eq!(out, Value::from(Scalar::rational(3, 1).unwrap()));
    }

    #[test]
    fn test_dependencies_are_declared() {
        let r = registry();
        assert_eq!(r.names().last().map(String::as_str), Some(NAME));
        assert_eq!(r.get(NAME).unwrap().dependencies(), &["floor", "ceil"]);
    }
}
