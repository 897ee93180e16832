// src/core/scalar.rs

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::fmt;
use std::str::FromStr;

use super::kind::OperandKindTag;
use crate::engine::EngineError;

/// Escalar numérico: uno de los cuatro tipos soportados.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Complex(Complex64),
    Decimal(BigDecimal),
    Rational(BigRational),
}

impl Scalar {
    pub fn complex(re: f64, im: f64) -> Self {
        Scalar::Complex(Complex64::new(re, im))
    }

    /// Parses a base-10 decimal literal such as `"3.18"` or `"-1e-4"`.
    pub fn decimal(literal: &str) -> Result<Self, EngineError> {
        BigDecimal::from_str(literal.trim())
            .map(Scalar::Decimal)
            .map_err(|e| EngineError::InvalidValue(format!("'{}' is not a decimal: {}", literal, e)))
    }

    pub fn rational(numer: i64, denom: i64) -> Result<Self, EngineError> {
        if denom == 0 {
            return Err(EngineError::InvalidValue(format!(
                "rational {}/{} has a zero denominator",
                numer, denom
            )));
        }
        Ok(Scalar::Rational(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        )))
    }

    pub fn kind(&self) -> OperandKindTag {
        match self {
            Scalar::Number(_) => OperandKindTag::Number,
            Scalar::Complex(_) => OperandKindTag::Complex,
            Scalar::Decimal(_) => OperandKindTag::Decimal,
            Scalar::Rational(_) => OperandKindTag::Rational,
        }
    }

    /// Exact comparison against the kind's zero (no tolerance).
    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Number(x) => *x == 0.0,
            Scalar::Complex(c) => c.re == 0.0 && c.im == 0.0,
            Scalar::Decimal(d) => d.is_zero(),
            Scalar::Rational(r) => r.is_zero(),
        }
    }

    /// Strictly negative. Complex values have no sign and report false.
    pub fn is_negative(&self) -> bool {
        match self {
            Scalar::Number(x) => *x < 0.0,
            Scalar::Complex(_) => false,
            Scalar::Decimal(d) => d.is_negative(),
            Scalar::Rational(r) => r.is_negative(),
        }
    }

    /// Strictly positive. Complex values have no sign and report false.
    pub fn is_positive(&self) -> bool {
        match self {
            Scalar::Number(x) => *x > 0.0,
            Scalar::Complex(_) => false,
            Scalar::Decimal(d) => d.is_positive(),
            Scalar::Rational(r) => r.is_positive(),
        }
    }

    /// Zero of the same kind
    pub fn zero_like(&self) -> Scalar {
        match self {
            Scalar::Number(_) => Scalar::Number(0.0),
            Scalar::Complex(_) => Scalar::Complex(Complex64::zero()),
            Scalar::Decimal(_) => Scalar::Decimal(BigDecimal::zero()),
            Scalar::Rational(_) => Scalar::Rational(BigRational::zero()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(x) => Some(*x),
            _ => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Number(0.0)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Number(x)
    }
}

impl From<Complex64> for Scalar {
    fn from(c: Complex64) -> Self {
        Scalar::Complex(c)
    }
}

impl From<BigDecimal> for Scalar {
    fn from(d: BigDecimal) -> Self {
        Scalar::Decimal(d)
    }
}

impl From<BigRational> for Scalar {
    fn from(r: BigRational) -> Self {
        Scalar::Rational(r)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(x) => write!(f, "{}", x),
            Scalar::Complex(c) => {
                if c.im < 0.0 {
                    write!(f, "{} - {}i", c.re, -c.im)
                } else {
                    write!(f, "{} + {}i", c.re, c.im)
                }
            }
            Scalar::Decimal(d) => write!(f, "{}", d.normalized()),
            Scalar::Rational(r) => write!(f, "{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_zero_per_kind() {
        assert!(Scalar::Number(0.0).is_zero());
        assert!(Scalar::Number(-0.0).is_zero());
        assert!(!Scalar::Number(1e-300).is_zero());
        assert!(Scalar::complex(0.0, 0.0).is_zero());
        assert!(!Scalar::complex(0.0, 1e-12).is_zero());
        assert!(Scalar::decimal("0.000").unwrap().is_zero());
        assert!(!Scalar::decimal("0.0001").unwrap().is_zero());
        assert!(Scalar::rational(0, 5).unwrap().is_zero());
    }

    #[test]
    fn test_sign_and_zero_like() {
        let d = Scalar::decimal("-2.5").unwrap();
        assert!(d.is_negative());
        assert!(!d.is_positive());
        assert_eq!(d.zero_like().kind(), OperandKindTag::Decimal);
        assert!(Scalar::rational(3, 4).unwrap().is_positive());
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::Number(3.0).to_string(), "3");
        assert_eq!(Scalar::complex(3.0, -2.0).to_string(), "3 - 2i");
        assert_eq!(Scalar::rational(7, 2).unwrap().to_string(), "7/2");
    }

    #[test]
    fn test_rational_zero_denominator_rejected() {
        assert!(matches!(
            Scalar::rational(1, 0),
            Err(EngineError::InvalidValue(_))
        ));
    }
}
