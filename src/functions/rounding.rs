// src/functions/rounding.rs

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Integer;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::str::FromStr;

use crate::core::config::EngineConfig;
use crate::core::kind::OperandKindTag;
use crate::core::scalar::Scalar;
use crate::engine::{Assembler, EngineError, OperationDecl};

/// Which way a value is pushed when it is not already representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward negative infinity
    Down,
    /// Toward positive infinity
    Up,
}

/// Upper bounds on the decimal count, per operand family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalLimits {
    pub number: u32,
    pub exact: u32,
}

impl DecimalLimits {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            number: config.rounding.max_number_decimals,
            exact: config.rounding.max_exact_decimals,
        }
    }

    /// Number and Complex share the binary limit; Decimal and Rational the exact one.
    pub fn for_kind(&self, kind: OperandKindTag) -> u32 {
        match kind {
            OperandKindTag::Decimal | OperandKindTag::Rational => self.exact,
            _ => self.number,
        }
    }
}

/// Reads a decimal count operand. Accepts a non-negative integral Number or
/// Decimal no larger than `limit`.
pub fn decimal_count(n: &Scalar, limit: u32) -> Result<u32, EngineError> {
    let count = match n {
        Scalar::Number(v) => {
            if !v.is_finite() || v.fract() != 0.0 || *v < 0.0 {
                return Err(EngineError::InvalidDecimalCount(format!(
                    "{} is not a non-negative integer",
                    v
                )));
            }
            if *v > f64::from(limit) {
                None
            } else {
                Some(*v as u32)
            }
        }
        Scalar::Decimal(d) => {
            let d = d.normalized();
            let (_, scale) = d.as_bigint_and_exponent();
            if d.is_negative() || scale > 0 {
                return Err(EngineError::InvalidDecimalCount(format!(
                    "{} is not a non-negative integer",
                    d
                )));
            }
            // a u32 has at most 10 digits
            if d.digits() as i64 - scale > 10 {
                None
            } else {
                d.to_u64().and_then(|v| u32::try_from(v).ok())
            }
        }
        other => {
            return Err(EngineError::InvalidDecimalCount(format!(
                "expected Number or Decimal, got {}",
                other.kind()
            )))
        }
    };

    match count {
        Some(c) if c <= limit => Ok(c),
        _ => Err(EngineError::InvalidDecimalCount(format!(
            "{} exceeds the limit of {} decimals",
            n, limit
        ))),
    }
}

pub fn round_number(x: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Down => x.floor(),
        Direction::Up => x.ceil(),
    }
}

/// Rounds in base 10 from the shortest representation of `x`, so that
/// `4.1` floored to one decimal stays `4.1`.
pub fn round_number_to(x: f64, decimals: u32, direction: Direction) -> f64 {
    if decimals == 0 || !x.is_finite() {
        return round_number(x, direction);
    }
    let Ok(exact) = BigDecimal::from_str(&format!("{:e}", x)) else {
        return x;
    };
    let rounded = round_decimal(&exact, i64::from(decimals), direction);
    match rounded.to_string().parse::<f64>() {
        // keep the sign of a negative value that rounds up to zero
        Ok(r) if r == 0.0 && x.is_sign_negative() => -0.0,
        Ok(r) => r,
        Err(_) => x,
    }
}

pub fn round_decimal(d: &BigDecimal, decimals: i64, direction: Direction) -> BigDecimal {
    let (_, scale) = d.as_bigint_and_exponent();
    if scale <= decimals {
        return d.clone();
    }
    // |d| < 10^(digits - scale), so below 10^-decimals it truncates to zero
    let (truncated, exact) = if d.digits() as i64 - scale <= -decimals {
        (BigDecimal::new(BigInt::zero(), decimals), d.is_zero())
    } else {
        let truncated = d.with_scale(decimals);
        let exact = truncated == *d;
        (truncated, exact)
    };
    if exact {
        return truncated;
    }
    let ulp = BigDecimal::new(BigInt::one(), decimals);
    match direction {
        Direction::Down if d.is_negative() => truncated - ulp,
        Direction::Up if d.is_positive() => truncated + ulp,
        _ => truncated,
    }
}

pub fn round_rational(r: &BigRational, decimals: u32, direction: Direction) -> BigRational {
    let whole = |q: &BigRational| {
        let (numer, denom) = (q.numer(), q.denom());
        BigRational::from_integer(match direction {
            Direction::Down => numer.div_floor(denom),
            Direction::Up => -(-numer).div_floor(denom),
        })
    };
    if decimals == 0 {
        return whole(r);
    }
    let scale = BigRational::from_integer(num_traits::pow(BigInt::from(10), decimals as usize));
    whole(&(r * &scale)) / scale
}

/// Whole-number rounding for every scalar kind. Complex values round each
/// component independently.
pub fn round_scalar(x: &Scalar, direction: Direction) -> Scalar {
    match x {
        Scalar::Number(v) => Scalar::Number(round_number(*v, direction)),
        Scalar::Complex(c) => Scalar::Complex(Complex64::new(
            round_number(c.re, direction),
            round_number(c.im, direction),
        )),
        Scalar::Decimal(d) => Scalar::Decimal(round_decimal(d, 0, direction)),
        Scalar::Rational(r) => Scalar::Rational(round_rational(r, 0, direction)),
    }
}

pub fn round_scalar_to(x: &Scalar, decimals: u32, direction: Direction) -> Scalar {
    match x {
        Scalar::Number(v) => Scalar::Number(round_number_to(*v, decimals, direction)),
        Scalar::Complex(c) => Scalar::Complex(Complex64::new(
            round_number_to(c.re, decimals, direction),
            round_number_to(c.im, decimals, direction),
        )),
        Scalar::Decimal(d) => Scalar::Decimal(round_decimal(d, i64::from(decimals), direction)),
        Scalar::Rational(r) => Scalar::Rational(round_rational(r, decimals, direction)),
    }
}

/// Declaration shared by `floor` and `ceil`: one leaf pair per scalar kind,
/// then the zero-preserving collection forms.
pub(crate) fn declare_directed(name: &'static str, direction: Direction) -> OperationDecl {
    OperationDecl::new(name, &[], move |_deps, config| {
        use OperandKindTag::*;

        let limits = DecimalLimits::from_config(config);
        let mut assembler = Assembler::new(name, config);
        for kind in [Number, Complex, Decimal, Rational] {
            let limit = limits.for_kind(kind);
            assembler = assembler
                .unary(kind, move |x| Ok(round_scalar(x, direction)))
                .binary(kind, Number | Decimal, move |x, n| {
                    Ok(round_scalar_to(x, decimal_count(n, limit)?, direction))
                });
        }
        Ok(assembler.zero_preserving_collections().build())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_number_decimals_use_shortest_repr() {
        assert_eq!(round_number_to(4.1, 1, Direction::Down), 4.1);
        assert_eq!(round_number_to(3.18, 1, Direction::Down), 3.1);
        assert_eq!(round_number_to(3.12, 1, Direction::Up), 3.2);
        assert_eq!(round_number_to(-3.18, 1, Direction::Up), -3.1);
        assert_eq!(round_number_to(-3.12, 1, Direction::Down), -3.2);
        assert_eq!(round_number_to(1e-7, 3, Direction::Down), 0.0);
        assert_eq!(round_number_to(f64::INFINITY, 2, Direction::Down), f64::INFINITY);
    }

    #[test]
    fn test_decimal_rounding() {
        assert_eq!(round_decimal(&dec("3.18"), 1, Direction::Down), dec("3.1"));
        assert_eq!(round_decimal(&dec("-3.18"), 1, Direction::Down), dec("-3.2"));
        assert_eq!(round_decimal(&dec("-0.5"), 0, Direction::Up), dec("0"));
        assert_eq!(round_decimal(&dec("-0.5"), 0, Direction::Down), dec("-1"));
        assert_eq!(round_decimal(&dec("2"), 3, Direction::Up), dec("2"));
        assert_eq!(round_decimal(&dec("0.005"), 2, Direction::Up), dec("0.01"));
        assert_eq!(round_decimal(&dec("-0.005"), 2, Direction::Up), dec("0"));
    }

    #[test]
    fn test_decimal_rounding_with_extreme_exponents() {
        let huge = dec("1e10000000");
        assert_eq!(round_decimal(&huge, 0, Direction::Down), huge);
        assert_eq!(round_decimal(&huge, 2, Direction::Up), huge);

        let tiny = dec("1e-10000000");
        assert_eq!(round_decimal(&tiny, 0, Direction::Down), dec("0"));
        assert_eq!(round_decimal(&tiny, 2, Direction::Up), dec("0.01"));
        assert_eq!(round_decimal(&(-tiny), 3, Direction::Down), dec("-0.001"));
    }

    #[test]
    fn test_rational_rounding() {
        assert_eq!(round_rational(&ratio(7, 2), 0, Direction::Down), ratio(3, 1));
        assert_eq!(round_rational(&ratio(-7, 2), 0, Direction::Up), ratio(-3, 1));
        assert_eq!(round_rational(&ratio(1, 3), 2, Direction::Down), ratio(33, 100));
        assert_eq!(round_rational(&ratio(1, 3), 2, Direction::Up), ratio(34, 100));
    }

    #[test]
    fn test_complex_rounds_componentwise() {
        assert_eq!(
            round_scalar(&Scalar::complex(2.5, -1.5), Direction::Down),
            Scalar::complex(2.0, -2.0)
        );
    }

    #[test]
    fn test_decimal_count_validation() {
        assert_eq!(decimal_count(&Scalar::Number(2.0), 15), Ok(2));
        assert_eq!(decimal_count(&Scalar::decimal("4").unwrap(), 15), Ok(4));
        assert_eq!(decimal_count(&Scalar::decimal("1.2e1").unwrap(), 15), Ok(12));
        assert_eq!(decimal_count(&Scalar::decimal("0.000").unwrap(), 15), Ok(0));
        for bad in [
            Scalar::Number(-1.0),
            Scalar::Number(1.5),
            Scalar::Number(f64::NAN),
            Scalar::Number(16.0),
            Scalar::decimal("2.5").unwrap(),
            Scalar::complex(1.0, 0.0),
            Scalar::rational(1, 1).unwrap(),
            Scalar::decimal("1e1000000").unwrap(),
            Scalar::decimal("12345678901").unwrap(),
            Scalar::decimal("1e-1000000").unwrap(),
        ] {
            assert!(
                matches!(decimal_count(&bad, 15), Err(EngineError::InvalidDecimalCount(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
