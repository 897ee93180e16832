// src/core/kind.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Runtime kind of an operand, the unit of dispatch matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperandKindTag {
    Number,
    Complex,
    Decimal,
    Rational,
    Sequence,
    DenseMatrix,
    SparseMatrix,
}

impl OperandKindTag {
    pub const ALL: [OperandKindTag; 7] = [
        OperandKindTag::Number,
        OperandKindTag::Complex,
        OperandKindTag::Decimal,
        OperandKindTag::Rational,
        OperandKindTag::Sequence,
        OperandKindTag::DenseMatrix,
        OperandKindTag::SparseMatrix,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// True for the four scalar kinds
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            OperandKindTag::Number
                | OperandKindTag::Complex
                | OperandKindTag::Decimal
                | OperandKindTag::Rational
        )
    }
}

impl fmt::Display for OperandKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKindTag::Number => "Number",
            OperandKindTag::Complex => "Complex",
            OperandKindTag::Decimal => "Decimal",
            OperandKindTag::Rational => "Rational",
            OperandKindTag::Sequence => "Sequence",
            OperandKindTag::DenseMatrix => "DenseMatrix",
            OperandKindTag::SparseMatrix => "SparseMatrix",
        };
        f.write_str(name)
    }
}

/// A set of alternative kinds accepted at one argument position.
///
/// Built from a single tag or by or-ing tags together:
/// `OperandKindTag::Number | OperandKindTag::Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindPattern {
    bits: u8,
}

impl KindPattern {
    pub fn any_of(tags: &[OperandKindTag]) -> Self {
        let bits = tags.iter().fold(0u8, |acc, t| acc | t.bit());
        Self { bits }
    }

    /// Any of the scalar kinds
    pub fn scalar() -> Self {
        OperandKindTag::Number
            | OperandKindTag::Complex
            | OperandKindTag::Decimal
            | OperandKindTag::Rational
    }

    /// Sequence or either matrix storage
    pub fn collection() -> Self {
        OperandKindTag::Sequence | OperandKindTag::DenseMatrix | OperandKindTag::SparseMatrix
    }

    pub fn contains(&self, tag: OperandKindTag) -> bool {
        self.bits & tag.bit() != 0
    }

    /// Number of alternatives; lower is more specific.
    pub fn specificity(&self) -> u32 {
        self.bits.count_ones()
    }

    pub fn tags(&self) -> impl Iterator<Item = OperandKindTag> + '_ {
        OperandKindTag::ALL
            .into_iter()
            .filter(move |t| self.contains(*t))
    }
}

impl From<OperandKindTag> for KindPattern {
    fn from(tag: OperandKindTag) -> Self {
        Self { bits: tag.bit() }
    }
}

impl BitOr for OperandKindTag {
    type Output = KindPattern;

    fn bitor(self, rhs: OperandKindTag) -> KindPattern {
        KindPattern {
            bits: self.bit() | rhs.bit(),
        }
    }
}

impl BitOr<OperandKindTag> for KindPattern {
    type Output = KindPattern;

    fn bitor(self, rhs: OperandKindTag) -> KindPattern {
        KindPattern {
            bits: self.bits | rhs.bit(),
        }
    }
}

impl BitOr for KindPattern {
    type Output = KindPattern;

    fn bitor(self, rhs: KindPattern) -> KindPattern {
        KindPattern {
            bits: self.bits | rhs.bits,
        }
    }
}

impl fmt::Display for KindPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.tags().map(|t| t.to_string()).collect();
        f.write_str(&names.join(" | "))
    }
}

/// Ordered list of kind patterns, one per argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    patterns: Vec<KindPattern>,
}

impl Signature {
    pub fn new<P: Into<KindPattern>>(patterns: impl IntoIterator<Item = P>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> &[KindPattern] {
        &self.patterns
    }

    /// Exact arity, and every position accepts the concrete tag.
    pub fn matches(&self, kinds: &[OperandKindTag]) -> bool {
        self.patterns.len() == kinds.len()
            && self
                .patterns
                .iter()
                .zip(kinds)
                .all(|(pattern, kind)| pattern.contains(*kind))
    }

    /// Sum of alternatives across positions
    pub fn specificity(&self) -> u32 {
        self.patterns.iter().map(KindPattern::specificity).sum()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.patterns.iter().map(|p| p.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}
