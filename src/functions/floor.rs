// src/functions/floor.rs

use super::rounding::{declare_directed, Direction};
use crate::engine::OperationDecl;

pub const NAME: &str = "floor";

/// Round toward negative infinity, optionally to `n` decimals.
pub fn declare() -> OperationDecl {
    declare_directed(NAME, Direction::Down)
}
