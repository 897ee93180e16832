// src/functions/mod.rs

//! Built-in operations. `floor` and `ceil` carry the per-kind leaf
//! policies; `fix` is composed from both.

pub mod ceil;
pub mod fix;
pub mod floor;
pub mod rounding;

use crate::engine::OperationDecl;

pub use rounding::{decimal_count, DecimalLimits, Direction};

/// Declarations of every built-in operation, in no particular order.
pub fn declarations() -> Vec<OperationDecl> {
    vec![floor::declare(), ceil::declare(), fix::declare()]
}
