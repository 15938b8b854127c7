//! Domain layer: pure types and rules, no I/O.

pub mod collections;
pub mod foundation;
pub mod payments;
