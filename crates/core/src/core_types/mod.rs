//! Core types: physical units, dimensions and unit-bearing scalars

pub mod dimension;
mod parse;
pub mod quantity;
pub mod registry;
pub mod units;

pub use dimension::Dimension;
pub use quantity::Quantity;
pub use units::Unit;
