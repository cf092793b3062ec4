//! Unit-aware operator layer
//!
//! - [`operand`]: what can take part in arithmetic and how its unit is found
//! - [`engine`]: unit checking, conversion and composition for `+ - * /`,
//!   explicit conversion and SI normalization
//! - [`unitful`]: the [`UnitfulArray`] wrapper carrying the operators

pub mod engine;
pub mod operand;
pub mod unitful;

pub use engine::{convert_to_unit, normalize_to_si, Activation};
pub use operand::{AsOperand, Converted, Operand};
pub use unitful::UnitfulArray;
