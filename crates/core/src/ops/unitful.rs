//! Unit-aware wrapper around [`LabeledArray`]
//!
//! [`UnitfulArray`] is how callers opt in to unit handling: wrap an array,
//! and its `+ - * /` go through the unit layer under the process-wide
//! activation state (see [`crate::lifecycle`]). The `units` attribute stays
//! the single source of truth for the array's unit, so unwrapping hands back
//! a host array that still carries it.
//!
//! Operators return [`UnitResult`], so chains read `(&(&a * &b)? / &c)?`.

use super::engine;
use super::operand::{array_unit, AsOperand, Operand};
use crate::array::{ArithOp, LabeledArray, UNITS_KEY};
use crate::core_types::Unit;
use crate::error::UnitResult;
use crate::lifecycle;
use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone, PartialEq)]
pub struct UnitfulArray {
    inner: LabeledArray,
}

impl UnitfulArray {
    pub fn new(array: LabeledArray) -> Self {
        UnitfulArray { inner: array }
    }

    /// Wrap `array`, setting its `units` attribute
    pub fn with_units(mut array: LabeledArray, units: &str) -> Self {
        array.set_attr(UNITS_KEY, units);
        UnitfulArray { inner: array }
    }

    /// One-dimensional array along `dim` in `units`
    pub fn from_vec(dim: &str, values: Vec<f64>, units: &str) -> Self {
        Self::with_units(LabeledArray::from_vec(dim, values), units)
    }

    pub fn array(&self) -> &LabeledArray {
        &self.inner
    }

    pub fn into_inner(self) -> LabeledArray {
        self.inner
    }

    pub fn dims(&self) -> &[String] {
        self.inner.dims()
    }

    pub fn values(&self) -> Vec<f64> {
        self.inner.values()
    }

    /// The raw `units` attribute, if it is set to a string
    pub fn units(&self) -> Option<&str> {
        self.inner.attr_str(UNITS_KEY)
    }

    /// Parsed unit; dimensionless when no `units` attribute is set.
    pub fn unit(&self) -> UnitResult<Unit> {
        array_unit(&self.inner)
    }

    pub fn convert_to_unit(&self, units: &str) -> UnitResult<Self> {
        engine::convert_to_unit(&self.inner, units).map(Self::new)
    }

    pub fn normalize_to_si(&self) -> UnitResult<Self> {
        engine::normalize_to_si(&self.inner).map(Self::new)
    }

    /// Mean along `dim`, keeping attributes when the active configuration does.
    pub fn mean(&self, dim: &str) -> UnitResult<Self> {
        let keep_attrs = lifecycle::current().keep_attrs();
        Ok(Self::new(self.inner.mean(dim, keep_attrs)?))
    }

    pub(crate) fn apply(&self, op: ArithOp, rhs: Operand<'_>) -> UnitResult<Self> {
        let activation = lifecycle::current();
        engine::apply(op, &self.inner, rhs, &activation).map(Self::new)
    }
}

impl From<LabeledArray> for UnitfulArray {
    fn from(array: LabeledArray) -> Self {
        Self::new(array)
    }
}

impl AsOperand for UnitfulArray {
    fn as_operand(&self) -> Operand<'_> {
        Operand::Array(&self.inner)
    }
}

macro_rules! unitful_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: AsOperand> $trait<R> for &UnitfulArray {
            type Output = UnitResult<UnitfulArray>;
            fn $method(self, rhs: R) -> Self::Output {
                self.apply($op, rhs.as_operand())
            }
        }

        impl<R: AsOperand> $trait<R> for UnitfulArray {
            type Output = UnitResult<UnitfulArray>;
            fn $method(self, rhs: R) -> Self::Output {
                self.apply($op, rhs.as_operand())
            }
        }
    };
}

unitful_operator!(Add, add, ArithOp::Add);
unitful_operator!(Sub, sub, ArithOp::Sub);
unitful_operator!(Mul, mul, ArithOp::Mul);
unitful_operator!(Div, div, ArithOp::Div);
