//! Unit-bearing scalars
//!
//! A [`Quantity`] pairs one `f64` with an explicit [`Unit`], e.g. `6378 km`.
//! Multiplying a number by a unit builds one:
//! ```
//! use simpleunits_core::core_types::{Quantity, Unit};
//!
//! let km = Unit::parse("km").unwrap();
//! let radius: Quantity = 6378.0 * &km;
//! assert_eq!(radius.to(&Unit::parse("m").unwrap()).unwrap().value(), 6_378_000.0);
//! ```

use super::units::Unit;
use crate::error::UnitResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    /// Parse the unit part from a string
    pub fn with_units(value: f64, units: &str) -> UnitResult<Self> {
        Ok(Quantity::new(value, Unit::parse(units)?))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Convert into `target`; fails when the dimensions differ.
    pub fn to(&self, target: &Unit) -> UnitResult<Quantity> {
        let factor = self.unit.to(target)?;
        Ok(Quantity::new(self.value * factor, target.clone()))
    }

    /// Express in unscaled SI base units (`7.2 km / h` becomes `2 m / s`)
    pub fn si(&self) -> Quantity {
        let si = self.unit.si();
        Quantity::new(self.value * si.scale(), si.unscaled())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() && self.unit.scale() == 1.0 {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

impl Mul<Unit> for f64 {
    type Output = Quantity;
    fn mul(self, unit: Unit) -> Quantity {
        Quantity::new(self, unit)
    }
}

impl Mul<&Unit> for f64 {
    type Output = Quantity;
    fn mul(self, unit: &Unit) -> Quantity {
        Quantity::new(self, unit.clone())
    }
}
