//! Operands of unit-aware arithmetic
//!
//! Anything that can sit on either side of `+ - * /` is turned into an
//! [`Operand`]: a closed set of shapes a value can come in, each with its own
//! way of exposing a unit. Inference, value extraction and conversion are
//! single matches over that set.

use crate::array::{LabeledArray, Payload, UNITS_KEY};
use crate::core_types::{Quantity, Unit};
use crate::error::{UnitError, UnitResult};
use std::borrow::Cow;

/// A value taking part in unit-aware arithmetic.
///
/// Variants are listed in the order their unit is most specific: an explicit
/// [`Unit`] beats a raw units string, which beats an attribute map lookup.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// Scalar with an explicit unit
    Quantity(&'a Quantity),
    /// Scalar with a raw, unparsed units string
    Annotated { value: f64, units: &'a str },
    /// Labeled array; its unit lives in the `units` attribute (default `"1"`)
    Array(&'a LabeledArray),
    /// A bare unit, standing for one of itself
    Unit(&'a Unit),
    /// Plain number without a unit
    Number(f64),
}

impl<'a> Operand<'a> {
    /// Effective unit; dimensionless unless the operand says otherwise.
    ///
    /// Only fails when a units string does not parse.
    pub fn unit(&self) -> UnitResult<Unit> {
        match self {
            Operand::Quantity(q) => Ok(q.unit().clone()),
            Operand::Annotated { units, .. } => Unit::parse(units),
            Operand::Array(array) => array_unit(array),
            Operand::Unit(unit) => Ok((*unit).clone()),
            Operand::Number(_) => Ok(Unit::dimensionless()),
        }
    }

    /// Numeric payload handed to the host operators
    pub fn values(&self) -> Payload<'a> {
        match *self {
            Operand::Quantity(q) => Payload::Scalar(q.value()),
            Operand::Annotated { value, .. } | Operand::Number(value) => Payload::Scalar(value),
            Operand::Array(array) => Payload::Array(array),
            Operand::Unit(_) => Payload::Scalar(1.0),
        }
    }

    /// Express this operand in `target`, failing with
    /// [`UnitError::IncompatibleUnits`] when the dimensions differ.
    pub fn convert(&self, target: &Unit) -> UnitResult<Converted<'a>> {
        match *self {
            Operand::Quantity(q) => Ok(Converted::Scalar(q.to(target)?.value())),
            Operand::Array(array) => {
                let factor = array_unit(array)?.to(target)?;
                if factor == 1.0 {
                    Ok(Converted::Array(Cow::Borrowed(array)))
                } else {
                    Ok(Converted::Array(Cow::Owned(array.scaled(factor))))
                }
            }
            Operand::Annotated { value, .. } | Operand::Number(value) => {
                Ok(Converted::Scalar(value * self.unit()?.to(target)?))
            }
            Operand::Unit(unit) => Ok(Converted::Scalar(unit.to(target)?)),
        }
    }
}

/// Unit of a labeled array, read from its `units` attribute.
pub(crate) fn array_unit(array: &LabeledArray) -> UnitResult<Unit> {
    match array.attrs().get(UNITS_KEY) {
        None => Ok(Unit::dimensionless()),
        Some(value) => match value.as_str() {
            Some(units) => Unit::parse(units),
            None => Err(UnitError::MalformedUnit {
                input: value.to_string(),
                reason: "the units attribute is not a string".to_string(),
            }),
        },
    }
}

/// An operand after conversion into another operand's unit
#[derive(Debug, Clone)]
pub enum Converted<'a> {
    Array(Cow<'a, LabeledArray>),
    Scalar(f64),
}

impl Converted<'_> {
    pub fn values(&self) -> Payload<'_> {
        match self {
            Converted::Array(array) => Payload::Array(array),
            Converted::Scalar(v) => Payload::Scalar(*v),
        }
    }
}

/// Conversion of borrowed values into [`Operand`]s.
pub trait AsOperand {
    fn as_operand(&self) -> Operand<'_>;
}

impl AsOperand for Operand<'_> {
    fn as_operand(&self) -> Operand<'_> {
        *self
    }
}

impl AsOperand for Quantity {
    fn as_operand(&self) -> Operand<'_> {
        Operand::Quantity(self)
    }
}

impl AsOperand for LabeledArray {
    fn as_operand(&self) -> Operand<'_> {
        Operand::Array(self)
    }
}

impl AsOperand for Unit {
    fn as_operand(&self) -> Operand<'_> {
        Operand::Unit(self)
    }
}

impl AsOperand for f64 {
    fn as_operand(&self) -> Operand<'_> {
        Operand::Number(*self)
    }
}

impl<T: AsOperand + ?Sized> AsOperand for &T {
    fn as_operand(&self) -> Operand<'_> {
        (**self).as_operand()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(s: &str) -> Unit {
        Unit::parse(s).unwrap()
    }

    #[test]
    fn test_unit_inference_per_variant() {
        let q = Quantity::with_units(2.0, "km").unwrap();
        let a = LabeledArray::from_vec("x", vec![1.0]).with_attr(UNITS_KEY, "s");
        let bare = LabeledArray::from_vec("x", vec![1.0]);
        let u = unit("kg");

        assert_eq!(Operand::Quantity(&q).unit().unwrap(), unit("km"));
        let annotated = Operand::Annotated {
            value: 1.0,
            units: "m / s",
        };
        assert_eq!(annotated.unit().unwrap(), unit("m / s"));
        assert_eq!(Operand::Array(&a).unit().unwrap(), unit("s"));
        assert_eq!(Operand::Array(&bare).unit().unwrap(), Unit::dimensionless());
        assert_eq!(Operand::Unit(&u).unit().unwrap(), u);
        assert_eq!(Operand::Number(3.0).unit().unwrap(), Unit::dimensionless());
    }

    #[test]
    fn test_malformed_units_attribute_propagates() {
        let a = LabeledArray::from_vec("x", vec![1.0]).with_attr(UNITS_KEY, "m //");
        assert!(matches!(
            Operand::Array(&a).unit(),
            Err(UnitError::MalformedUnit { .. })
        ));
        let numeric = LabeledArray::from_vec("x", vec![1.0]).with_attr(UNITS_KEY, 5_i64);
        assert!(matches!(
            Operand::Array(&numeric).unit(),
            Err(UnitError::MalformedUnit { .. })
        ));
    }

    #[test]
    fn test_values_strip_units() {
        let q = Quantity::with_units(2.5, "km").unwrap();
        assert!(matches!(Operand::Quantity(&q).values(), Payload::Scalar(v) if v == 2.5));
        let u = unit("s");
        assert!(matches!(Operand::Unit(&u).values(), Payload::Scalar(v) if v == 1.0));
    }

    #[test]
    fn test_convert_scales_into_target() {
        let q = Quantity::with_units(6378.0, "km").unwrap();
        let Converted::Scalar(v) = Operand::Quantity(&q).convert(&unit("m")).unwrap() else {
            panic!("quantity converts to a scalar");
        };
        assert_eq!(v, 6_378_000.0);

        let a = LabeledArray::from_vec("x", vec![1.0, 2.0]).with_attr(UNITS_KEY, "mm");
        let Converted::Array(c) = Operand::Array(&a).convert(&unit("m")).unwrap() else {
            panic!("array converts to an array");
        };
        assert!((c.values()[1] - 0.002).abs() < 1e-15);
    }

    #[test]
    fn test_same_unit_conversion_borrows() {
        let a = LabeledArray::from_vec("x", vec![1.0]).with_attr(UNITS_KEY, "m");
        let converted = Operand::Array(&a).convert(&unit("m")).unwrap();
        assert!(matches!(converted, Converted::Array(Cow::Borrowed(_))));
    }

    #[test]
    fn test_unitless_number_only_converts_to_dimensionless() {
        assert!(Operand::Number(1.0).convert(&Unit::dimensionless()).is_ok());
        assert!(matches!(
            Operand::Number(1.0).convert(&unit("m")),
            Err(UnitError::IncompatibleUnits { .. })
        ));
    }
}
