//! Unit propagation for arithmetic on labeled arrays
//!
//! - `+`/`-`: the right operand is converted into the left operand's unit,
//!   the host operator runs on plain numbers, and the result is labelled with
//!   the left unit. Incommensurable units are a [`UnitError::UnitMismatch`].
//! - `*`/`/`: the host operator runs first, the units are composed
//!   symbolically and the result is labelled with the SI reduction of the
//!   composed unit. With `keep_si` the values are also rescaled so the label
//!   carries no numeric scale. These never fail because of units.
//!
//! Every function takes the [`Activation`] to run under. While inactive the
//! operators fall through to the host arithmetic without unit checks.

use super::operand::{array_unit, Operand};
use crate::array::{ArithOp, HostOperators, LabeledArray, UNITS_KEY};
use crate::config::UnitConfig;
use crate::core_types::Unit;
use crate::error::{Operation, UnitError, UnitResult};
use tracing::trace;

/// Snapshot of the unit layer state an operation runs under.
///
/// Active exactly when it holds the saved host operators.
#[derive(Debug, Clone, Copy)]
pub struct Activation {
    keep_si: bool,
    keep_attrs: bool,
    originals: Option<HostOperators>,
}

impl Activation {
    pub(crate) const INACTIVE: Activation = Activation {
        keep_si: false,
        keep_attrs: false,
        originals: None,
    };

    /// Unit-aware operators over the host's current arithmetic
    pub fn active(config: UnitConfig) -> Self {
        Activation {
            keep_si: config.keep_si,
            keep_attrs: config.keep_attrs,
            originals: Some(HostOperators::defaults()),
        }
    }

    /// Plain host arithmetic
    pub fn inactive(keep_attrs: bool) -> Self {
        Activation {
            keep_attrs,
            ..Self::INACTIVE
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.originals.is_some()
    }

    #[inline]
    pub fn keep_si(&self) -> bool {
        self.keep_si && self.is_active()
    }

    #[inline]
    pub fn keep_attrs(&self) -> bool {
        self.keep_attrs
    }

    /// Saved host operators, present while active
    pub fn originals(&self) -> Option<&HostOperators> {
        self.originals.as_ref()
    }

    pub(crate) fn set_keep_si(&mut self, keep_si: bool) {
        self.keep_si = keep_si;
    }

    pub(crate) fn deactivated(self) -> Self {
        Activation::inactive(self.keep_attrs)
    }
}

/// Dispatch `lhs <op> rhs` to the matching operator.
pub fn apply(
    op: ArithOp,
    lhs: &LabeledArray,
    rhs: Operand<'_>,
    activation: &Activation,
) -> UnitResult<LabeledArray> {
    match op {
        ArithOp::Add => add(lhs, rhs, activation),
        ArithOp::Sub => sub(lhs, rhs, activation),
        ArithOp::Mul => mul(lhs, rhs, activation),
        ArithOp::Div => div(lhs, rhs, activation),
    }
}

pub fn add(lhs: &LabeledArray, rhs: Operand<'_>, activation: &Activation) -> UnitResult<LabeledArray> {
    additive(lhs, rhs, ArithOp::Add, Operation::Addition, activation)
}

pub fn sub(lhs: &LabeledArray, rhs: Operand<'_>, activation: &Activation) -> UnitResult<LabeledArray> {
    additive(lhs, rhs, ArithOp::Sub, Operation::Subtraction, activation)
}

pub fn mul(lhs: &LabeledArray, rhs: Operand<'_>, activation: &Activation) -> UnitResult<LabeledArray> {
    multiplicative(lhs, rhs, ArithOp::Mul, activation)
}

pub fn div(lhs: &LabeledArray, rhs: Operand<'_>, activation: &Activation) -> UnitResult<LabeledArray> {
    multiplicative(lhs, rhs, ArithOp::Div, activation)
}

fn additive(
    lhs: &LabeledArray,
    rhs: Operand<'_>,
    op: ArithOp,
    operation: Operation,
    activation: &Activation,
) -> UnitResult<LabeledArray> {
    let Some(originals) = activation.originals() else {
        return host_only(lhs, rhs, op, activation);
    };
    let unit = array_unit(lhs)?;
    let converted = rhs.convert(&unit).map_err(|err| match err {
        UnitError::IncompatibleUnits { .. } => UnitError::UnitMismatch { operation },
        other => other,
    })?;
    let mut result = originals.apply(op, lhs, converted.values(), activation.keep_attrs())?;
    result.set_attr(UNITS_KEY, unit.to_string());
    Ok(result)
}

fn multiplicative(
    lhs: &LabeledArray,
    rhs: Operand<'_>,
    op: ArithOp,
    activation: &Activation,
) -> UnitResult<LabeledArray> {
    let Some(originals) = activation.originals() else {
        return host_only(lhs, rhs, op, activation);
    };
    let mut result = originals.apply(op, lhs, rhs.values(), activation.keep_attrs())?;

    let (left, right) = (array_unit(lhs)?, rhs.unit()?);
    let composed = if op == ArithOp::Mul {
        left.multiply(&right)?
    } else {
        left.divide(&right)?
    };
    let si = composed.si();
    trace!(%left, %right, op = %op.symbol(), %composed, %si, "composed unit");
    result.set_attr(UNITS_KEY, si.to_string());

    if activation.keep_si() {
        result = convert_to_unit(&result, &si.unscaled().to_string())?;
    }
    Ok(result)
}

/// Host arithmetic without unit handling. Unit-bearing scalars still have to
/// be dimensionless to be added to plain numbers; that check is the unit
/// library's own and surfaces as [`UnitError::IncompatibleUnits`].
fn host_only(
    lhs: &LabeledArray,
    rhs: Operand<'_>,
    op: ArithOp,
    activation: &Activation,
) -> UnitResult<LabeledArray> {
    let host = HostOperators::defaults();
    let converted;
    let payload = match (op, rhs) {
        (ArithOp::Add | ArithOp::Sub, Operand::Array(_)) | (ArithOp::Mul | ArithOp::Div, _) => {
            rhs.values()
        }
        (ArithOp::Add | ArithOp::Sub, scalar) => {
            converted = scalar.convert(&Unit::dimensionless())?;
            converted.values()
        }
    };
    Ok(host.apply(op, lhs, payload, activation.keep_attrs())?)
}

/// Rescale `array` into `units` and label it with that string.
///
/// Fails with [`UnitError::IncompatibleUnits`] when `units` describes another
/// dimension. Converting into the unit the array already has is the identity.
pub fn convert_to_unit(array: &LabeledArray, units: &str) -> UnitResult<LabeledArray> {
    let target = Unit::parse(units)?;
    let factor = array_unit(array)?.to(&target)?;
    let mut result = array.scaled(factor);
    result.set_attr(UNITS_KEY, units);
    Ok(result)
}

/// Rescale `array` into the unscaled SI base units of its current unit.
pub fn normalize_to_si(array: &LabeledArray) -> UnitResult<LabeledArray> {
    let si = array_unit(array)?.si().unscaled();
    convert_to_unit(array, &si.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Quantity;
    use approx::assert_relative_eq;

    fn arr(values: Vec<f64>, units: &str) -> LabeledArray {
        LabeledArray::from_vec("x", values).with_attr(UNITS_KEY, units)
    }

    fn on() -> Activation {
        Activation::active(UnitConfig::default())
    }

    fn unit(s: &str) -> Unit {
        Unit::parse(s).unwrap()
    }

    fn unit_of(a: &LabeledArray) -> Unit {
        array_unit(a).unwrap()
    }

    #[test]
    fn test_add_converts_right_operand() {
        let s = arr(vec![1.0, 2.0, 3.0], "m");
        let radius = Quantity::with_units(6378.0, "km").unwrap();
        let r = add(&s, Operand::Quantity(&radius), &on()).unwrap();
        assert_eq!(r.values(), vec![6_378_001.0, 6_378_002.0, 6_378_003.0]);
        assert_eq!(r.attr_str(UNITS_KEY), Some("m"));
    }

    #[test]
    fn test_sub_converts_right_array() {
        let s = arr(vec![1.0, 2.0, 3.0], "m");
        let d = arr(vec![10.0, 10.0, 10.0], "mm");
        let r = sub(&s, Operand::Array(&d), &on()).unwrap();
        let values = r.values();
        for (v, want) in values.iter().zip([0.99, 1.99, 2.99]) {
            assert_relative_eq!(*v, want, epsilon = 1e-12);
        }
        assert_eq!(r.attr_str(UNITS_KEY), Some("m"));
    }

    #[test]
    fn test_additive_mismatch_names_operation() {
        let s = arr(vec![1.0], "m");
        let t = arr(vec![1.0], "s");
        assert_eq!(
            add(&s, Operand::Array(&t), &on()),
            Err(UnitError::UnitMismatch {
                operation: Operation::Addition
            })
        );
        let ten_s = Quantity::with_units(10.0, "s").unwrap();
        assert_eq!(
            sub(&s, Operand::Quantity(&ten_s), &on()),
            Err(UnitError::UnitMismatch {
                operation: Operation::Subtraction
            })
        );
        assert_eq!(
            add(&s, Operand::Number(1.0), &on()),
            Err(UnitError::UnitMismatch {
                operation: Operation::Addition
            })
        );
    }

    #[test]
    fn test_dimensionless_operands_add() {
        let a = LabeledArray::from_vec("x", vec![1.0, 2.0]);
        let r = add(&a, Operand::Number(1.0), &on()).unwrap();
        assert_eq!(r.values(), vec![2.0, 3.0]);
        assert_eq!(r.attr_str(UNITS_KEY), Some(""));
    }

    #[test]
    fn test_malformed_right_units_are_not_a_mismatch() {
        let s = arr(vec![1.0], "m");
        let bad = arr(vec![1.0], "m ^");
        assert!(matches!(
            add(&s, Operand::Array(&bad), &on()),
            Err(UnitError::MalformedUnit { .. })
        ));
    }

    #[test]
    fn test_mul_and_div_compose_units() {
        let s = arr(vec![1.0, 2.0, 3.0], "m");
        let t = arr(vec![3.0, 2.0, 1.0], "s");
        let product = mul(&s, Operand::Array(&t), &on()).unwrap();
        assert_eq!(product.attr_str(UNITS_KEY), Some("m s"));
        assert_eq!(product.values(), vec![3.0, 4.0, 3.0]);

        let speed = div(&s, Operand::Array(&t), &on()).unwrap();
        assert_eq!(speed.attr_str(UNITS_KEY), Some("m / s"));

        let per_s_per_kg = unit("s / kg");
        let force = div(&speed, Operand::Unit(&per_s_per_kg), &on()).unwrap();
        assert_eq!(unit_of(&force), unit("N"));
        assert_eq!(force.values(), speed.values());
    }

    #[test]
    fn test_mul_labels_with_scaled_si_unit() {
        let t = arr(vec![3.0, 2.0, 1.0], "s");
        let speed = Quantity::with_units(7.2, "km / h").unwrap();
        let d = mul(&t, Operand::Quantity(&speed), &on()).unwrap();
        for (v, want) in d.values().iter().zip([21.6, 14.4, 7.2]) {
            assert_relative_eq!(*v, want, epsilon = 1e-12);
        }
        assert_eq!(unit_of(&d), (unit("km / h") * unit("s")).unwrap());
        assert!((unit_of(&d).scale() - 1.0 / 3.6).abs() < 1e-15);
    }

    #[test]
    fn test_keep_si_rescales_values() {
        let keep_si = Activation::active(UnitConfig {
            keep_si: true,
            ..UnitConfig::default()
        });
        let t = arr(vec![3.0, 2.0, 1.0], "s");
        let speed = Quantity::with_units(7.2, "km / h").unwrap();
        let d = mul(&t, Operand::Quantity(&speed), &keep_si).unwrap();
        for (v, want) in d.values().iter().zip([6.0, 4.0, 2.0]) {
            assert_relative_eq!(*v, want, epsilon = 1e-12);
        }
        assert_eq!(d.attr_str(UNITS_KEY), Some("m"));
    }

    #[test]
    fn test_multiplicative_shape_errors_come_from_host() {
        let a = arr(vec![1.0, 2.0], "m");
        let b = arr(vec![1.0, 2.0, 3.0], "m");
        assert!(matches!(
            mul(&a, Operand::Array(&b), &on()),
            Err(UnitError::Array(_))
        ));
    }

    #[test]
    fn test_inactive_is_plain_arithmetic() {
        let off = Activation::inactive(true);
        let s = arr(vec![1.0, 2.0], "m");
        let t = arr(vec![1.0, 1.0], "s");
        let r = add(&s, Operand::Array(&t), &off).unwrap();
        assert_eq!(r.values(), vec![2.0, 3.0]);
        assert_eq!(r.attr_str(UNITS_KEY), Some("m"));

        let km = Quantity::with_units(1.0, "km").unwrap();
        assert!(matches!(
            add(&s, Operand::Quantity(&km), &off),
            Err(UnitError::IncompatibleUnits { .. })
        ));
        let r = div(&s, Operand::Array(&t), &off).unwrap();
        assert_eq!(r.attr_str(UNITS_KEY), Some("m"));
    }

    #[test]
    fn test_convert_to_unit() {
        let s = arr(vec![1.0, 2.0, 3.0], "m");
        let mm = convert_to_unit(&s, "mm").unwrap();
        assert_eq!(mm.values(), vec![1000.0, 2000.0, 3000.0]);
        assert_eq!(mm.attr_str(UNITS_KEY), Some("mm"));
        assert!(matches!(
            convert_to_unit(&s, "s"),
            Err(UnitError::IncompatibleUnits { .. })
        ));
        assert_eq!(convert_to_unit(&s, "m").unwrap(), s);
    }

    #[test]
    fn test_normalize_to_si() {
        let v = arr(vec![3.6, 7.2, 10.8], "km / h");
        let si = normalize_to_si(&v).unwrap();
        for (v, want) in si.values().iter().zip([1.0, 2.0, 3.0]) {
            assert_relative_eq!(*v, want, epsilon = 1e-12);
        }
        assert_eq!(si.attr_str(UNITS_KEY), Some("m / s"));

        let again = normalize_to_si(&si).unwrap();
        assert_eq!(again, si);
    }

    #[test]
    fn test_zero_scale_target_is_rejected() {
        let s = arr(vec![1.0], "m");
        for target in ["0 m", "-1 m", "1e999 m"] {
            assert!(
                matches!(convert_to_unit(&s, target), Err(UnitError::MalformedUnit { .. })),
                "target {target}"
            );
        }
    }

    #[test]
    fn test_overflowing_units_attribute_is_an_error() {
        let wrapped = arr(vec![1.0], "m^256");
        assert!(matches!(
            convert_to_unit(&wrapped, ""),
            Err(UnitError::MalformedUnit { .. })
        ));
        let huge = arr(vec![1.0], "m^100 km^100");
        assert!(matches!(
            mul(&huge, Operand::Number(2.0), &on()),
            Err(UnitError::MalformedUnit { .. })
        ));

        let m100 = arr(vec![1.0], "m^100");
        assert!(matches!(
            mul(&m100, Operand::Array(&m100), &on()),
            Err(UnitError::OutOfRange { .. })
        ));
    }
}
