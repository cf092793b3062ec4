//! Runtime physical units
//!
//! A [`Unit`] is an ordered list of symbolic terms (`km`, `h^-1`, ...) and a
//! numeric scale. Keeping the symbols lets results print the way they were
//! written (`km / h`), while the registry gives every symbol a dimension and
//! an SI scale so units can be compared, converted and reduced.
//!
//! # Usage
//! ```
//! use simpleunits_core::core_types::Unit;
//!
//! let speed: Unit = "km / h".parse().unwrap();
//! let si = speed.si();
//! assert_eq!(si.unscaled().to_string(), "m / s");
//! assert!((speed.to(&si.unscaled()).unwrap() - 1.0 / 3.6).abs() < 1e-12);
//! ```

use super::dimension::Dimension;
use super::parse;
use super::registry::{self, NamedUnit};
use crate::error::{UnitError, UnitResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

/// Relative tolerance used when comparing unit scales
const SCALE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
struct Term {
    symbol: String,
    power: i32,
    named: NamedUnit,
}

/// A physical unit: symbolic terms with integer powers times a scale.
///
/// Every `Unit` has a positive finite scale and a dimension whose exponents
/// fit in [`Dimension`]; constructors and composition check both.
#[derive(Debug, Clone)]
pub struct Unit {
    scale: f64,
    terms: Vec<Term>,
    dimension: Dimension,
}

impl Unit {
    /// The pure number 1
    pub fn dimensionless() -> Self {
        Unit {
            scale: 1.0,
            terms: Vec::new(),
            dimension: Dimension::NONE,
        }
    }

    /// A dimensionless unit with a numeric scale (e.g. the `1000` in `1000 m`).
    ///
    /// Fails with [`UnitError::OutOfRange`] unless `scale` is positive and finite.
    pub fn scaled(scale: f64) -> UnitResult<Self> {
        Unit::from_parts(scale, Vec::new()).map_err(|reason| out_of_range(scale, reason))
    }

    /// A single registered symbol such as `m`, `km` or `h`.
    pub fn symbol(symbol: &str) -> UnitResult<Self> {
        let named = registry::lookup(symbol).ok_or_else(|| UnitError::UnknownUnit {
            input: symbol.to_string(),
            symbol: symbol.to_string(),
        })?;
        Ok(Unit {
            scale: 1.0,
            dimension: named.dimension,
            terms: vec![Term {
                symbol: symbol.to_string(),
                power: 1,
                named,
            }],
        })
    }

    /// Parse a unit expression such as `"kg m / s2"` or `"km/h"`.
    pub fn parse(input: &str) -> UnitResult<Self> {
        parse::parse_unit(input)
    }

    fn from_parts(scale: f64, terms: Vec<Term>) -> Result<Self, &'static str> {
        if !is_positive_finite(scale) {
            return Err("the scale must be a positive finite number");
        }
        let dimension = terms
            .iter()
            .try_fold(Dimension::NONE, |acc, t| {
                acc.checked_mul(t.named.dimension.checked_powi(t.power)?)
            })
            .ok_or("a dimension exponent is outside -128..=127")?;
        let term_scale = terms_scale(&terms);
        if !is_positive_finite(term_scale) || !is_positive_finite(scale * term_scale) {
            return Err("the SI scale is not a positive finite number");
        }
        Ok(Unit {
            scale,
            terms,
            dimension,
        })
    }

    /// Numeric scale in front of the symbolic terms
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimension.is_dimensionless()
    }

    /// Scale of this unit relative to the SI base composite of its dimension
    pub fn decompose_scale(&self) -> f64 {
        self.scale * terms_scale(&self.terms)
    }

    /// True when both units describe the same physical dimension
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Factor converting a value in `self` into a value in `target`.
    pub fn to(&self, target: &Unit) -> UnitResult<f64> {
        if !self.is_equivalent(target) {
            return Err(UnitError::IncompatibleUnits {
                from: self.to_string(),
                from_dimension: self.dimension.to_string(),
                to: target.to_string(),
                to_dimension: target.dimension.to_string(),
            });
        }
        if self.terms == target.terms && self.scale == target.scale {
            return Ok(1.0);
        }
        let factor = self.decompose_scale() / target.decompose_scale();
        tracing::trace!(from = %self, to = %target, factor, "unit conversion factor");
        Ok(factor)
    }

    /// The SI base-unit composite equivalent to this unit, keeping the scale
    /// (`km / h` becomes `0.2777777777777778 m / s`).
    pub fn si(&self) -> Unit {
        let terms = self
            .dimension
            .base_exponents()
            .iter()
            .filter(|(_, power)| *power != 0)
            .filter_map(|(symbol, power)| {
                registry::lookup(symbol).map(|named| Term {
                    symbol: (*symbol).to_string(),
                    power: i32::from(*power),
                    named,
                })
            })
            .collect();
        Unit {
            scale: self.decompose_scale(),
            terms,
            dimension: self.dimension,
        }
    }

    /// The same symbolic terms with the numeric scale dropped
    pub fn unscaled(&self) -> Unit {
        Unit {
            scale: 1.0,
            terms: self.terms.clone(),
            dimension: self.dimension,
        }
    }

    pub fn multiply(&self, other: &Unit) -> UnitResult<Unit> {
        let mut terms = self.terms.clone();
        for term in &other.terms {
            merge_term(&mut terms, term, term.power);
        }
        Unit::from_parts(self.scale * other.scale, terms)
            .map_err(|reason| out_of_range(format_args!("{self} * {other}"), reason))
    }

    pub fn divide(&self, other: &Unit) -> UnitResult<Unit> {
        let mut terms = self.terms.clone();
        for term in &other.terms {
            merge_term(&mut terms, term, -term.power);
        }
        Unit::from_parts(self.scale / other.scale, terms)
            .map_err(|reason| out_of_range(format_args!("{self} / {other}"), reason))
    }

    pub fn powi(&self, n: i32) -> UnitResult<Unit> {
        if n == 0 {
            return Ok(Unit::dimensionless());
        }
        let context = || format!("({self})^{n}");
        let terms = self
            .terms
            .iter()
            .map(|t| {
                t.power.checked_mul(n).map(|power| Term {
                    power,
                    ..t.clone()
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| out_of_range(context(), "a power does not fit in i32"))?;
        Unit::from_parts(self.scale.powi(n), terms).map_err(|reason| out_of_range(context(), reason))
    }
}

fn is_positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn terms_scale(terms: &[Term]) -> f64 {
    terms
        .iter()
        .fold(1.0, |acc, t| acc * t.named.scale.powi(t.power))
}

fn out_of_range(unit: impl fmt::Display, reason: &str) -> UnitError {
    UnitError::OutOfRange {
        unit: unit.to_string(),
        reason: reason.to_string(),
    }
}

fn merge_term(terms: &mut Vec<Term>, term: &Term, power: i32) {
    if let Some(existing) = terms.iter_mut().find(|t| t.symbol == term.symbol) {
        existing.power = existing.power.saturating_add(power);
    } else {
        terms.push(Term {
            power,
            ..term.clone()
        });
    }
    terms.retain(|t| t.power != 0);
}

impl Default for Unit {
    fn default() -> Self {
        Unit::dimensionless()
    }
}

/// Physical equality: same dimension and the same scale up to rounding.
impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        if !self.is_equivalent(other) {
            return false;
        }
        let (a, b) = (self.decompose_scale(), other.decompose_scale());
        (a - b).abs() <= SCALE_TOLERANCE * a.abs().max(b.abs())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut numerator: Vec<(&str, i32)> = Vec::new();
        let mut denominator: Vec<(&str, i32)> = Vec::new();
        for t in &self.terms {
            if t.power > 0 {
                numerator.push((t.symbol.as_str(), t.power));
            } else {
                denominator.push((t.symbol.as_str(), -t.power));
            }
        }
        numerator.sort_by(|a, b| a.0.cmp(b.0));
        denominator.sort_by(|a, b| a.0.cmp(b.0));

        let term = |(symbol, power): &(&str, i32)| {
            if *power == 1 {
                (*symbol).to_string()
            } else {
                format!("{symbol}{power}")
            }
        };

        let mut head: Vec<String> = Vec::new();
        if self.scale != 1.0 {
            head.push(format!("{}", self.scale));
        }
        head.extend(numerator.iter().map(term));
        if head.is_empty() && !denominator.is_empty() {
            head.push("1".to_string());
        }
        let head = head.join(" ");

        match denominator.len() {
            0 => write!(f, "{head}"),
            1 => write!(f, "{head} / {}", term(&denominator[0])),
            _ => {
                let parts: Vec<String> = denominator.iter().map(term).collect();
                write!(f, "{head} / ({})", parts.join(" "))
            }
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl Mul for &Unit {
    type Output = UnitResult<Unit>;
    fn mul(self, rhs: &Unit) -> Self::Output {
        self.multiply(rhs)
    }
}

impl Mul for Unit {
    type Output = UnitResult<Unit>;
    fn mul(self, rhs: Unit) -> Self::Output {
        self.multiply(&rhs)
    }
}

impl Div for &Unit {
    type Output = UnitResult<Unit>;
    fn div(self, rhs: &Unit) -> Self::Output {
        self.divide(rhs)
    }
}

impl Div for Unit {
    type Output = UnitResult<Unit>;
    fn div(self, rhs: Unit) -> Self::Output {
        self.divide(&rhs)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Unit::parse(&s).map_err(serde::de::Error::custom)
    }
}
