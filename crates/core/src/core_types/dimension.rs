//! Physical dimension exponents
//!
//! A [`Dimension`] records the integer exponent of every SI base quantity a
//! unit is built from. Two units are commensurable exactly when their
//! dimensions are equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

/// Exponents over the SI base quantities (plus plane angle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub current: i8,
    pub temperature: i8,
    pub amount: i8,
    pub luminosity: i8,
    pub angle: i8,
}

impl Dimension {
    /// Pure number
    pub const NONE: Dimension = Dimension {
        length: 0,
        mass: 0,
        time: 0,
        current: 0,
        temperature: 0,
        amount: 0,
        luminosity: 0,
        angle: 0,
    };

    pub const LENGTH: Dimension = Dimension {
        length: 1,
        ..Self::NONE
    };
    pub const MASS: Dimension = Dimension {
        mass: 1,
        ..Self::NONE
    };
    pub const TIME: Dimension = Dimension {
        time: 1,
        ..Self::NONE
    };
    pub const CURRENT: Dimension = Dimension {
        current: 1,
        ..Self::NONE
    };
    pub const TEMPERATURE: Dimension = Dimension {
        temperature: 1,
        ..Self::NONE
    };
    pub const AMOUNT: Dimension = Dimension {
        amount: 1,
        ..Self::NONE
    };
    pub const LUMINOSITY: Dimension = Dimension {
        luminosity: 1,
        ..Self::NONE
    };
    pub const ANGLE: Dimension = Dimension {
        angle: 1,
        ..Self::NONE
    };

    /// True for pure numbers
    #[inline]
    pub fn is_dimensionless(self) -> bool {
        self == Self::NONE
    }

    /// Raise every exponent to an integer power.
    ///
    /// # Panics
    /// When an exponent leaves the `i8` range; see [`Dimension::checked_powi`].
    #[must_use]
    pub fn powi(self, n: i32) -> Dimension {
        match self.checked_powi(n) {
            Some(d) => d,
            None => panic!("dimension exponent overflow in {self} ^ {n}"),
        }
    }

    /// [`Dimension::powi`], or `None` when an exponent overflows.
    pub fn checked_powi(self, n: i32) -> Option<Dimension> {
        let p = |e: i8| {
            i32::from(e)
                .checked_mul(n)
                .and_then(|v| i8::try_from(v).ok())
        };
        Some(Dimension {
            length: p(self.length)?,
            mass: p(self.mass)?,
            time: p(self.time)?,
            current: p(self.current)?,
            temperature: p(self.temperature)?,
            amount: p(self.amount)?,
            luminosity: p(self.luminosity)?,
            angle: p(self.angle)?,
        })
    }

    /// Product of two dimensions, or `None` when an exponent overflows.
    pub fn checked_mul(self, rhs: Self) -> Option<Dimension> {
        Some(Dimension {
            length: self.length.checked_add(rhs.length)?,
            mass: self.mass.checked_add(rhs.mass)?,
            time: self.time.checked_add(rhs.time)?,
            current: self.current.checked_add(rhs.current)?,
            temperature: self.temperature.checked_add(rhs.temperature)?,
            amount: self.amount.checked_add(rhs.amount)?,
            luminosity: self.luminosity.checked_add(rhs.luminosity)?,
            angle: self.angle.checked_add(rhs.angle)?,
        })
    }

    /// Exponents paired with the SI base symbol they belong to, in the order
    /// SI-reduced units list them.
    pub fn base_exponents(self) -> [(&'static str, i8); 8] {
        [
            ("A", self.current),
            ("K", self.temperature),
            ("cd", self.luminosity),
            ("kg", self.mass),
            ("m", self.length),
            ("mol", self.amount),
            ("rad", self.angle),
            ("s", self.time),
        ]
    }
}

/// # Panics
/// When an exponent leaves the `i8` range; see [`Dimension::checked_mul`].
impl Mul for Dimension {
    type Output = Dimension;
    fn mul(self, rhs: Self) -> Self::Output {
        match self.checked_mul(rhs) {
            Some(d) => d,
            None => panic!("dimension exponent overflow in ({self}) * ({rhs})"),
        }
    }
}

impl Div for Dimension {
    type Output = Dimension;
    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let parts: Vec<String> = self
            .base_exponents()
            .iter()
            .filter(|(_, e)| *e != 0)
            .map(|(sym, e)| {
                if *e == 1 {
                    (*sym).to_string()
                } else {
                    format!("{sym}^{e}")
                }
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
