//! Unit-aware arithmetic for labeled arrays
//!
//! Attaches physical-unit semantics to labeled N-dimensional arrays. Units
//! live in each array's `units` attribute; wrapping an array in a
//! [`UnitfulArray`] routes its `+ - * /` through a unit layer that
//! - converts the right operand of `+`/`-` into the left operand's unit and
//!   rejects incommensurable units (`m + s` fails, `m + km` converts),
//! - composes units symbolically for `*`/`/` and labels results with their
//!   SI reduction, optionally rescaling into plain SI units (`keep_si`).
//!
//! ```
//! use simpleunits_core::{activate, Quantity, UnitfulArray};
//!
//! activate(false);
//! let s = UnitfulArray::from_vec("x", vec![1.0, 2.0, 3.0], "m");
//! let r = (&s + Quantity::with_units(6378.0, "km").unwrap()).unwrap();
//! assert_eq!(r.values(), vec![6_378_001.0, 6_378_002.0, 6_378_003.0]);
//! assert_eq!(r.units(), Some("m"));
//! ```

// Host containers (labeled arrays, datasets)
pub mod array;
pub mod dataset;

// Unit algebra
pub mod core_types;

// Unit-aware operator layer
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod ops;

pub use array::{ArithOp, AttrValue, LabeledArray, UNITS_KEY};
pub use config::UnitConfig;
pub use core_types::{Dimension, Quantity, Unit};
pub use dataset::Dataset;
pub use error::{ArrayError, Operation, UnitError, UnitResult};
pub use lifecycle::{activate, activate_with, deactivate, is_active};
pub use ops::{convert_to_unit, normalize_to_si, AsOperand, Operand, UnitfulArray};
