//! Unit layer configuration

use serde::{Deserialize, Serialize};

/// Options applied when unit-aware operators are activated.
///
/// ```
/// use simpleunits_core::UnitConfig;
///
/// let config = UnitConfig {
///     keep_si: true,
///     ..Default::default()
/// };
/// assert!(config.keep_attrs);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Rescale `*` and `/` results into unscaled SI units instead of only
    /// labelling them with the SI-reduced (possibly scaled) unit.
    pub keep_si: bool,
    /// Keep the left operand's attributes (including `units`) across host
    /// arithmetic and reductions.
    pub keep_attrs: bool,
}

impl Default for UnitConfig {
    fn default() -> Self {
        UnitConfig {
            keep_si: false,
            keep_attrs: true,
        }
    }
}
