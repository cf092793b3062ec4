//! Unit symbol registry
//!
//! Maps unit symbols (optionally carrying an SI prefix) to their dimension and
//! scale relative to the SI base units. Exact symbol matches always win over
//! prefix splitting, so `min` is a minute and `cd` a candela.

use super::dimension::Dimension;
use rustc_hash::FxHashMap;
use std::f64::consts::PI;
use std::sync::OnceLock;

/// A resolved unit symbol
#[derive(Debug, Clone, PartialEq)]
pub struct NamedUnit {
    /// Scale relative to the SI base composite of `dimension`
    pub scale: f64,
    pub dimension: Dimension,
}

struct Entry {
    unit: NamedUnit,
    prefixable: bool,
}

const SI_PREFIXES: &[(&str, i32)] = &[
    ("da", 1),
    ("Y", 24),
    ("Z", 21),
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
    ("h", 2),
    ("d", -1),
    ("c", -2),
    ("m", -3),
    ("u", -6),
    ("µ", -6),
    ("n", -9),
    ("p", -12),
    ("f", -15),
    ("a", -18),
    ("z", -21),
    ("y", -24),
];

fn table() -> &'static FxHashMap<&'static str, Entry> {
    static TABLE: OnceLock<FxHashMap<&'static str, Entry>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let force = Dimension::MASS * Dimension::LENGTH / Dimension::TIME.powi(2);
        let energy = force * Dimension::LENGTH;
        let power = energy / Dimension::TIME;
        let charge = Dimension::CURRENT * Dimension::TIME;
        let voltage = power / Dimension::CURRENT;
        let volume = Dimension::LENGTH.powi(3);
        let pressure = force / Dimension::LENGTH.powi(2);

        let defs: [(&'static str, f64, Dimension, bool); 26] = [
            // SI base units
            ("m", 1.0, Dimension::LENGTH, true),
            ("kg", 1.0, Dimension::MASS, false),
            ("g", 1e-3, Dimension::MASS, true),
            ("s", 1.0, Dimension::TIME, true),
            ("A", 1.0, Dimension::CURRENT, true),
            ("K", 1.0, Dimension::TEMPERATURE, true),
            ("mol", 1.0, Dimension::AMOUNT, true),
            ("cd", 1.0, Dimension::LUMINOSITY, true),
            ("rad", 1.0, Dimension::ANGLE, true),
            // Derived SI units
            ("N", 1.0, force, true),
            ("J", 1.0, energy, true),
            ("W", 1.0, power, true),
            ("Pa", 1.0, pressure, true),
            ("Hz", 1.0, Dimension::NONE / Dimension::TIME, true),
            ("C", 1.0, charge, true),
            ("V", 1.0, voltage, true),
            ("Ohm", 1.0, voltage / Dimension::CURRENT, true),
            // Accepted non-SI units
            ("min", 60.0, Dimension::TIME, false),
            ("h", 3600.0, Dimension::TIME, false),
            ("d", 86400.0, Dimension::TIME, false),
            ("yr", 365.25 * 86400.0, Dimension::TIME, true),
            ("l", 1e-3, volume, true),
            ("L", 1e-3, volume, true),
            ("t", 1e3, Dimension::MASS, true),
            ("bar", 1e5, pressure, true),
            ("deg", PI / 180.0, Dimension::ANGLE, false),
        ];

        let mut map = FxHashMap::default();
        for (symbol, scale, dimension, prefixable) in defs {
            map.insert(
                symbol,
                Entry {
                    unit: NamedUnit { scale, dimension },
                    prefixable,
                },
            );
        }
        map
    })
}

/// Resolve a unit symbol, trying an exact match before SI prefix splitting.
pub fn lookup(symbol: &str) -> Option<NamedUnit> {
    let table = table();
    if let Some(entry) = table.get(symbol) {
        return Some(entry.unit.clone());
    }
    SI_PREFIXES.iter().find_map(|(prefix, exponent)| {
        let rest = symbol.strip_prefix(prefix)?;
        let entry = table.get(rest).filter(|e| e.prefixable)?;
        Some(NamedUnit {
            scale: 10f64.powi(*exponent) * entry.unit.scale,
            dimension: entry.unit.dimension,
        })
    })
}
