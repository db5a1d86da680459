//! # Measurement Configuration
//!
//! Units, range predicates, and the option set attached to a measurement
//! request. Options carry no required parameters; the builder exists so
//! call sites stay readable when only one or two filters are armed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 1 Angstrom in bohr radii.
pub const ANGSTROMS_PER_BOHR: f64 = 0.5291772;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown distance unit: {0}")]
pub struct ParseDistanceUnitError(String);

/// Output unit for distance measurements. Angles and torsions are always
/// reported in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Angstroms,
    Nanometers,
    Picometers,
    Bohr,
}

impl DistanceUnit {
    /// Converts a raw Angstrom value without rounding.
    pub fn convert(self, angstroms: f64) -> f64 {
        match self {
            DistanceUnit::Angstroms => angstroms,
            DistanceUnit::Nanometers => angstroms / 10.0,
            DistanceUnit::Picometers => angstroms * 100.0,
            DistanceUnit::Bohr => angstroms / ANGSTROMS_PER_BOHR,
        }
    }

    /// Converts and rounds to the unit's conventional display precision.
    pub fn round(self, angstroms: f64) -> f64 {
        let (value, scale) = match self {
            DistanceUnit::Angstroms => (angstroms, 100.0),
            DistanceUnit::Nanometers => (angstroms / 10.0, 1000.0),
            DistanceUnit::Picometers => (angstroms * 100.0, 10.0),
            DistanceUnit::Bohr => (angstroms / ANGSTROMS_PER_BOHR, 1000.0),
        };
        (value * scale + 0.5).floor() / scale
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DistanceUnit::Angstroms => "\u{00C5}",
            DistanceUnit::Nanometers => "nm",
            DistanceUnit::Picometers => "pm",
            DistanceUnit::Bohr => "au",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ParseDistanceUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "angstroms" | "ang" | "\u{00C5}" => Ok(DistanceUnit::Angstroms),
            "nanometers" | "nm" => Ok(DistanceUnit::Nanometers),
            "picometers" | "pm" => Ok(DistanceUnit::Picometers),
            "au" | "bohr" => Ok(DistanceUnit::Bohr),
            _ => Err(ParseDistanceUnitError(s.to_string())),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DistanceUnit::Angstroms => "angstroms",
            DistanceUnit::Nanometers => "nanometers",
            DistanceUnit::Picometers => "picometers",
            DistanceUnit::Bohr => "au",
        })
    }
}

/// Inclusive `[min, max]` acceptance window on the measured value, in the
/// request's output unit. `min == f64::MAX` disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn accepts(&self, value: f64) -> bool {
        self.min == f64::MAX || (value >= self.min && value <= self.max)
    }
}

/// Filters and formatting attached to a measurement request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasureOptions {
    pub must_be_connected: bool,
    pub must_not_be_connected: bool,
    /// `Some(true)` keeps only tuples within one molecule, `Some(false)`
    /// only tuples spanning molecules, `None` disables the filter.
    pub intramolecular: Option<bool>,
    pub range: Option<RangeFilter>,
    pub unit: DistanceUnit,
    /// Optional label template; `%VALUE` and `%UNIT` are substituted.
    pub format: Option<String>,
    /// Caller-side exhaustive-mode bookkeeping; enumeration itself is
    /// always exhaustive.
    pub all: bool,
}

#[derive(Default)]
pub struct MeasureOptionsBuilder {
    options: MeasureOptions,
}

impl MeasureOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must_be_connected(mut self, required: bool) -> Self {
        self.options.must_be_connected = required;
        self
    }

    pub fn must_not_be_connected(mut self, forbidden: bool) -> Self {
        self.options.must_not_be_connected = forbidden;
        self
    }

    pub fn intramolecular(mut self, intramolecular: bool) -> Self {
        self.options.intramolecular = Some(intramolecular);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.options.range = Some(RangeFilter::new(min, max));
        self
    }

    pub fn unit(mut self, unit: DistanceUnit) -> Self {
        self.options.unit = unit;
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.options.format = Some(format.to_string());
        self
    }

    pub fn all(mut self, all: bool) -> Self {
        self.options.all = all;
        self
    }

    pub fn build(self) -> MeasureOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion() {
        assert!((DistanceUnit::Angstroms.convert(2.5) - 2.5).abs() < 1e-9);
        assert!((DistanceUnit::Nanometers.convert(2.5) - 0.25).abs() < 1e-9);
        assert!((DistanceUnit::Picometers.convert(2.5) - 250.0).abs() < 1e-9);
        assert!((DistanceUnit::Bohr.convert(0.5291772) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_uses_per_unit_precision() {
        assert!((DistanceUnit::Angstroms.round(1.23456) - 1.23).abs() < 1e-9);
        assert!((DistanceUnit::Nanometers.round(1.23456) - 0.123).abs() < 1e-9);
        assert!((DistanceUnit::Picometers.round(1.23456) - 123.5).abs() < 1e-9);
    }

    #[test]
    fn unit_parse_round_trip() {
        for unit in [
            DistanceUnit::Angstroms,
            DistanceUnit::Nanometers,
            DistanceUnit::Picometers,
            DistanceUnit::Bohr,
        ] {
            assert_eq!(unit.to_string().parse::<DistanceUnit>().unwrap(), unit);
        }
        assert!("furlongs".parse::<DistanceUnit>().is_err());
    }

    #[test]
    fn range_filter_is_inclusive_and_disarmable() {
        let range = RangeFilter::new(1.0, 2.0);
        assert!(range.accepts(1.0));
        assert!(range.accepts(2.0));
        assert!(!range.accepts(2.001));
        let unbounded = RangeFilter::new(f64::MAX, 0.0);
        assert!(unbounded.accepts(1e9));
    }

    #[test]
    fn builder_arms_only_what_was_asked() {
        let options = MeasureOptionsBuilder::new()
            .must_be_connected(true)
            .range(0.0, 3.0)
            .unit(DistanceUnit::Nanometers)
            .build();
        assert!(options.must_be_connected);
        assert!(!options.must_not_be_connected);
        assert_eq!(options.intramolecular, None);
        assert_eq!(options.unit, DistanceUnit::Nanometers);
        assert_eq!(options.range, Some(RangeFilter::new(0.0, 3.0)));
    }
}
