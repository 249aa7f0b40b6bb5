//! # Units of Measure
//!
//! The closed set of units an ingredient or recipe line can be expressed in.
//!
//! ## Conversion Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dimension   Base   Units (factor to base)                              │
//! │  ─────────   ────   ──────────────────────────────────────────────────  │
//! │  weight      g      g=1  kg=1000  lb=453.592  oz=28.3495                │
//! │  volume      ml     ml=1  l=1000  gal=3785.41  fl_oz=29.5735            │
//! │                     cup=236.588  tbsp=14.7868  tsp=4.92892              │
//! │  count       -      unit=1  piece=1  slice=1  whole=1                   │
//! │                                                                         │
//! │  target = quantity × factor[source] ÷ factor[target]                    │
//! │  Only units of the SAME dimension convert into each other.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pantry_core::unit::UnitOfMeasure;
//!
//! let kg: UnitOfMeasure = "kg".parse().unwrap();
//! assert_eq!(kg.convert_to(1.5, "g").unwrap(), 1500.0);
//! assert!(kg.convert_to(1.0, "ml").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Dimension
// =============================================================================

/// The physical category of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Base unit: grams.
    Weight,
    /// Base unit: milliliters.
    Volume,
    /// Discrete items, all factors 1.0.
    Count,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Weight => "weight",
            Dimension::Volume => "volume",
            Dimension::Count => "count",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Unit Of Measure
// =============================================================================

/// A unit from the fixed table. Serialized as its code (`"kg"`, `"fl_oz"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "gal")]
    Gallon,
    #[serde(rename = "fl_oz")]
    FluidOunce,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "unit")]
    Unit,
    #[serde(rename = "piece")]
    Piece,
    #[serde(rename = "slice")]
    Slice,
    #[serde(rename = "whole")]
    Whole,
}

impl UnitOfMeasure {
    /// Every unit in the table, weight first, then volume, then count.
    pub const ALL: [UnitOfMeasure; 15] = [
        UnitOfMeasure::Gram,
        UnitOfMeasure::Kilogram,
        UnitOfMeasure::Pound,
        UnitOfMeasure::Ounce,
        UnitOfMeasure::Milliliter,
        UnitOfMeasure::Liter,
        UnitOfMeasure::Gallon,
        UnitOfMeasure::FluidOunce,
        UnitOfMeasure::Cup,
        UnitOfMeasure::Tablespoon,
        UnitOfMeasure::Teaspoon,
        UnitOfMeasure::Unit,
        UnitOfMeasure::Piece,
        UnitOfMeasure::Slice,
        UnitOfMeasure::Whole,
    ];

    /// Looks up a unit by code.
    ///
    /// ## Errors
    /// `CoreError::UnknownUnit` if the code is not in the table. Codes are
    /// matched exactly (`"KG"` is unknown).
    pub fn parse(code: &str) -> CoreResult<Self> {
        UnitOfMeasure::ALL
            .into_iter()
            .find(|unit| unit.code() == code)
            .ok_or_else(|| CoreError::UnknownUnit(code.to_string()))
    }

    /// The unit's code as stored and serialized.
    pub const fn code(&self) -> &'static str {
        match self {
            UnitOfMeasure::Gram => "g",
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Pound => "lb",
            UnitOfMeasure::Ounce => "oz",
            UnitOfMeasure::Milliliter => "ml",
            UnitOfMeasure::Liter => "l",
            UnitOfMeasure::Gallon => "gal",
            UnitOfMeasure::FluidOunce => "fl_oz",
            UnitOfMeasure::Cup => "cup",
            UnitOfMeasure::Tablespoon => "tbsp",
            UnitOfMeasure::Teaspoon => "tsp",
            UnitOfMeasure::Unit => "unit",
            UnitOfMeasure::Piece => "piece",
            UnitOfMeasure::Slice => "slice",
            UnitOfMeasure::Whole => "whole",
        }
    }

    /// The unit's dimension.
    pub const fn dimension(&self) -> Dimension {
        match self {
            UnitOfMeasure::Gram
            | UnitOfMeasure::Kilogram
            | UnitOfMeasure::Pound
            | UnitOfMeasure::Ounce => Dimension::Weight,
            UnitOfMeasure::Milliliter
            | UnitOfMeasure::Liter
            | UnitOfMeasure::Gallon
            | UnitOfMeasure::FluidOunce
            | UnitOfMeasure::Cup
            | UnitOfMeasure::Tablespoon
            | UnitOfMeasure::Teaspoon => Dimension::Volume,
            UnitOfMeasure::Unit
            | UnitOfMeasure::Piece
            | UnitOfMeasure::Slice
            | UnitOfMeasure::Whole => Dimension::Count,
        }
    }

    /// Factor to the dimension's base unit (grams, milliliters, or 1.0).
    pub const fn factor(&self) -> f64 {
        match self {
            UnitOfMeasure::Gram => 1.0,
            UnitOfMeasure::Kilogram => 1000.0,
            UnitOfMeasure::Pound => 453.592,
            UnitOfMeasure::Ounce => 28.3495,
            UnitOfMeasure::Milliliter => 1.0,
            UnitOfMeasure::Liter => 1000.0,
            UnitOfMeasure::Gallon => 3785.41,
            UnitOfMeasure::FluidOunce => 29.5735,
            UnitOfMeasure::Cup => 236.588,
            UnitOfMeasure::Tablespoon => 14.7868,
            UnitOfMeasure::Teaspoon => 4.92892,
            UnitOfMeasure::Unit
            | UnitOfMeasure::Piece
            | UnitOfMeasure::Slice
            | UnitOfMeasure::Whole => 1.0,
        }
    }

    /// Units sharing the given dimension, in table order.
    pub fn units_in(dimension: Dimension) -> impl Iterator<Item = UnitOfMeasure> {
        UnitOfMeasure::ALL
            .into_iter()
            .filter(move |unit| unit.dimension() == dimension)
    }

    /// True iff both units have the same dimension.
    #[inline]
    pub fn is_compatible_with(&self, other: &UnitOfMeasure) -> bool {
        self.dimension() == other.dimension()
    }

    /// Converts `quantity` expressed in `self` into `target`.
    ///
    /// Plain `f64` arithmetic through the base unit; no rounding.
    ///
    /// ## Errors
    /// `CoreError::IncompatibleUnits` if the dimensions differ.
    pub fn convert(&self, quantity: f64, target: UnitOfMeasure) -> CoreResult<f64> {
        if !self.is_compatible_with(&target) {
            return Err(CoreError::IncompatibleUnits {
                from: self.code().to_string(),
                to: target.code().to_string(),
            });
        }

        let base_value = quantity * self.factor();
        Ok(base_value / target.factor())
    }

    /// Converts `quantity` expressed in `self` into the unit named by
    /// `target_code`.
    ///
    /// ## Errors
    /// - `CoreError::UnknownUnit` if `target_code` is not in the table
    /// - `CoreError::IncompatibleUnits` if the dimensions differ
    pub fn convert_to(&self, quantity: f64, target_code: &str) -> CoreResult<f64> {
        let target = UnitOfMeasure::parse(target_code)?;
        self.convert(quantity, target)
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UnitOfMeasure {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        UnitOfMeasure::parse(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_parse_every_code() {
        for unit in UnitOfMeasure::ALL {
            assert_eq!(UnitOfMeasure::parse(unit.code()).unwrap(), unit);
        }
    }

    #[test]
    fn test_parse_unknown_code() {
        for code in ["invalid_unit", "", "KG", "grams"] {
            assert!(matches!(
                UnitOfMeasure::parse(code),
                Err(CoreError::UnknownUnit(c)) if c == code
            ));
        }
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(UnitOfMeasure::Pound.dimension(), Dimension::Weight);
        assert_eq!(UnitOfMeasure::Tablespoon.dimension(), Dimension::Volume);
        assert_eq!(UnitOfMeasure::Slice.dimension(), Dimension::Count);
        assert_eq!(UnitOfMeasure::units_in(Dimension::Weight).count(), 4);
        assert_eq!(UnitOfMeasure::units_in(Dimension::Volume).count(), 7);
        assert_eq!(UnitOfMeasure::units_in(Dimension::Count).count(), 4);
    }

    #[test]
    fn test_compatibility() {
        assert!(UnitOfMeasure::Kilogram.is_compatible_with(&UnitOfMeasure::Ounce));
        assert!(UnitOfMeasure::Cup.is_compatible_with(&UnitOfMeasure::Liter));
        assert!(!UnitOfMeasure::Kilogram.is_compatible_with(&UnitOfMeasure::Milliliter));
        assert!(!UnitOfMeasure::Piece.is_compatible_with(&UnitOfMeasure::Gram));
    }

    #[test]
    fn test_basic_conversions() {
        let kg = UnitOfMeasure::Kilogram;
        assert_eq!(kg.convert_to(1.0, "g").unwrap(), 1000.0);
        assert_eq!(UnitOfMeasure::Gram.convert_to(500.0, "kg").unwrap(), 0.5);
        assert!((UnitOfMeasure::Pound.convert_to(1.0, "g").unwrap() - 453.592).abs() < EPSILON);
        assert!((UnitOfMeasure::Cup.convert_to(2.0, "ml").unwrap() - 473.176).abs() < EPSILON);
        assert_eq!(UnitOfMeasure::Piece.convert_to(3.0, "whole").unwrap(), 3.0);
    }

    #[test]
    fn test_round_trip_conversion() {
        for a in UnitOfMeasure::ALL {
            for b in UnitOfMeasure::units_in(a.dimension()) {
                let q = 3.75;
                let there = a.convert(q, b).unwrap();
                let back = b.convert(there, a).unwrap();
                assert!((back - q).abs() < 1e-9, "{a} -> {b} -> {a} gave {back}");
            }
        }

        let grams = UnitOfMeasure::Kilogram.convert_to(1.0, "g").unwrap();
        assert_eq!(UnitOfMeasure::Gram.convert_to(grams, "kg").unwrap(), 1.0);
    }

    #[test]
    fn test_incompatible_conversion_fails() {
        for a in UnitOfMeasure::ALL {
            for b in UnitOfMeasure::ALL {
                if a.dimension() != b.dimension() {
                    assert!(matches!(
                        a.convert(1.0, b),
                        Err(CoreError::IncompatibleUnits { .. })
                    ));
                }
            }
        }
        assert!(matches!(
            UnitOfMeasure::Kilogram.convert_to(1.0, "ml"),
            Err(CoreError::IncompatibleUnits { from, to }) if from == "kg" && to == "ml"
        ));
    }

    #[test]
    fn test_convert_to_unknown_target() {
        assert!(matches!(
            UnitOfMeasure::Gram.convert_to(1.0, "stone"),
            Err(CoreError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(
            serde_json::to_string(&UnitOfMeasure::FluidOunce).unwrap(),
            "\"fl_oz\""
        );
        let unit: UnitOfMeasure = serde_json::from_str("\"tbsp\"").unwrap();
        assert_eq!(unit, UnitOfMeasure::Tablespoon);
        assert!(serde_json::from_str::<UnitOfMeasure>("\"bucket\"").is_err());
    }
}
