//! # Quantity Module
//!
//! Provides the `Quantity` value object: a non-negative amount of stock.
//!
//! ## Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A Quantity is ALWAYS finite and >= 0                                   │
//! │                                                                         │
//! │    Quantity::new(2.5)   → Ok(2.5)                                       │
//! │    Quantity::new(-1.0)  → Err(InvalidQuantity)   never clamped to 0     │
//! │    Quantity::new(NaN)   → Err(InvalidQuantity)                          │
//! │                                                                         │
//! │  Every arithmetic result is re-validated, so                            │
//! │    3.0 - 5.0            → Err(InvalidQuantity)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pantry_core::quantity::Quantity;
//!
//! let stock = Quantity::new(10.0).unwrap();
//! let after = stock.try_sub(3.0).unwrap();
//! assert_eq!(after, 7.0);
//!
//! assert!(stock.try_sub(Quantity::new(15.0).unwrap()).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Quantity Type
// =============================================================================

/// A non-negative amount, unit-less on its own.
///
/// The unit lives next to the quantity (on the ingredient or recipe line);
/// this type only guards the numeric invariant. It is `Copy`, and every
/// "mutation" produces a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quantity(f64);

impl Quantity {
    /// Creates a quantity, rejecting negative and non-finite values.
    ///
    /// ## Example
    /// ```rust
    /// use pantry_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::new(4.0).unwrap().value(), 4.0);
    /// assert!(Quantity::new(-0.5).is_err());
    /// ```
    pub fn new(value: f64) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(CoreError::invalid_quantity(value, "Quantity must be a finite number"));
        }
        if value < 0.0 {
            return Err(CoreError::invalid_quantity(value, "Quantity cannot be negative"));
        }
        Ok(Quantity(value))
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0.0)
    }

    /// Returns the underlying value.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Adds another quantity or a raw number.
    ///
    /// Adding a negative raw number is allowed as long as the result stays
    /// non-negative.
    pub fn try_add(self, other: impl Into<f64>) -> CoreResult<Self> {
        Quantity::new(self.0 + other.into())
    }

    /// Subtracts another quantity or a raw number.
    ///
    /// ## Example
    /// ```rust
    /// use pantry_core::quantity::Quantity;
    ///
    /// let q = Quantity::new(5.0).unwrap();
    /// assert_eq!(q.try_sub(2.0).unwrap(), 3.0);
    /// assert!(q.try_sub(6.0).is_err());
    /// ```
    pub fn try_sub(self, other: impl Into<f64>) -> CoreResult<Self> {
        Quantity::new(self.0 - other.into())
    }

    /// Multiplies by a non-negative factor (e.g. a number of servings).
    pub fn scale(self, factor: f64) -> CoreResult<Self> {
        Quantity::new(self.0 * factor)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Quantity {
    type Error = CoreError;

    fn try_from(value: f64) -> CoreResult<Self> {
        Quantity::new(value)
    }
}

impl From<Quantity> for f64 {
    fn from(q: Quantity) -> f64 {
        q.0
    }
}

/// Comparison against raw numbers, by underlying value.
impl PartialEq<f64> for Quantity {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<f64> for Quantity {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
