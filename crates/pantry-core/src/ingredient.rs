//! # Ingredient
//!
//! The stock record for one ingredient.
//!
//! ## Lifecycle
//! ```text
//! Ingredient::create(...)            id + created_at assigned
//!      │
//!      ├── update_quantity(q)        absolute set      ─┐
//!      ├── increase_quantity(n)      add                ├─ stamp updated_at
//!      └── decrease_quantity(n)      subtract, may fail ┘
//! ```
//!
//! Name uniqueness is not checked here; the service checks it against the
//! repository before creating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::quantity::Quantity;
use crate::unit::UnitOfMeasure;

/// An ingredient and its current stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier (UUID v4).
    pub id: Uuid,

    /// Display name, unique across ingredients.
    pub name: String,

    /// Current stock, expressed in `unit_of_measure`.
    pub quantity: Quantity,

    /// Unit the stock is kept in.
    pub unit_of_measure: UnitOfMeasure,

    /// Free-form grouping label ("dairy", "produce", ...).
    pub category: String,

    /// Threshold under which the ingredient counts as low on stock.
    pub minimum_stock: Quantity,

    pub created_at: DateTime<Utc>,

    /// `None` until the first mutation.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ingredient {
    /// Creates a new ingredient with a fresh id.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if `quantity` or `minimum_stock` is negative
    /// - `UnknownUnit` if `unit_code` is not in the unit table
    pub fn create(
        name: impl Into<String>,
        quantity: f64,
        unit_code: &str,
        category: impl Into<String>,
        minimum_stock: f64,
    ) -> CoreResult<Self> {
        Ok(Ingredient {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: Quantity::new(quantity)?,
            unit_of_measure: UnitOfMeasure::parse(unit_code)?,
            category: category.into(),
            minimum_stock: Quantity::new(minimum_stock)?,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Replaces the stock level wholesale.
    pub fn update_quantity(&mut self, quantity: f64) -> CoreResult<()> {
        self.quantity = Quantity::new(quantity)?;
        self.touch();
        Ok(())
    }

    /// Adds `amount` to the stock level.
    pub fn increase_quantity(&mut self, amount: f64) -> CoreResult<()> {
        self.quantity = self.quantity.try_add(amount)?;
        self.touch();
        Ok(())
    }

    /// Removes `amount` from the stock level.
    ///
    /// ## Errors
    /// `InsufficientStock` if `amount` exceeds the current stock. The record
    /// is left untouched in that case.
    pub fn decrease_quantity(&mut self, amount: f64) -> CoreResult<()> {
        if self.quantity < amount {
            return Err(CoreError::InsufficientStock {
                ingredient_id: self.id.to_string(),
                name: self.name.clone(),
                current_stock: self.quantity.value(),
                requested: amount,
            });
        }

        self.quantity = self.quantity.try_sub(amount)?;
        self.touch();
        Ok(())
    }

    /// True iff the stock is strictly below the minimum.
    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.minimum_stock
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flour() -> Ingredient {
        Ingredient::create("Flour", 10.0, "kg", "dry goods", 5.0).unwrap()
    }

    #[test]
    fn test_create() {
        let ingredient = flour();
        assert_eq!(ingredient.name, "Flour");
        assert_eq!(ingredient.quantity, 10.0);
        assert_eq!(ingredient.unit_of_measure, UnitOfMeasure::Kilogram);
        assert_eq!(ingredient.minimum_stock, 5.0);
        assert!(ingredient.updated_at.is_none());
    }

    #[test]
    fn test_create_rejects_bad_input() {
        assert!(matches!(
            Ingredient::create("Flour", -1.0, "kg", "dry goods", 0.0),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            Ingredient::create("Flour", 1.0, "kg", "dry goods", -5.0),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            Ingredient::create("Flour", 1.0, "invalid_unit", "dry goods", 0.0),
            Err(CoreError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_mutations_stamp_updated_at() {
        let mut ingredient = flour();

        ingredient.update_quantity(8.0).unwrap();
        assert_eq!(ingredient.quantity, 8.0);
        assert!(ingredient.updated_at.is_some());

        ingredient.increase_quantity(2.0).unwrap();
        assert_eq!(ingredient.quantity, 10.0);

        ingredient.decrease_quantity(10.0).unwrap();
        assert!(ingredient.quantity.is_zero());
    }

    #[test]
    fn test_update_quantity_rejects_negative() {
        let mut ingredient = flour();
        assert!(ingredient.update_quantity(-3.0).is_err());
        assert_eq!(ingredient.quantity, 10.0);
        assert!(ingredient.updated_at.is_none());
    }

    #[test]
    fn test_decrease_beyond_stock() {
        let mut ingredient = flour();
        let err = ingredient.decrease_quantity(15.0).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                name,
                current_stock,
                requested,
                ..
            } => {
                assert_eq!(name, "Flour");
                assert_eq!(current_stock, 10.0);
                assert_eq!(requested, 15.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ingredient.quantity, 10.0);
    }

    #[test]
    fn test_below_minimum() {
        let mut ingredient = flour();
        assert!(!ingredient.is_below_minimum());

        ingredient.update_quantity(5.0).unwrap();
        assert!(!ingredient.is_below_minimum());

        ingredient.update_quantity(4.99).unwrap();
        assert!(ingredient.is_below_minimum());
    }
}
