// A line item is a single billed product or service on an invoice. Its
// line_total is derived from quantity and unit price and is recomputed on
// every read path rather than trusted from input or storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{money, AppError, Result};

/// Represents a single line item on an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier for the line item
    #[serde(skip_deserializing)]
    pub id: Option<String>,

    /// Foreign key to the invoice
    #[serde(skip_deserializing)]
    pub invoice_id: Option<String>,

    /// Description of the product or service
    pub description: String,

    /// Quantity of items (must be positive)
    pub quantity: i32,

    /// Price per unit (must be non-negative)
    pub unit_price: Decimal,

    /// Derived total: quantity x unit_price, rounded to the minor unit
    #[serde(skip_deserializing)]
    pub line_total: Decimal,
}

impl LineItem {
    /// Create a new line item with validation
    ///
    /// # Arguments
    /// * `description` - Product/service description (max 255 chars)
    /// * `quantity` - Must be positive
    /// * `unit_price` - Must be non-negative
    pub fn new(description: String, quantity: i32, unit_price: Decimal) -> Result<Self> {
        Self::validate_description(&description)?;
        Self::validate_quantity(quantity)?;
        Self::validate_unit_price(unit_price)?;

        let mut line_item = Self {
            id: None,
            invoice_id: None,
            description,
            quantity,
            unit_price,
            line_total: Decimal::ZERO,
        };

        line_item.recompute_total();

        Ok(line_item)
    }

    /// Recompute the derived line total.
    ///
    /// Formula: line_total = quantity x unit_price, rounded half-up to cents.
    pub fn recompute_total(&mut self) {
        self.line_total = money::round(Decimal::from(self.quantity) * self.unit_price);
    }

    fn validate_description(description: &str) -> Result<()> {
        if description.trim().is_empty() {
            return Err(AppError::validation(
                "Line item description cannot be empty",
            ));
        }

        if description.len() > 255 {
            return Err(AppError::validation(
                "Line item description cannot exceed 255 characters",
            ));
        }

        Ok(())
    }

    fn validate_quantity(quantity: i32) -> Result<()> {
        if quantity <= 0 {
            return Err(AppError::validation(format!(
                "Quantity must be positive, got: {}",
                quantity
            )));
        }

        Ok(())
    }

    fn validate_unit_price(unit_price: Decimal) -> Result<()> {
        if unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit price must be non-negative, got: {}",
                unit_price
            )));
        }

        Ok(())
    }
}
