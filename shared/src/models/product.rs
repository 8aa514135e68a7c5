//! Product Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    /// Unique product code, immutable after creation
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub cost: f64,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub supplier: Option<String>,
    /// Discount in percentage (0-100)
    #[serde(default)]
    pub discount: f64,
}

/// Create product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "price must be positive"))]
    pub price: f64,
    #[validate(range(exclusive_min = 0.0, message = "cost must be positive"))]
    pub cost: f64,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i64,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "discount must be between 0 and 100"))]
    pub discount: f64,
}

/// Update product payload. `code` is immutable and deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "price must be positive"))]
    pub price: f64,
    #[validate(range(exclusive_min = 0.0, message = "cost must be positive"))]
    pub cost: f64,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i64,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "discount must be between 0 and 100"))]
    pub discount: f64,
}

/// Stock adjustment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    Add,
    Subtract,
}

/// Stock adjustment payload for `POST /products/{id}/stock`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockAdjustment {
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    pub operation: StockOperation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> ProductCreate {
        ProductCreate {
            code: "P-001".to_string(),
            name: "Rice 1kg".to_string(),
            description: None,
            price: 45.0,
            cost: 30.0,
            stock: 10,
            category: "Grains".to_string(),
            supplier: None,
            discount: 0.0,
        }
    }

    #[test]
    fn create_with_negative_stock_is_rejected() {
        let payload = ProductCreate {
            stock: -1,
            ..valid_create()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock"));
    }

    #[test]
    fn create_with_zero_price_is_rejected() {
        let payload = ProductCreate {
            price: 0.0,
            ..valid_create()
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn discount_over_100_is_rejected() {
        let payload = ProductCreate {
            discount: 101.0,
            ..valid_create()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("discount"));
    }

    #[test]
    fn valid_payload_passes() {
        assert!(valid_create().validate().is_ok());
    }
}
