//! Sale Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payment method for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    Transfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Transfer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

/// Payment status for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Sale lifecycle status. Transitions move forward only, except
/// cancellation which the server accepts from any non-cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Processing,
    Completed,
    Cancelled,
}

/// Customer details attached to a sale
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Customer {
    #[validate(length(min = 1, message = "customer name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[validate(email(message = "invalid email"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One product-quantity-price tuple within a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Sale entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub date: DateTime<Utc>,
    pub customer: Customer,
    pub items: Vec<SaleItem>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: SaleStatus,
    pub total_amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Create sale payload. `total_amount` must equal the sum of
/// `quantity * unit_price` over all items; [`crate::cart::Cart`]
/// produces payloads that hold this by construction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    #[validate(nested)]
    pub customer: Customer,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<SaleItem>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `PUT /sales/{id}/payment-status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

/// Payload for `POST /sales/{id}/cancel`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleCancel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
