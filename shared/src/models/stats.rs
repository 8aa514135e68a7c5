//! Dashboard statistics from `GET /sales/stats`

use serde::{Deserialize, Serialize};

/// Aggregate sales figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_sales: u64,
    pub total_revenue: f64,
    pub average_sale_amount: f64,
}

/// One row of the best-seller ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_name: String,
    pub quantity: i64,
    pub total_sold: f64,
}

/// Sales statistics response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub summary: StatsSummary,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
}
