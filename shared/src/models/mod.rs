//! Entity models and CRUD payloads
//!
//! Every entity is owned and mutated by the remote API; these are
//! transient, re-fetchable copies. Create and update payloads are
//! distinct types with their own validation rules.

mod product;
mod sale;
mod stats;
mod user;

pub use product::{Product, ProductCreate, ProductUpdate, StockAdjustment, StockOperation};
pub use sale::{
    Customer, PaymentMethod, PaymentStatus, PaymentStatusUpdate, Sale, SaleCancel, SaleCreate,
    SaleItem, SaleStatus,
};
pub use stats::{SalesStats, StatsSummary, TopProduct};
pub use user::{Role, User, UserCreate, UserPasswordUpdate, UserStatusUpdate, UserUpdate};
