//! Shared types for the Bodega admin client
//!
//! Common types used across the workspace: entity models, API
//! request/response DTOs, payload validation rules, and the pure
//! sale-cart logic.

pub mod cart;
pub mod client;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use cart::{Cart, CartError, LineItem};
pub use client::{LoginRequest, LoginResponse, UserInfo};
