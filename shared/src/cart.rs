//! Sale cart - line-item accumulation for a sale being composed
//!
//! Pure logic, no I/O. Line items are keyed by product id: adding a
//! product that is already present increments its quantity instead of
//! duplicating the line. Quantities are checked against the product's
//! last-known stock figure; the server is NOT re-consulted here, so a
//! stale figure can still let a sale through that the server rejects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Customer, PaymentMethod, PaymentStatus, Product, SaleCreate, SaleItem};

/// Cart error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Requested quantity exceeds the product's recorded stock
    #[error("only {available} units of {name} available")]
    InsufficientStock { name: String, available: i64 },

    /// Quantity must be at least 1
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// A sale needs at least one line item
    #[error("cart is empty")]
    Empty,

    /// Index out of range
    #[error("no line item at index {0}")]
    NoSuchItem(usize),
}

/// One line of the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    /// Stock recorded when the product was added
    pub stock: i64,
    pub quantity: i64,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Sale cart
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add `quantity` units of a product. If the product is already in
    /// the cart its line quantity is incremented; a quantity that would
    /// exceed recorded stock is rejected and the prior quantity stands.
    pub fn add(&mut self, product: &Product, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                let wanted = item.quantity + quantity;
                if wanted > item.stock {
                    return Err(CartError::InsufficientStock {
                        name: item.product_name.clone(),
                        available: item.stock,
                    });
                }
                item.quantity = wanted;
            }
            None => {
                if quantity > product.stock {
                    return Err(CartError::InsufficientStock {
                        name: product.name.clone(),
                        available: product.stock,
                    });
                }
                self.items.push(LineItem {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    stock: product.stock,
                    quantity,
                });
            }
        }
        Ok(())
    }

    /// Set the quantity of the line at `index`, with the same stock guard.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        let item = self.items.get_mut(index).ok_or(CartError::NoSuchItem(index))?;
        if quantity > item.stock {
            return Err(CartError::InsufficientStock {
                name: item.product_name.clone(),
                available: item.stock,
            });
        }
        item.quantity = quantity;
        Ok(())
    }

    /// Remove the line at `index`.
    pub fn remove(&mut self, index: usize) -> Result<(), CartError> {
        if index >= self.items.len() {
            return Err(CartError::NoSuchItem(index));
        }
        self.items.remove(index);
        Ok(())
    }

    /// Total amount, recomputed on demand as the sum of
    /// `quantity * unit_price` across all lines.
    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Build the create-sale payload. Holds the total invariant by
    /// construction.
    pub fn into_sale(
        self,
        customer: Customer,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        notes: Option<String>,
    ) -> Result<SaleCreate, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        let total_amount = self.total();
        Ok(SaleCreate {
            customer,
            items: self
                .items
                .into_iter()
                .map(|i| SaleItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                })
                .collect(),
            payment_method,
            payment_status,
            total_amount,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: f64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            code: format!("C-{id}"),
            name: format!("Product {id}"),
            description: None,
            price,
            cost: price / 2.0,
            stock,
            category: "test".to_string(),
            supplier: None,
            discount: 0.0,
        }
    }

    #[test]
    fn adding_same_product_twice_increments_quantity() {
        let mut cart = Cart::new();
        let p = product("p1", 10.0, 5);
        cart.add(&p, 1).unwrap();
        cart.add(&p, 2).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), 30.0);
    }

    #[test]
    fn total_is_sum_of_quantity_times_unit_price() {
        let mut cart = Cart::new();
        cart.add(&product("p1", 10.0, 5), 2).unwrap();
        cart.add(&product("p2", 7.5, 5), 3).unwrap();
        assert_eq!(cart.total(), 2.0 * 10.0 + 3.0 * 7.5);
    }

    #[test]
    fn quantity_above_stock_is_rejected_and_prior_quantity_stands() {
        let mut cart = Cart::new();
        let p = product("p1", 10.0, 3);
        cart.add(&p, 2).unwrap();

        let err = cart.add(&p, 2).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                name: p.name.clone(),
                available: 3
            }
        );
        assert_eq!(cart.items()[0].quantity, 2);

        let err = cart.set_quantity(0, 4).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { .. }));
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn set_quantity_below_one_is_rejected() {
        let mut cart = Cart::new();
        cart.add(&product("p1", 10.0, 3), 1).unwrap();
        assert_eq!(cart.set_quantity(0, 0), Err(CartError::InvalidQuantity));
    }

    #[test]
    fn remove_drops_the_line() {
        let mut cart = Cart::new();
        cart.add(&product("p1", 10.0, 3), 1).unwrap();
        cart.add(&product("p2", 5.0, 3), 1).unwrap();
        cart.remove(0).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].product_id, "p2");
    }

    #[test]
    fn empty_cart_cannot_become_a_sale() {
        let cart = Cart::new();
        let err = cart
            .into_sale(
                Customer {
                    name: "Ana".to_string(),
                    phone: None,
                    email: None,
                },
                PaymentMethod::Cash,
                PaymentStatus::Pending,
                None,
            )
            .unwrap_err();
        assert_eq!(err, CartError::Empty);
    }

    #[test]
    fn into_sale_carries_the_computed_total() {
        let mut cart = Cart::new();
        cart.add(&product("p1", 12.0, 10), 2).unwrap();
        cart.add(&product("p2", 3.0, 10), 4).unwrap();
        let expected = cart.total();

        let sale = cart
            .into_sale(
                Customer {
                    name: "Ana".to_string(),
                    phone: None,
                    email: None,
                },
                PaymentMethod::Transfer,
                PaymentStatus::Paid,
                Some("counter sale".to_string()),
            )
            .unwrap();

        assert_eq!(sale.total_amount, expected);
        assert_eq!(sale.items.len(), 2);
        assert_eq!(
            sale.total_amount,
            sale.items
                .iter()
                .map(|i| i.quantity as f64 * i.unit_price)
                .sum::<f64>()
        );
    }
}
