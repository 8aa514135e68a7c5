//! Point-of-sale entry: product picker, cart and checkout form.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use bodega_client::ClientError;
use shared::models::{Customer, PaymentMethod, PaymentStatus, Product, Sale};
use shared::{Cart, CartError};
use validator::Validate;

use crate::app::{Action, AppMsg, Ctx, Route};
use crate::forms::{Form, FormField};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Zone {
    Picker,
    Cart,
    Form,
}

pub struct NewSalePage {
    products: Vec<Product>,
    picker_state: ListState,
    cart: Cart,
    cart_selected: usize,
    form: Form,
    zone: Zone,
    loading: bool,
    submitting: bool,
    warning: Option<String>,
}

fn checkout_form() -> Form {
    Form::new(vec![
        FormField::text("name", "Customer"),
        FormField::text("phone", "Phone"),
        FormField::text("email", "Email"),
        FormField::text("notes", "Notes"),
        FormField::select(
            "payment_method",
            "Payment",
            PaymentMethod::ALL.iter().map(|m| m.label().to_string()).collect(),
            0,
        ),
        FormField::select(
            "payment_status",
            "Status",
            vec!["pending".to_string(), "paid".to_string()],
            0,
        ),
    ])
}

impl NewSalePage {
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            picker_state: ListState::default(),
            cart: Cart::new(),
            cart_selected: 0,
            form: checkout_form(),
            zone: Zone::Picker,
            loading: false,
            submitting: false,
            warning: None,
        }
    }

    pub fn enter(&mut self, ctx: &Ctx) {
        self.loading = true;
        self.warning = None;
        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::PickerLoaded(api.products().await) });
    }

    pub fn on_picker(&mut self, result: Result<Vec<Product>, ClientError>) -> Action {
        self.loading = false;
        match result {
            Ok(products) => {
                // Out-of-stock products cannot be added anyway.
                self.products = products.into_iter().filter(|p| p.stock > 0).collect();
                if !self.products.is_empty() && self.picker_state.selected().is_none() {
                    self.picker_state.select(Some(0));
                }
            }
            Err(e) => self.warning = Some(e.banner_message()),
        }
        Action::None
    }

    pub fn on_created(&mut self, result: Result<Sale, ClientError>) -> Action {
        self.submitting = false;
        match result {
            Ok(sale) => {
                tracing::info!(id = %sale.id, "sale recorded");
                self.cart = Cart::new();
                self.form = checkout_form();
                self.zone = Zone::Picker;
                Action::Navigate(Route::Sales)
            }
            Err(e) => {
                self.warning = Some(e.banner_message());
                Action::None
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        if key.code == KeyCode::Tab {
            self.zone = match self.zone {
                Zone::Picker => Zone::Cart,
                Zone::Cart => Zone::Form,
                Zone::Form => Zone::Picker,
            };
            return Action::None;
        }
        match self.zone {
            Zone::Picker => self.on_picker_key(key),
            Zone::Cart => self.on_cart_key(key),
            Zone::Form => self.on_form_key(key, ctx),
        }
        Action::None
    }

    fn on_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                let i = self.picker_state.selected().unwrap_or(0);
                self.picker_state.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Down => {
                let i = self.picker_state.selected().unwrap_or(0);
                if i + 1 < self.products.len() {
                    self.picker_state.select(Some(i + 1));
                }
            }
            KeyCode::Enter => {
                let Some(product) = self.picker_state.selected().and_then(|i| self.products.get(i))
                else {
                    return;
                };
                match self.cart.add(product, 1) {
                    Ok(()) => self.warning = None,
                    Err(e) => self.warning = Some(e.to_string()),
                }
            }
            _ => {}
        }
    }

    fn on_cart_key(&mut self, key: KeyEvent) {
        let len = self.cart.len();
        match key.code {
            KeyCode::Up => self.cart_selected = self.cart_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.cart_selected + 1 < len {
                    self.cart_selected += 1;
                }
            }
            KeyCode::Char('+') => {
                let Some(item) = self.cart.items().get(self.cart_selected) else { return };
                let quantity = item.quantity + 1;
                match self.cart.set_quantity(self.cart_selected, quantity) {
                    Ok(()) => self.warning = None,
                    Err(e) => self.warning = Some(e.to_string()),
                }
            }
            KeyCode::Char('-') => {
                let Some(item) = self.cart.items().get(self.cart_selected) else { return };
                if item.quantity <= 1 {
                    let _ = self.cart.remove(self.cart_selected);
                } else {
                    let quantity = item.quantity - 1;
                    let _ = self.cart.set_quantity(self.cart_selected, quantity);
                }
                self.cart_selected = self.cart_selected.min(self.cart.len().saturating_sub(1));
            }
            KeyCode::Char('d') => {
                let _ = self.cart.remove(self.cart_selected);
                self.cart_selected = self.cart_selected.min(self.cart.len().saturating_sub(1));
            }
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent, ctx: &Ctx) {
        match key.code {
            KeyCode::Up => self.form.focus_prev(),
            KeyCode::Down => self.form.focus_next(),
            KeyCode::Enter => self.submit(ctx),
            _ => self.form.handle_key(key),
        }
    }

    fn submit(&mut self, ctx: &Ctx) {
        if self.submitting {
            return;
        }
        self.form.clear_errors();
        if self.cart.is_empty() {
            self.warning = Some("The cart is empty".to_string());
            return;
        }

        let customer = Customer {
            name: self.form.value("name"),
            phone: self.form.optional_value("phone"),
            email: self.form.optional_value("email"),
        };
        if let Err(errors) = customer.validate() {
            self.form.apply_validation_errors(&errors);
            return;
        }

        let method = PaymentMethod::ALL
            .into_iter()
            .find(|m| m.label() == self.form.value("payment_method"))
            .unwrap_or_default();
        let status = if self.form.value("payment_status") == "paid" {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };
        let notes = self.form.optional_value("notes");

        let payload = match self.cart.clone().into_sale(customer, method, status, notes) {
            Ok(payload) => payload,
            Err(CartError::Empty) => {
                self.warning = Some("The cart is empty".to_string());
                return;
            }
            Err(e) => {
                self.warning = Some(e.to_string());
                return;
            }
        };

        self.submitting = true;
        self.warning = None;
        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::SaleCreated(api.create_sale(&payload).await) });
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [picker_area, cart_area, form_area] = Layout::horizontal([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .areas(area);

        self.render_picker(frame, picker_area);
        self.render_cart(frame, cart_area);
        self.render_form(frame, form_area);
    }

    fn zone_block(&self, title: &str, zone: Zone) -> Block<'static> {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "));
        if self.zone == zone {
            block = block.border_style(Style::default().fg(Color::Cyan));
        }
        block
    }

    fn render_picker(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.loading { "Products (loading...)" } else { "Products" };
        let items: Vec<ListItem> = self
            .products
            .iter()
            .map(|p| {
                ListItem::new(format!("{:<8} {} (${:.2}, {} left)", p.code, p.name, p.price, p.stock))
            })
            .collect();
        let list = List::new(items)
            .block(self.zone_block(title, Zone::Picker))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.picker_state);
    }

    fn render_cart(&mut self, frame: &mut Frame, area: Rect) {
        let block = self.zone_block("Cart", Zone::Cart);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [list_area, footer] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(inner);

        let lines: Vec<Line> = self
            .cart
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let text = format!(
                    "{} x{} = ${:.2}",
                    item.product_name,
                    item.quantity,
                    item.subtotal()
                );
                if self.zone == Zone::Cart && i == self.cart_selected {
                    Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    Line::from(text)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), list_area);

        let mut footer_lines = vec![Line::styled(
            format!("Total: ${:.2}", self.cart.total()),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(warning) = &self.warning {
            footer_lines.push(Line::styled(
                warning.clone(),
                Style::default().fg(Color::Red),
            ));
        }
        frame.render_widget(Paragraph::new(footer_lines), footer);
    }

    fn render_form(&mut self, frame: &mut Frame, area: Rect) {
        let title = match (self.submitting, self.zone == Zone::Form) {
            (true, _) => "Checkout (saving...)",
            (false, true) => "Checkout [active]",
            (false, false) => "Checkout",
        };
        self.form.render(frame, area, title);
    }
}
