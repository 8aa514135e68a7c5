//! Products page: list, create/edit, stock adjustment, delete.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde_json::Value;

use bodega_client::ClientError;
use shared::models::{Product, ProductCreate, ProductUpdate, StockAdjustment, StockOperation};
use validator::Validate;

use crate::app::{Action, AppMsg, Ctx};
use crate::display::{ColumnSpec, DataDisplay, centered_rect};
use crate::forms::{Form, FormField, parse_number};

fn price_cell(record: &Value) -> String {
    format!("${:.2}", record["price"].as_f64().unwrap_or_default())
}

enum Modal {
    None,
    Edit { id: Option<String>, form: Form },
    Stock { id: String, name: String, form: Form },
    ConfirmDelete { id: String, name: String },
}

pub struct ProductsPage {
    records: Vec<Product>,
    rows: Vec<Value>,
    loading: bool,
    error: Option<String>,
    display: DataDisplay,
    columns: Vec<ColumnSpec>,
    modal: Modal,
}

impl ProductsPage {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            rows: Vec::new(),
            loading: false,
            error: None,
            display: DataDisplay::default(),
            columns: vec![
                ColumnSpec::new("Code", "code").with_width(10),
                ColumnSpec::new("Product", "name"),
                ColumnSpec::new("Category", "category"),
                ColumnSpec::new("Price", "price")
                    .with_renderer(price_cell)
                    .with_width(10),
                ColumnSpec::new("Stock", "stock").with_width(7),
                ColumnSpec::new("Supplier", "supplier"),
            ],
            modal: Modal::None,
        }
    }

    pub fn enter(&mut self, ctx: &Ctx) {
        self.loading = true;
        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::ProductsLoaded(api.products().await) });
    }

    pub fn on_loaded(&mut self, result: Result<Vec<Product>, ClientError>) -> Action {
        self.loading = false;
        match result {
            Ok(products) => {
                self.rows = products
                    .iter()
                    .map(|p| serde_json::to_value(p).unwrap_or(Value::Null))
                    .collect();
                self.records = products;
                self.error = None;
            }
            Err(e) => self.error = Some(e.banner_message()),
        }
        Action::None
    }

    /// Mutation result: success closes the modal and re-fetches, a
    /// failure keeps the modal open for retry.
    pub fn on_mutation(&mut self, result: Result<(), ClientError>, ctx: &Ctx) -> Action {
        match result {
            Ok(()) => {
                self.modal = Modal::None;
                self.error = None;
                self.enter(ctx);
            }
            Err(e) => self.error = Some(e.banner_message()),
        }
        Action::None
    }

    fn selected(&self) -> Option<&Product> {
        self.display.selected().and_then(|i| self.records.get(i))
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        match &mut self.modal {
            Modal::None => self.on_list_key(key, ctx),
            Modal::Edit { .. } => self.on_edit_key(key, ctx),
            Modal::Stock { .. } => self.on_stock_key(key, ctx),
            Modal::ConfirmDelete { .. } => self.on_confirm_key(key, ctx),
        }
    }

    fn on_list_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        match key.code {
            KeyCode::Up => self.display.select_prev(self.rows.len()),
            KeyCode::Down => self.display.select_next(self.rows.len()),
            KeyCode::PageUp => self.display.scroll_json(-5),
            KeyCode::PageDown => self.display.scroll_json(5),
            KeyCode::Char('v') => self.display.toggle_view(),
            KeyCode::Char('r') => self.enter(ctx),
            KeyCode::Char('n') => {
                self.modal = Modal::Edit {
                    id: None,
                    form: product_form(None),
                };
            }
            KeyCode::Char('e') => {
                if let Some(product) = self.selected() {
                    self.modal = Modal::Edit {
                        id: Some(product.id.clone()),
                        form: product_form(Some(product)),
                    };
                }
            }
            KeyCode::Char('s') => {
                if let Some(product) = self.selected() {
                    self.modal = Modal::Stock {
                        id: product.id.clone(),
                        name: product.name.clone(),
                        form: stock_form(),
                    };
                }
            }
            KeyCode::Char('d') => {
                if let Some(product) = self.selected() {
                    self.modal = Modal::ConfirmDelete {
                        id: product.id.clone(),
                        name: product.name.clone(),
                    };
                }
            }
            _ => {}
        }
        Action::None
    }

    fn on_edit_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        let Modal::Edit { id, form } = &mut self.modal else {
            return Action::None;
        };
        match key.code {
            KeyCode::Esc => self.modal = Modal::None,
            KeyCode::Up => form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => form.focus_next(),
            KeyCode::Enter => {
                let id = id.clone();
                if let Some(msg) = submit_product(form, id, ctx) {
                    ctx.spawn(msg);
                }
            }
            _ => form.handle_key(key),
        }
        Action::None
    }

    fn on_stock_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        let Modal::Stock { id, form, .. } = &mut self.modal else {
            return Action::None;
        };
        match key.code {
            KeyCode::Esc => self.modal = Modal::None,
            KeyCode::Up => form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => form.focus_next(),
            KeyCode::Enter => {
                form.clear_errors();
                let Some(quantity) = parse_number::<i64>(form, "quantity") else {
                    return Action::None;
                };
                let operation = match form.value("operation").as_str() {
                    "subtract" => StockOperation::Subtract,
                    _ => StockOperation::Add,
                };
                let payload = StockAdjustment { quantity, operation };
                if let Err(errors) = payload.validate() {
                    form.apply_validation_errors(&errors);
                    return Action::None;
                }
                let api = ctx.api.clone();
                let id = id.clone();
                ctx.spawn(async move {
                    AppMsg::ProductMutationDone(
                        api.adjust_stock(&id, &payload).await.map(|_| ()),
                    )
                });
            }
            _ => form.handle_key(key),
        }
        Action::None
    }

    fn on_confirm_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        let Modal::ConfirmDelete { id, .. } = &self.modal else {
            return Action::None;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let api = ctx.api.clone();
                let id = id.clone();
                ctx.spawn(async move {
                    AppMsg::ProductMutationDone(api.delete_product(&id).await)
                });
            }
            KeyCode::Char('n') | KeyCode::Esc => self.modal = Modal::None,
            _ => {}
        }
        Action::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.display.render(
            frame,
            area,
            "Products",
            &self.rows,
            &self.columns,
            self.loading,
            self.error.as_deref(),
        );

        match &self.modal {
            Modal::None => {}
            Modal::Edit { id, form } => {
                let title = if id.is_some() { "Edit product" } else { "New product" };
                let dialog = centered_rect(area, 60, 70);
                form.render(frame, dialog, title);
            }
            Modal::Stock { name, form, .. } => {
                let dialog = centered_rect(area, 50, 30);
                form.render(frame, dialog, &format!("Adjust stock: {name}"));
            }
            Modal::ConfirmDelete { name, .. } => {
                let dialog = centered_rect(area, 50, 20);
                frame.render_widget(Clear, dialog);
                let block = Block::default().borders(Borders::ALL).title(" Delete product ");
                let inner = block.inner(dialog);
                frame.render_widget(block, dialog);
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(format!("Delete \"{name}\"?")),
                        Line::styled("y confirm · n cancel", Style::default().fg(Color::DarkGray)),
                    ])
                    .wrap(Wrap { trim: true }),
                    inner,
                );
            }
        }

        // Error banner overlays the bottom edge while a modal is open,
        // so a failed submit stays visible next to the form.
        if let (Some(error), false) = (self.error.as_deref(), matches!(self.modal, Modal::None)) {
            let [_, banner] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
            frame.render_widget(
                Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red)),
                banner,
            );
        }
    }
}

fn product_form(product: Option<&Product>) -> Form {
    let mut fields = Vec::new();
    // The code is immutable once assigned, so edits do not expose it.
    if product.is_none() {
        fields.push(FormField::text("code", "Code"));
    }
    let text = |key, label, value: Option<String>| match value {
        Some(v) => FormField::text_with(key, label, v),
        None => FormField::text(key, label),
    };
    fields.extend([
        text("name", "Name", product.map(|p| p.name.clone())),
        text(
            "description",
            "Description",
            product.and_then(|p| p.description.clone()),
        ),
        text("price", "Price", product.map(|p| p.price.to_string())),
        text("cost", "Cost", product.map(|p| p.cost.to_string())),
        text("stock", "Stock", product.map(|p| p.stock.to_string())),
        text("category", "Category", product.map(|p| p.category.clone())),
        text("supplier", "Supplier", product.and_then(|p| p.supplier.clone())),
        text(
            "discount",
            "Discount %",
            product.map(|p| p.discount.to_string()),
        ),
    ]);
    Form::new(fields)
}

fn stock_form() -> Form {
    Form::new(vec![
        FormField::text("quantity", "Quantity"),
        FormField::select(
            "operation",
            "Operation",
            vec!["add".to_string(), "subtract".to_string()],
            0,
        ),
    ])
}

type SubmitFuture = std::pin::Pin<Box<dyn Future<Output = AppMsg> + Send>>;

/// Validate the form and build the create/update request future.
/// Returns `None` when validation failed and errors are on the form.
fn submit_product(form: &mut Form, id: Option<String>, ctx: &Ctx) -> Option<SubmitFuture> {
    form.clear_errors();

    let price = parse_number::<f64>(form, "price");
    let cost = parse_number::<f64>(form, "cost");
    let stock = parse_number::<i64>(form, "stock");
    let discount = if form.value("discount").is_empty() {
        Some(0.0)
    } else {
        parse_number::<f64>(form, "discount")
    };
    let (Some(price), Some(cost), Some(stock), Some(discount)) = (price, cost, stock, discount)
    else {
        return None;
    };

    let api = ctx.api.clone();
    match id {
        None => {
            let payload = ProductCreate {
                code: form.value("code"),
                name: form.value("name"),
                description: form.optional_value("description"),
                price,
                cost,
                stock,
                category: form.value("category"),
                supplier: form.optional_value("supplier"),
                discount,
            };
            if let Err(errors) = payload.validate() {
                form.apply_validation_errors(&errors);
                return None;
            }
            Some(Box::pin(async move {
                AppMsg::ProductMutationDone(api.create_product(&payload).await.map(|_| ()))
            }))
        }
        Some(id) => {
            let payload = ProductUpdate {
                name: form.value("name"),
                description: form.optional_value("description"),
                price,
                cost,
                stock,
                category: form.value("category"),
                supplier: form.optional_value("supplier"),
                discount,
            };
            if let Err(errors) = payload.validate() {
                form.apply_validation_errors(&errors);
                return None;
            }
            Some(Box::pin(async move {
                AppMsg::ProductMutationDone(api.update_product(&id, &payload).await.map(|_| ()))
            }))
        }
    }
}
