//! Sales history: listing, payment settlement and cancellation.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::Value;

use bodega_client::ClientError;
use shared::models::{PaymentStatus, Sale};

use crate::app::{Action, AppMsg, Ctx, Route};
use crate::display::{ColumnSpec, DataDisplay, centered_rect};
use crate::forms::{Form, FormField};

fn date_cell(record: &Value) -> String {
    // "2026-08-12T09:30:00Z" -> "2026-08-12 09:30"
    let raw = record["date"].as_str().unwrap_or_default();
    match (raw.get(..10), raw.get(11..16)) {
        (Some(day), Some(time)) => format!("{day} {time}"),
        _ => raw.to_string(),
    }
}

fn amount_cell(record: &Value) -> String {
    format!("${:.2}", record["totalAmount"].as_f64().unwrap_or_default())
}

enum Modal {
    None,
    ConfirmCancel { id: String, form: Form },
}

pub struct SalesPage {
    records: Vec<Sale>,
    rows: Vec<Value>,
    loading: bool,
    error: Option<String>,
    display: DataDisplay,
    columns: Vec<ColumnSpec>,
    modal: Modal,
}

impl SalesPage {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            rows: Vec::new(),
            loading: false,
            error: None,
            display: DataDisplay::default(),
            columns: vec![
                ColumnSpec::new("Sale", "id").with_width(12),
                ColumnSpec::new("Date", "date")
                    .with_renderer(date_cell)
                    .with_width(17),
                ColumnSpec::new("Customer", "customer.name"),
                ColumnSpec::new("Total", "totalAmount")
                    .with_renderer(amount_cell)
                    .with_width(11),
                ColumnSpec::new("Payment", "paymentStatus").with_width(9),
                ColumnSpec::new("Status", "status").with_width(11),
            ],
            modal: Modal::None,
        }
    }

    pub fn enter(&mut self, ctx: &Ctx) {
        self.loading = true;
        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::SalesLoaded(api.sales().await) });
    }

    pub fn on_loaded(&mut self, result: Result<Vec<Sale>, ClientError>) -> Action {
        self.loading = false;
        match result {
            Ok(sales) => {
                self.rows = sales
                    .iter()
                    .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
                    .collect();
                self.records = sales;
                self.error = None;
            }
            Err(e) => self.error = Some(e.banner_message()),
        }
        Action::None
    }

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

    fn selected(&self) -> Option<&Sale> {
        self.display.selected().and_then(|i| self.records.get(i))
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        if let Modal::ConfirmCancel { id, form } = &mut self.modal {
            match key.code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Enter => {
                    let api = ctx.api.clone();
                    let id = id.clone();
                    let reason = form.optional_value("reason");
                    ctx.spawn(async move {
                        AppMsg::SaleMutationDone(api.cancel_sale(&id, reason).await.map(|_| ()))
                    });
                }
                _ => form.handle_key(key),
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Up => self.display.select_prev(self.rows.len()),
            KeyCode::Down => self.display.select_next(self.rows.len()),
            KeyCode::PageUp => self.display.scroll_json(-5),
            KeyCode::PageDown => self.display.scroll_json(5),
            KeyCode::Char('v') => self.display.toggle_view(),
            KeyCode::Char('r') => self.enter(ctx),
            KeyCode::Char('n') => return Action::Navigate(Route::NewSale),
            KeyCode::Char('p') => {
                if let Some(sale) = self.selected() {
                    let api = ctx.api.clone();
                    let id = sale.id.clone();
                    ctx.spawn(async move {
                        AppMsg::SaleMutationDone(
                            api.update_payment_status(&id, PaymentStatus::Paid)
                                .await
                                .map(|_| ()),
                        )
                    });
                }
            }
            KeyCode::Char('c') => {
                if let Some(sale) = self.selected() {
                    self.modal = Modal::ConfirmCancel {
                        id: sale.id.clone(),
                        form: Form::new(vec![FormField::text("reason", "Reason (optional)")]),
                    };
                }
            }
            _ => {}
        }
        Action::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.display.render(
            frame,
            area,
            "Sales",
            &self.rows,
            &self.columns,
            self.loading,
            self.error.as_deref(),
        );

        if let Modal::ConfirmCancel { form, .. } = &self.modal {
            let dialog = centered_rect(area, 50, 25);
            form.render(frame, dialog, "Cancel sale (Enter confirms)");
        }
    }
}
