//! Dashboard: sales statistics cards, best sellers and low-stock
//! products. Two fetches on entry, nothing else.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::Value;

use bodega_client::ClientError;
use shared::models::{Product, SalesStats};

use crate::app::{Action, AppMsg, Ctx};
use crate::display::{ColumnSpec, DataDisplay};

/// Products at or below this stock level count as low stock
const LOW_STOCK_THRESHOLD: i64 = 10;

fn money(record: &Value, field: &str) -> String {
    format!("${:.2}", record[field].as_f64().unwrap_or_default())
}

fn total_sold_cell(record: &Value) -> String {
    money(record, "totalSold")
}

fn price_cell(record: &Value) -> String {
    money(record, "price")
}

pub struct DashboardPage {
    stats: Option<SalesStats>,
    top_rows: Vec<Value>,
    low_rows: Vec<Value>,
    pending: u8,
    error: Option<String>,
    top_display: DataDisplay,
    low_display: DataDisplay,
    top_cols: Vec<ColumnSpec>,
    low_cols: Vec<ColumnSpec>,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self {
            stats: None,
            top_rows: Vec::new(),
            low_rows: Vec::new(),
            pending: 0,
            error: None,
            top_display: DataDisplay::default(),
            low_display: DataDisplay::default(),
            top_cols: vec![
                ColumnSpec::new("Product", "productName"),
                ColumnSpec::new("Units sold", "quantity").with_width(12),
                ColumnSpec::new("Amount", "totalSold")
                    .with_renderer(total_sold_cell)
                    .with_width(12),
            ],
            low_cols: vec![
                ColumnSpec::new("Product", "name"),
                ColumnSpec::new("Code", "code").with_width(10),
                ColumnSpec::new("Category", "category"),
                ColumnSpec::new("Stock", "stock").with_width(7),
                ColumnSpec::new("Price", "price")
                    .with_renderer(price_cell)
                    .with_width(10),
            ],
        }
    }

    pub fn enter(&mut self, ctx: &Ctx) {
        self.pending = 2;
        self.error = None;

        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::StatsLoaded(api.sales_stats().await) });

        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::DashboardProductsLoaded(api.products().await) });
    }

    pub fn on_stats(&mut self, result: Result<SalesStats, ClientError>) -> Action {
        self.pending = self.pending.saturating_sub(1);
        match result {
            Ok(stats) => {
                self.top_rows = stats
                    .top_products
                    .iter()
                    .map(|p| serde_json::to_value(p).unwrap_or(Value::Null))
                    .collect();
                self.stats = Some(stats);
            }
            Err(e) => self.error = Some(e.banner_message()),
        }
        Action::None
    }

    pub fn on_products(&mut self, result: Result<Vec<Product>, ClientError>) -> Action {
        self.pending = self.pending.saturating_sub(1);
        match result {
            Ok(products) => {
                let mut low: Vec<&Product> = products
                    .iter()
                    .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
                    .collect();
                low.sort_by_key(|p| p.stock);
                self.low_rows = low
                    .into_iter()
                    .map(|p| serde_json::to_value(p).unwrap_or(Value::Null))
                    .collect();
            }
            Err(e) => self.error = Some(e.banner_message()),
        }
        Action::None
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        match key.code {
            KeyCode::Char('v') => {
                self.top_display.toggle_view();
                self.low_display.toggle_view();
            }
            KeyCode::Char('r') => self.enter(ctx),
            KeyCode::Up => self.low_display.select_prev(self.low_rows.len()),
            KeyCode::Down => self.low_display.select_next(self.low_rows.len()),
            _ => {}
        }
        Action::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [cards_area, top_area, low_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        self.render_cards(frame, cards_area);

        let loading = self.pending > 0;
        let error = self.error.as_deref();
        self.top_display.render(
            frame,
            top_area,
            "Best sellers",
            &self.top_rows,
            &self.top_cols,
            loading,
            error,
        );
        self.low_display.render(
            frame,
            low_area,
            "Low stock",
            &self.low_rows,
            &self.low_cols,
            loading,
            error,
        );
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect) {
        let summary = self.stats.as_ref().map(|s| &s.summary);
        let cards = [
            (
                "Total sales",
                summary.map(|s| s.total_sales.to_string()).unwrap_or_default(),
                Color::Cyan,
            ),
            (
                "Revenue",
                summary
                    .map(|s| format!("${:.2}", s.total_revenue))
                    .unwrap_or_default(),
                Color::Green,
            ),
            (
                "Average sale",
                summary
                    .map(|s| format!("${:.2}", s.average_sale_amount))
                    .unwrap_or_default(),
                Color::Blue,
            ),
            (
                "Low stock items",
                self.low_rows.len().to_string(),
                if self.low_rows.is_empty() {
                    Color::Green
                } else {
                    Color::Yellow
                },
            ),
        ];

        let areas = Layout::horizontal([Constraint::Fill(1); 4]).split(area);
        for ((title, value, color), card_area) in cards.into_iter().zip(areas.iter()) {
            let block = Block::default().borders(Borders::ALL).title(title);
            let inner = block.inner(*card_area);
            frame.render_widget(block, *card_area);
            frame.render_widget(
                Paragraph::new(value).style(
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                inner,
            );
        }
    }
}
