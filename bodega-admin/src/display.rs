//! Generic data display widget
//!
//! Renders an arbitrary list of records as either a table or a raw
//! JSON dump, driven by an externally supplied column specification.
//! Pure renderer: the only state it keeps is the view mode and the
//! table selection. No pagination, sorting or filtering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use serde_json::Value;

/// Custom cell renderer; receives the whole record
pub type CellRenderer = fn(&Value) -> String;

/// Dot-path accessor into a JSON record (e.g. `customer.name`).
/// Resolution of a missing or null segment yields nothing, never an
/// error.
#[derive(Debug, Clone)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            current = current.get(segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }
}

/// Stringify a resolved value for a table cell
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One column of the table view
pub struct ColumnSpec {
    pub header: &'static str,
    pub field: FieldPath,
    pub renderer: Option<CellRenderer>,
    pub width: Constraint,
}

impl ColumnSpec {
    pub fn new(header: &'static str, field: &str) -> Self {
        Self {
            header,
            field: FieldPath::parse(field),
            renderer: None,
            width: Constraint::Fill(1),
        }
    }

    pub fn with_renderer(mut self, renderer: CellRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Constraint::Length(width);
        self
    }

    /// Resolve the cell text for a record: a custom renderer wins,
    /// otherwise the dot-path lookup (empty string on any miss).
    pub fn cell_text(&self, record: &Value) -> String {
        match self.renderer {
            Some(renderer) => renderer(record),
            None => self
                .field
                .resolve(record)
                .map(value_to_string)
                .unwrap_or_default(),
        }
    }
}

/// View mode of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Json,
}

/// Stateful part of the data display: view mode and row selection.
/// Switching modes never refetches; the caller owns the records.
#[derive(Debug, Default)]
pub struct DataDisplay {
    pub view: ViewMode,
    pub table: TableState,
    json_scroll: u16,
}

impl DataDisplay {
    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ViewMode::Table => ViewMode::Json,
            ViewMode::Json => ViewMode::Table,
        };
    }

    pub fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.table.select(None);
            return;
        }
        let next = match self.table.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table.select(Some(next));
    }

    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            self.table.select(None);
            return;
        }
        let prev = self.table.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.table.select(Some(prev));
    }

    pub fn scroll_json(&mut self, delta: i16) {
        self.json_scroll = self.json_scroll.saturating_add_signed(delta);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        records: &[Value],
        columns: &[ColumnSpec],
        loading: bool,
        error: Option<&str>,
    ) {
        let mode = match self.view {
            ViewMode::Table => "table",
            ViewMode::Json => "json",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} [{mode}] "));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(error) = error {
            let banner = Paragraph::new(Line::from(error.to_string()))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(banner, inner);
            return;
        }

        if loading {
            frame.render_widget(Paragraph::new("Loading..."), inner);
            return;
        }

        if records.is_empty() {
            frame.render_widget(
                Paragraph::new("No data available").style(Style::default().fg(Color::DarkGray)),
                inner,
            );
            return;
        }

        match self.view {
            ViewMode::Table => {
                let header = Row::new(
                    columns
                        .iter()
                        .map(|c| Cell::from(c.header))
                        .collect::<Vec<_>>(),
                )
                .style(Style::default().add_modifier(Modifier::BOLD));

                let rows = records.iter().map(|record| {
                    Row::new(
                        columns
                            .iter()
                            .map(|c| Cell::from(c.cell_text(record)))
                            .collect::<Vec<_>>(),
                    )
                });

                let widths: Vec<Constraint> = columns.iter().map(|c| c.width).collect();
                let table = Table::new(rows, widths)
                    .header(header)
                    .row_highlight_style(
                        Style::default()
                            .bg(Color::Blue)
                            .add_modifier(Modifier::BOLD),
                    );
                frame.render_stateful_widget(table, inner, &mut self.table);
            }
            ViewMode::Json => {
                let raw = serde_json::to_string_pretty(records).unwrap_or_default();
                let dump = Paragraph::new(raw).scroll((self.json_scroll, 0));
                frame.render_widget(dump, inner);
            }
        }
    }
}

/// Centered sub-rectangle used for modal overlays
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    // u32 intermediates: width * percent can exceed u16
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dot_path_resolves_nested_fields() {
        let record = json!({ "customer": { "name": "Ana" } });
        let path = FieldPath::parse("customer.name");
        assert_eq!(path.resolve(&record).map(value_to_string).unwrap(), "Ana");
    }

    #[test]
    fn missing_intermediate_segment_yields_empty_string() {
        let record = json!({ "id": "s1" });
        let col = ColumnSpec::new("Customer", "customer.name");
        assert_eq!(col.cell_text(&record), "");

        // Deeper misses never panic either
        let col = ColumnSpec::new("X", "a.b.c.d");
        assert_eq!(col.cell_text(&record), "");
    }

    #[test]
    fn null_segment_yields_empty_string() {
        let record = json!({ "customer": null });
        let col = ColumnSpec::new("Customer", "customer.name");
        assert_eq!(col.cell_text(&record), "");

        let col = ColumnSpec::new("Customer", "customer");
        assert_eq!(col.cell_text(&record), "");
    }

    #[test]
    fn non_string_values_are_stringified() {
        let record = json!({ "stock": 12, "discount": 2.5 });
        assert_eq!(ColumnSpec::new("Stock", "stock").cell_text(&record), "12");
        assert_eq!(ColumnSpec::new("D", "discount").cell_text(&record), "2.5");
    }

    #[test]
    fn custom_renderer_wins_over_path_lookup() {
        let record = json!({ "price": 45.0 });
        let col = ColumnSpec::new("Price", "price")
            .with_renderer(|r| format!("${:.2}", r["price"].as_f64().unwrap_or_default()));
        assert_eq!(col.cell_text(&record), "$45.00");
    }

    #[test]
    fn toggling_view_mode_is_a_pure_state_flip() {
        let mut display = DataDisplay::default();
        assert_eq!(display.view, ViewMode::Table);
        display.toggle_view();
        assert_eq!(display.view, ViewMode::Json);
        display.toggle_view();
        assert_eq!(display.view, ViewMode::Table);
    }

    #[test]
    fn centered_rect_survives_very_wide_areas() {
        let area = Rect::new(0, 0, u16::MAX, u16::MAX);
        let dialog = centered_rect(area, 60, 60);
        assert!(dialog.width <= area.width);
        assert!(dialog.height <= area.height);
        assert!(dialog.x + dialog.width <= area.width);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut display = DataDisplay::default();
        display.select_next(2);
        display.select_next(2);
        display.select_next(2);
        assert_eq!(display.selected(), Some(1));
        display.select_prev(2);
        display.select_prev(2);
        assert_eq!(display.selected(), Some(0));
        display.select_next(0);
        assert_eq!(display.selected(), None);
    }
}
