//! Form state for modal dialogs
//!
//! A form is an ordered list of fields (text, masked text, or a
//! cycling select) with a focus index and per-field error messages.
//! Validation errors produced by `validator` are mapped back onto the
//! fields by key, so form keys must match the payload struct field
//! names.

use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::str::FromStr;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;
use validator::ValidationErrors;

enum FieldKind {
    Text(Input),
    Masked(Input),
    Select { options: Vec<String>, selected: usize },
}

/// One labeled form field
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    kind: FieldKind,
    pub error: Option<String>,
}

impl FormField {
    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text(Input::default()),
            error: None,
        }
    }

    pub fn text_with(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text(Input::default().with_value(value.into())),
            error: None,
        }
    }

    pub fn masked(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Masked(Input::default()),
            error: None,
        }
    }

    pub fn select(
        key: &'static str,
        label: &'static str,
        options: Vec<String>,
        selected: usize,
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Select { options, selected },
            error: None,
        }
    }

    /// Current value: trimmed text, or the selected option
    pub fn value(&self) -> String {
        match &self.kind {
            FieldKind::Text(input) | FieldKind::Masked(input) => input.value().trim().to_string(),
            FieldKind::Select { options, selected } => {
                options.get(*selected).cloned().unwrap_or_default()
            }
        }
    }

    fn display_value(&self) -> String {
        match &self.kind {
            FieldKind::Text(input) => input.value().to_string(),
            FieldKind::Masked(input) => "*".repeat(input.value().chars().count()),
            FieldKind::Select { options, selected } => {
                format!("< {} >", options.get(*selected).map(String::as_str).unwrap_or(""))
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.kind {
            FieldKind::Text(input) | FieldKind::Masked(input) => {
                input.handle_event(&Event::Key(key));
            }
            FieldKind::Select { options, selected } => match key.code {
                KeyCode::Left => {
                    *selected = selected.checked_sub(1).unwrap_or(options.len().saturating_sub(1));
                }
                KeyCode::Right | KeyCode::Char(' ') => {
                    *selected = (*selected + 1) % options.len().max(1);
                }
                _ => {}
            },
        }
    }
}

/// An ordered set of fields with one focused at a time
pub struct Form {
    fields: Vec<FormField>,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, key: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(FormField::value)
            .unwrap_or_default()
    }

    /// Optional value: empty text becomes `None`
    pub fn optional_value(&self, key: &str) -> Option<String> {
        let value = self.value(key);
        if value.is_empty() { None } else { Some(value) }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    /// Forward a key to the focused field
    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.handle_key(key);
        }
    }

    pub fn set_error(&mut self, key: &str, message: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.error = Some(message.into());
        }
    }

    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    /// Map `validator` output onto fields by key
    pub fn apply_validation_errors(&mut self, errors: &ValidationErrors) {
        for (name, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid {name}"));
                self.set_error(name.as_ref(), message);
            }
        }
    }

    /// Height needed to render all fields inside a bordered block
    pub fn height(&self) -> u16 {
        self.fields.len() as u16 + 2
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let block = Block::default().borders(Borders::ALL).title(format!(" {title} "));
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let label_width = self
            .fields
            .iter()
            .map(|f| f.label.len())
            .max()
            .unwrap_or(0);

        let lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let focused = i == self.focus;
                let marker = if focused { "> " } else { "  " };
                let label_style = if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let mut spans = vec![
                    Span::styled(marker, label_style),
                    Span::styled(format!("{:<label_width$} ", field.label), label_style),
                    Span::raw(field.display_value()),
                ];
                if let Some(error) = &field.error {
                    spans.push(Span::styled(
                        format!("  ({error})"),
                        Style::default().fg(Color::Red),
                    ));
                }
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Parse a numeric field, recording a field error on failure
pub fn parse_number<T: FromStr>(form: &mut Form, key: &'static str) -> Option<T> {
    match form.value(key).parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            form.set_error(key, "must be a number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ProductCreate;
    use validator::Validate;

    fn sample_form() -> Form {
        Form::new(vec![
            FormField::text("code", "Code"),
            FormField::text("name", "Name"),
            FormField::text("stock", "Stock"),
            FormField::select(
                "role",
                "Role",
                vec!["admin".to_string(), "employee".to_string()],
                0,
            ),
        ])
    }

    #[test]
    fn validation_errors_map_back_to_fields() {
        let payload = ProductCreate {
            code: "P-1".to_string(),
            name: "Rice".to_string(),
            price: 10.0,
            cost: 5.0,
            stock: -1,
            category: "Grains".to_string(),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();

        let mut form = sample_form();
        form.apply_validation_errors(&errors);
        assert!(form.has_errors());
        assert!(
            form.fields
                .iter()
                .find(|f| f.key == "stock")
                .unwrap()
                .error
                .is_some()
        );
    }

    #[test]
    fn parse_number_sets_an_error_on_garbage() {
        let mut form = sample_form();
        assert_eq!(parse_number::<i64>(&mut form, "stock"), None);
        assert!(form.has_errors());
    }

    #[test]
    fn select_cycles_through_options() {
        let mut form = sample_form();
        assert_eq!(form.value("role"), "admin");
        let field = form.fields.iter_mut().find(|f| f.key == "role").unwrap();
        field.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(field.value(), "employee");
        field.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(field.value(), "admin");
    }
}
