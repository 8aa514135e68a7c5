//! User administration. The route guard keeps non-admins out; this
//! page assumes the caller already checked.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde_json::Value;

use bodega_client::ClientError;
use shared::models::{Role, User, UserCreate, UserPasswordUpdate, UserUpdate};
use validator::Validate;

use crate::app::{Action, AppMsg, Ctx};
use crate::display::{ColumnSpec, DataDisplay, centered_rect};
use crate::forms::{Form, FormField};

fn active_cell(record: &Value) -> String {
    match record["active"].as_bool() {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => String::new(),
    }
}

enum Modal {
    None,
    Edit { id: Option<String>, form: Form },
    Password { user: User, form: Form },
    ConfirmDelete(User),
}

pub struct UsersPage {
    records: Vec<User>,
    rows: Vec<Value>,
    loading: bool,
    error: Option<String>,
    display: DataDisplay,
    columns: Vec<ColumnSpec>,
    modal: Modal,
}

impl UsersPage {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            rows: Vec::new(),
            loading: false,
            error: None,
            display: DataDisplay::default(),
            columns: vec![
                ColumnSpec::new("Username", "username").with_width(14),
                ColumnSpec::new("First name", "firstName"),
                ColumnSpec::new("Last name", "lastName"),
                ColumnSpec::new("Email", "email"),
                ColumnSpec::new("Role", "role").with_width(10),
                ColumnSpec::new("Active", "active")
                    .with_renderer(active_cell)
                    .with_width(8),
            ],
            modal: Modal::None,
        }
    }

    pub fn enter(&mut self, ctx: &Ctx) {
        self.loading = true;
        let api = ctx.api.clone();
        ctx.spawn(async move { AppMsg::UsersLoaded(api.users().await) });
    }

    pub fn on_loaded(&mut self, result: Result<Vec<User>, ClientError>) -> Action {
        self.loading = false;
        match result {
            Ok(users) => {
                self.rows = users
                    .iter()
                    .map(|u| serde_json::to_value(u).unwrap_or(Value::Null))
                    .collect();
                self.records = users;
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

    fn selected(&self) -> Option<&User> {
        self.display.selected().and_then(|i| self.records.get(i))
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        match &mut self.modal {
            Modal::None => self.on_list_key(key, ctx),
            Modal::Edit { .. } => self.on_edit_key(key, ctx),
            Modal::Password { .. } => self.on_password_key(key, ctx),
            Modal::ConfirmDelete(_) => self.on_confirm_key(key, ctx),
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
                    form: user_form(None),
                };
            }
            KeyCode::Char('e') => {
                if let Some(user) = self.selected() {
                    self.modal = Modal::Edit {
                        id: Some(user.id.clone()),
                        form: user_form(Some(user)),
                    };
                }
            }
            KeyCode::Char('p') => {
                if let Some(user) = self.selected() {
                    self.modal = Modal::Password {
                        user: user.clone(),
                        form: Form::new(vec![
                            FormField::masked("password", "New password"),
                            FormField::masked("confirm", "Confirm"),
                        ]),
                    };
                }
            }
            KeyCode::Char('t') => {
                if let Some(user) = self.selected() {
                    let api = ctx.api.clone();
                    let id = user.id.clone();
                    let active = !user.active;
                    ctx.spawn(async move {
                        AppMsg::UserMutationDone(
                            api.update_user_status(&id, active).await.map(|_| ()),
                        )
                    });
                }
            }
            KeyCode::Char('d') => {
                if let Some(user) = self.selected() {
                    self.modal = Modal::ConfirmDelete(user.clone());
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
            KeyCode::Enter => submit_user(form, id.clone(), ctx),
            _ => form.handle_key(key),
        }
        Action::None
    }

    fn on_password_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        let Modal::Password { user, form } = &mut self.modal else {
            return Action::None;
        };
        match key.code {
            KeyCode::Esc => self.modal = Modal::None,
            KeyCode::Up => form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => form.focus_next(),
            KeyCode::Enter => {
                form.clear_errors();
                let password = form.value("password");
                if form.value("confirm") != password {
                    form.set_error("confirm", "passwords do not match");
                    return Action::None;
                }
                // Only the password travels; the rest of the record is
                // left to whatever the server currently holds.
                let payload = UserPasswordUpdate { password };
                if let Err(errors) = payload.validate() {
                    form.apply_validation_errors(&errors);
                    return Action::None;
                }
                let api = ctx.api.clone();
                let id = user.id.clone();
                ctx.spawn(async move {
                    AppMsg::UserMutationDone(api.change_password(&id, &payload).await.map(|_| ()))
                });
            }
            _ => form.handle_key(key),
        }
        Action::None
    }

    fn on_confirm_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        let Modal::ConfirmDelete(user) = &self.modal else {
            return Action::None;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let api = ctx.api.clone();
                let id = user.id.clone();
                ctx.spawn(async move { AppMsg::UserMutationDone(api.delete_user(&id).await) });
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
            "Users",
            &self.rows,
            &self.columns,
            self.loading,
            self.error.as_deref(),
        );

        match &self.modal {
            Modal::None => {}
            Modal::Edit { id, form } => {
                let title = if id.is_some() { "Edit user" } else { "New user" };
                form.render(frame, centered_rect(area, 60, 70), title);
            }
            Modal::Password { user, form } => {
                form.render(
                    frame,
                    centered_rect(area, 50, 30),
                    &format!("Change password: {}", user.username),
                );
            }
            Modal::ConfirmDelete(user) => {
                let dialog = centered_rect(area, 50, 20);
                frame.render_widget(Clear, dialog);
                let block = Block::default().borders(Borders::ALL).title(" Delete user ");
                let inner = block.inner(dialog);
                frame.render_widget(block, dialog);
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(format!("Delete \"{}\"?", user.username)),
                        Line::styled("y confirm · n cancel", Style::default().fg(Color::DarkGray)),
                    ])
                    .wrap(Wrap { trim: true }),
                    inner,
                );
            }
        }
    }
}

fn user_form(user: Option<&User>) -> Form {
    let mut fields = Vec::new();
    if user.is_none() {
        fields.push(FormField::text("username", "Username"));
        fields.push(FormField::masked("password", "Password"));
    }
    let text = |key, label, value: Option<String>| match value {
        Some(v) => FormField::text_with(key, label, v),
        None => FormField::text(key, label),
    };
    let role_index = user
        .map(|u| Role::ALL.iter().position(|r| *r == u.role).unwrap_or(2))
        .unwrap_or(2);
    let active_index = match user {
        Some(User { active: false, .. }) => 1,
        _ => 0,
    };
    fields.extend([
        text("first_name", "First name", user.map(|u| u.first_name.clone())),
        text("last_name", "Last name", user.map(|u| u.last_name.clone())),
        text("email", "Email", user.map(|u| u.email.clone())),
        FormField::select(
            "role",
            "Role",
            Role::ALL.iter().map(|r| r.label().to_string()).collect(),
            role_index,
        ),
        FormField::select(
            "active",
            "Status",
            vec!["active".to_string(), "inactive".to_string()],
            active_index,
        ),
    ]);
    Form::new(fields)
}

fn submit_user(form: &mut Form, id: Option<String>, ctx: &Ctx) {
    form.clear_errors();
    let role = Role::ALL
        .into_iter()
        .find(|r| r.label() == form.value("role"))
        .unwrap_or_default();
    let active = form.value("active") == "active";
    let api = ctx.api.clone();

    match id {
        None => {
            let payload = UserCreate {
                username: form.value("username"),
                password: form.value("password"),
                first_name: form.value("first_name"),
                last_name: form.value("last_name"),
                email: form.value("email"),
                role,
                active,
            };
            if let Err(errors) = payload.validate() {
                form.apply_validation_errors(&errors);
                return;
            }
            ctx.spawn(async move {
                AppMsg::UserMutationDone(api.create_user(&payload).await.map(|_| ()))
            });
        }
        Some(id) => {
            let payload = UserUpdate {
                first_name: form.value("first_name"),
                last_name: form.value("last_name"),
                email: form.value("email"),
                role,
                active,
                password: None,
            };
            if let Err(errors) = payload.validate() {
                form.apply_validation_errors(&errors);
                return;
            }
            ctx.spawn(async move {
                AppMsg::UserMutationDone(api.update_user(&id, &payload).await.map(|_| ()))
            });
        }
    }
}
