//! Login page: bearer-token login via username/password, or direct
//! API-key entry. Field errors surface before any network call; server
//! rejections land in the banner.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use bodega_client::{ClientError, LoginRequest, LoginResponse};
use validator::ValidateEmail;

use crate::app::{Action, AppMsg, Ctx};
use crate::display::centered_rect;
use crate::forms::{Form, FormField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoginTab {
    #[default]
    Token,
    ApiKey,
}

pub struct LoginPage {
    tab: LoginTab,
    token_form: Form,
    key_form: Form,
    banner: Option<String>,
    submitting: bool,
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            tab: LoginTab::Token,
            token_form: Form::new(vec![
                FormField::select(
                    "credential",
                    "Sign in with",
                    vec!["username".to_string(), "email".to_string()],
                    0,
                ),
                FormField::text("username", "Username"),
                FormField::text("email", "Email"),
                FormField::masked("password", "Password"),
            ]),
            key_form: Form::new(vec![FormField::text("api_key", "API key")]),
            banner: None,
            submitting: false,
        }
    }

    pub fn set_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    pub fn on_key(&mut self, key: KeyEvent, ctx: &Ctx) -> Action {
        match key.code {
            KeyCode::Tab => {
                self.tab = match self.tab {
                    LoginTab::Token => LoginTab::ApiKey,
                    LoginTab::ApiKey => LoginTab::Token,
                };
                Action::None
            }
            KeyCode::Esc => {
                self.banner = None;
                Action::None
            }
            KeyCode::Up => {
                self.active_form_mut().focus_prev();
                Action::None
            }
            KeyCode::Down => {
                self.active_form_mut().focus_next();
                Action::None
            }
            KeyCode::Enter => self.submit(ctx),
            _ => {
                self.active_form_mut().handle_key(key);
                Action::None
            }
        }
    }

    fn active_form_mut(&mut self) -> &mut Form {
        match self.tab {
            LoginTab::Token => &mut self.token_form,
            LoginTab::ApiKey => &mut self.key_form,
        }
    }

    fn submit(&mut self, ctx: &Ctx) -> Action {
        if self.submitting {
            return Action::None;
        }
        self.banner = None;
        match self.tab {
            LoginTab::Token => {
                self.token_form.clear_errors();
                let use_email = self.token_form.value("credential") == "email";
                let username = self.token_form.value("username");
                let email = self.token_form.value("email");
                let password = self.token_form.value("password");
                // Only the selected identifier is required and sent
                if use_email {
                    if email.is_empty() {
                        self.token_form.set_error("email", "email is required");
                    } else if !email.validate_email() {
                        self.token_form.set_error("email", "invalid email");
                    }
                } else if username.is_empty() {
                    self.token_form.set_error("username", "username is required");
                }
                if password.is_empty() {
                    self.token_form.set_error("password", "password is required");
                }
                if self.token_form.has_errors() {
                    return Action::None;
                }
                let request = if use_email {
                    LoginRequest::with_email(email, password)
                } else {
                    LoginRequest::with_username(username, password)
                };
                self.submitting = true;
                let api = ctx.api.clone();
                ctx.spawn(async move { AppMsg::LoginDone(api.login(&request).await) });
                Action::None
            }
            LoginTab::ApiKey => {
                self.key_form.clear_errors();
                let key = self.key_form.value("api_key");
                if key.is_empty() {
                    self.key_form.set_error("api_key", "API key is required");
                    return Action::None;
                }
                Action::LoginApiKey(key)
            }
        }
    }

    pub fn on_login_done(&mut self, result: Result<LoginResponse, ClientError>) -> Action {
        self.submitting = false;
        match result {
            Ok(response) => Action::LoginToken(Box::new(response)),
            Err(error) => {
                let message = match error {
                    ClientError::Unauthorized => "Invalid credentials".to_string(),
                    ClientError::Validation(m) | ClientError::Server(m) => m,
                    other => other.banner_message(),
                };
                self.banner = Some(message);
                Action::None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let dialog = centered_rect(area, 50, 60);
        let form = match self.tab {
            LoginTab::Token => &self.token_form,
            LoginTab::ApiKey => &self.key_form,
        };
        let [tabs_area, form_area, banner_area, hint_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(form.height()),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(dialog);

        let tab_style = |active: bool| {
            if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let tabs = Line::from(vec![
            Span::styled("[ Token login ]", tab_style(self.tab == LoginTab::Token)),
            Span::raw("  "),
            Span::styled("[ API key ]", tab_style(self.tab == LoginTab::ApiKey)),
        ]);
        frame.render_widget(Paragraph::new(tabs), tabs_area);

        form.render(frame, form_area, "Sign in");

        if let Some(banner) = &self.banner {
            frame.render_widget(
                Paragraph::new(banner.clone()).style(Style::default().fg(Color::Red)),
                banner_area,
            );
        } else if self.submitting {
            frame.render_widget(
                Paragraph::new("Signing in...").style(Style::default().fg(Color::DarkGray)),
                banner_area,
            );
        }

        let hint = match self.tab {
            LoginTab::Token => "The server issues a bearer token for this session.",
            LoginTab::ApiKey => "The key is sent as x-api-key on every request.",
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            hint_area,
        );
    }
}
