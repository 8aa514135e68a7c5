//! Application shell: routing, session wiring and the event loop glue
//!
//! The UI runs a single cooperative loop; network calls are spawned
//! tokio tasks that report back as [`AppMsg`] values over an unbounded
//! channel. In-flight requests are never cancelled and repeated
//! submissions are not debounced.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tui_logger::{TuiLoggerWidget, TuiWidgetState};

use bodega_client::{
    ApiClient, AuthState, ClientError, CredentialStore, LoginResponse, Session, SessionStore,
    UserInfo,
};
use shared::models::{Product, Sale, SalesStats, User};

use crate::pages::{
    DashboardPage, LoginPage, NewSalePage, ProductsPage, SalesPage, UsersPage,
};

/// Navigable views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Products,
    Sales,
    NewSale,
    Users,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Products => "Products",
            Route::Sales => "Sales",
            Route::NewSale => "New Sale",
            Route::Users => "Users",
        }
    }
}

/// Results delivered back to the UI loop from spawned tasks
pub enum AppMsg {
    RestoreDone(Option<Session>),
    LoginDone(Result<LoginResponse, ClientError>),
    StatsLoaded(Result<SalesStats, ClientError>),
    DashboardProductsLoaded(Result<Vec<Product>, ClientError>),
    ProductsLoaded(Result<Vec<Product>, ClientError>),
    ProductMutationDone(Result<(), ClientError>),
    SalesLoaded(Result<Vec<Sale>, ClientError>),
    SaleMutationDone(Result<(), ClientError>),
    PickerLoaded(Result<Vec<Product>, ClientError>),
    SaleCreated(Result<Sale, ClientError>),
    UsersLoaded(Result<Vec<User>, ClientError>),
    UserMutationDone(Result<(), ClientError>),
}

/// What a page asks the shell to do after handling an event
pub enum Action {
    None,
    Navigate(Route),
    LoginToken(Box<LoginResponse>),
    LoginApiKey(String),
    Logout,
}

/// Handles shared by every page for issuing requests
#[derive(Clone)]
pub struct Ctx {
    pub api: ApiClient,
    pub storage: Arc<CredentialStore>,
    pub tx: UnboundedSender<AppMsg>,
}

impl Ctx {
    /// Run a future to completion on the runtime and deliver its
    /// message back to the UI loop.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppMsg> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }
}

/// Route guard. Anonymous sessions only see the login view; the users
/// page needs the admin role; everything else just needs a session.
/// While the startup restore is pending nothing is resolved yet.
pub fn resolve_route(requested: Route, state: &AuthState) -> Route {
    match state {
        AuthState::Pending => requested,
        AuthState::Anonymous => Route::Login,
        AuthState::Authenticated(session) => match requested {
            Route::Login => Route::Dashboard,
            Route::Users if session.user.role != "admin" => Route::Dashboard,
            other => other,
        },
    }
}

pub struct App {
    pub route: Route,
    session: SessionStore,
    ctx: Ctx,
    login: LoginPage,
    dashboard: DashboardPage,
    products: ProductsPage,
    sales: SalesPage,
    new_sale: NewSalePage,
    users: UsersPage,
    show_log: bool,
    logger_state: TuiWidgetState,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: SessionStore, ctx: Ctx) -> Self {
        Self {
            route: Route::Login,
            session,
            ctx,
            login: LoginPage::new(),
            dashboard: DashboardPage::new(),
            products: ProductsPage::new(),
            sales: SalesPage::new(),
            new_sale: NewSalePage::new(),
            users: UsersPage::new(),
            show_log: false,
            logger_state: TuiWidgetState::new(),
            should_quit: false,
        }
    }

    /// Kick off the one-shot startup session restore
    pub fn start(&self) {
        let api = self.ctx.api.clone();
        let storage = self.ctx.storage.clone();
        self.ctx.spawn(async move {
            AppMsg::RestoreDone(SessionStore::probe_stored(&storage, &api).await)
        });
    }

    pub fn navigate(&mut self, requested: Route) {
        let resolved = resolve_route(requested, self.session.state());
        self.route = resolved;
        match resolved {
            Route::Login => {}
            Route::Dashboard => self.dashboard.enter(&self.ctx),
            Route::Products => self.products.enter(&self.ctx),
            Route::Sales => self.sales.enter(&self.ctx),
            Route::NewSale => self.new_sale.enter(&self.ctx),
            Route::Users => self.users.enter(&self.ctx),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Global bindings first
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::F(12) {
            self.show_log = !self.show_log;
            return;
        }

        // Until the startup restore resolves, nothing may navigate or
        // spawn page fetches.
        if matches!(self.session.state(), AuthState::Pending) {
            return;
        }

        match key.code {
            KeyCode::F(1) => return self.navigate(Route::Dashboard),
            KeyCode::F(2) => return self.navigate(Route::Products),
            KeyCode::F(3) => return self.navigate(Route::Sales),
            KeyCode::F(4) => return self.navigate(Route::NewSale),
            KeyCode::F(5) => return self.navigate(Route::Users),
            KeyCode::F(10) => return self.apply(Action::Logout),
            _ => {}
        }

        let action = match self.route {
            Route::Login => self.login.on_key(key, &self.ctx),
            Route::Dashboard => self.dashboard.on_key(key, &self.ctx),
            Route::Products => self.products.on_key(key, &self.ctx),
            Route::Sales => self.sales.on_key(key, &self.ctx),
            Route::NewSale => self.new_sale.on_key(key, &self.ctx),
            Route::Users => self.users.on_key(key, &self.ctx),
        };
        self.apply(action);
    }

    pub fn on_msg(&mut self, msg: AppMsg) {
        let action = match msg {
            AppMsg::RestoreDone(restored) => {
                if let Err(e) = self.session.finish_restore(restored) {
                    tracing::error!(error = %e, "Failed to finish session restore");
                }
                if self.session.state().is_authenticated() {
                    self.navigate(Route::Dashboard);
                } else {
                    self.navigate(Route::Login);
                }
                Action::None
            }
            AppMsg::LoginDone(result) => self.login.on_login_done(result),
            AppMsg::StatsLoaded(result) => self.dashboard.on_stats(result),
            AppMsg::DashboardProductsLoaded(result) => self.dashboard.on_products(result),
            AppMsg::ProductsLoaded(result) => self.products.on_loaded(result),
            AppMsg::ProductMutationDone(result) => self.products.on_mutation(result, &self.ctx),
            AppMsg::SalesLoaded(result) => self.sales.on_loaded(result),
            AppMsg::SaleMutationDone(result) => self.sales.on_mutation(result, &self.ctx),
            AppMsg::PickerLoaded(result) => self.new_sale.on_picker(result),
            AppMsg::SaleCreated(result) => self.new_sale.on_created(result),
            AppMsg::UsersLoaded(result) => self.users.on_loaded(result),
            AppMsg::UserMutationDone(result) => self.users.on_mutation(result, &self.ctx),
        };
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(route) => self.navigate(route),
            Action::LoginToken(response) => {
                match self
                    .session
                    .login_with_token(response.user, response.token)
                {
                    Ok(()) => self.navigate(Route::Dashboard),
                    Err(e) => self.login.set_banner(e.to_string()),
                }
            }
            Action::LoginApiKey(key) => {
                match self.session.login_with_api_key(UserInfo::api_key_user(), key) {
                    Ok(()) => self.navigate(Route::Dashboard),
                    Err(e) => self.login.set_banner(e.to_string()),
                }
            }
            Action::Logout => {
                if let Err(e) = self.session.logout() {
                    tracing::error!(error = %e, "Logout failed to clear storage");
                }
                self.route = Route::Login;
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_header(frame, header);

        let body = if self.show_log {
            let [page, log] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(8)]).areas(body);
            let logger = TuiLoggerWidget::default()
                .style_error(Style::default().fg(Color::Red))
                .style_warn(Style::default().fg(Color::Yellow))
                .state(&self.logger_state);
            frame.render_widget(logger, log);
            page
        } else {
            body
        };

        if matches!(self.session.state(), AuthState::Pending) {
            let waiting = Paragraph::new("Checking stored session...")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(waiting, body);
        } else {
            match self.route {
                Route::Login => self.login.render(frame, body),
                Route::Dashboard => self.dashboard.render(frame, body),
                Route::Products => self.products.render(frame, body),
                Route::Sales => self.sales.render(frame, body),
                Route::NewSale => self.new_sale.render(frame, body),
                Route::Users => self.users.render(frame, body),
            }
        }

        self.render_footer(frame, footer);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            " bodega ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        for route in [
            Route::Dashboard,
            Route::Products,
            Route::Sales,
            Route::NewSale,
            Route::Users,
        ] {
            let style = if route == self.route {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(route.title(), style));
        }
        if let Some(session) = self.session.state().session() {
            spans.push(Span::styled(
                format!(
                    "  [{} · {} · {}]",
                    session.user.username,
                    session.user.role,
                    session.method.as_str()
                ),
                Style::default().fg(Color::Green),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let help = match self.route {
            Route::Login => "Tab switch method · ↑/↓ field · Enter submit",
            Route::Dashboard => "v toggle view · r refresh",
            Route::Products => "↑/↓ select · n new · e edit · s stock · d delete · v view · r refresh",
            Route::Sales => "↑/↓ select · n new sale · p mark paid · c cancel · v view · r refresh",
            Route::NewSale => "Tab zone · Enter add/submit · +/- quantity · d remove",
            Route::Users => "↑/↓ select · n new · e edit · p password · t toggle active · d delete",
        };
        let line = format!(" {help} │ F1-F5 pages · F10 logout · F12 log · Ctrl+Q quit");
        frame.render_widget(
            Paragraph::new(line).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_client::{AuthMethod, ClientConfig, Session};

    fn session_for(role: &str) -> AuthState {
        AuthState::Authenticated(Session {
            user: UserInfo {
                id: "u1".to_string(),
                username: role.to_string(),
                role: role.to_string(),
                first_name: None,
            },
            method: AuthMethod::Token,
            credential: "tok".to_string(),
        })
    }

    #[test]
    fn anonymous_always_lands_on_login() {
        for requested in [Route::Dashboard, Route::Products, Route::Users, Route::Login] {
            assert_eq!(resolve_route(requested, &AuthState::Anonymous), Route::Login);
        }
    }

    #[test]
    fn admin_may_open_the_users_page() {
        assert_eq!(resolve_route(Route::Users, &session_for("admin")), Route::Users);
    }

    #[test]
    fn employee_is_redirected_from_users_to_dashboard() {
        assert_eq!(
            resolve_route(Route::Users, &session_for("employee")),
            Route::Dashboard
        );
        assert_eq!(
            resolve_route(Route::Users, &session_for("manager")),
            Route::Dashboard
        );
    }

    #[test]
    fn authenticated_login_route_redirects_to_dashboard() {
        assert_eq!(
            resolve_route(Route::Login, &session_for("employee")),
            Route::Dashboard
        );
    }

    #[tokio::test]
    async fn navigation_keys_are_ignored_while_the_startup_restore_runs() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ClientConfig::new("http://127.0.0.1:9")
            .with_credential_path(dir.path().join("credentials.json"));
        let storage = Arc::new(CredentialStore::open(&config.credential_path).unwrap());
        let api = ApiClient::new(&config, storage.clone()).unwrap();
        let session = SessionStore::new(storage.clone());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        // Session state is Pending until the restore probe reports back
        let mut app = App::new(session, Ctx { api, storage, tx });
        app.on_key(KeyEvent::from(KeyCode::F(2)));

        assert_eq!(app.route, Route::Login);
        assert!(rx.try_recv().is_err(), "no page fetch may be spawned");
    }
}
