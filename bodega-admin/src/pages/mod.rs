//! Page controllers
//!
//! Every page follows the same lifecycle: `enter` spawns the fetches,
//! `on_key` drives local UI state and mutations, the `on_*` message
//! hooks absorb task results, and `render` draws from local state.
//! Mutations never patch locally; success closes the modal and
//! re-fetches the whole collection.

mod dashboard;
mod login;
mod new_sale;
mod products;
mod sales;
mod users;

pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use new_sale::NewSalePage;
pub use products::ProductsPage;
pub use sales::SalesPage;
pub use users::UsersPage;
