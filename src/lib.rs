//! faqdesk - company FAQ knowledge base
//!
//! Employees browse and search FAQs and vote on whether answers helped;
//! admins create, edit and delete them. Mutating endpoints sit behind a
//! cookie-session auth gate.
//!
//! ## Layout
//!
//! - **auth**: session tokens, the `auth_token` cookie, passwords and the
//!   gate middleware (`require_authenticated`, `require_admin`)
//! - **store**: FAQ and user storage (MongoDB or in-memory)
//! - **routes**: endpoint handlers and the router
//! - **server**: hyper accept loop and shared state

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{FaqError, Result};
