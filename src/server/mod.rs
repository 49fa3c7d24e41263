//! HTTP server and shared state

mod http;
mod state;

pub use http::run;
pub use state::{AppState, Storage};
