//! Shared types for faqdesk

mod context;
mod error;
mod response;

pub use context::{RequestContext, MAX_BODY_BYTES};
pub use error::{FaqError, Rejection, Result};
pub use response::{full_body, ApiResponse, BoxBody};
