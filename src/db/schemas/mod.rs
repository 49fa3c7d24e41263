//! Database schemas for faqdesk

mod faq;
mod metadata;
mod user;

pub use faq::{FaqDoc, FAQ_COLLECTION};
pub use metadata::Metadata;
pub use user::{UserDoc, USER_COLLECTION};
