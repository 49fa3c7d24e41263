//! FAQ and user storage
//!
//! Two backends implement the same traits: MongoDB for deployments and an
//! in-memory map for dev mode and tests. Unknown or malformed ids are never
//! errors; they come back as `None`/`false`.

mod memory;
mod model;
mod mongo;

use async_trait::async_trait;

use crate::types::Result;

pub use memory::{MemoryFaqStore, MemoryUserStore};
pub use model::{
    Creator, Facets, Faq, FaqFilter, FaqUpdate, FeedbackCounts, NewFaq, NewUser, UserRecord,
};
pub use mongo::{MongoFaqStore, MongoUserStore};

#[async_trait]
pub trait FaqStore: Send + Sync {
    /// Matching FAQs, newest first
    async fn list(&self, filter: &FaqFilter) -> Result<Vec<Faq>>;

    /// Distinct categories and tags across all FAQs
    async fn facets(&self) -> Result<Facets>;

    async fn create(&self, faq: NewFaq) -> Result<Faq>;

    /// Fetch an FAQ and increment its view counter
    async fn get_and_count_view(&self, id: &str) -> Result<Option<Faq>>;

    async fn update(&self, id: &str, update: FaqUpdate) -> Result<Option<Faq>>;

    /// True if an FAQ was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Increment the helpful or unhelpful counter
    async fn record_feedback(&self, id: &str, helpful: bool) -> Result<Option<FeedbackCounts>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Fails with [`crate::types::FaqError::Conflict`] if the email is taken
    async fn create(&self, user: NewUser) -> Result<UserRecord>;
}
