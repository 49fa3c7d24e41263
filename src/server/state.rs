//! Shared application state

use std::sync::Arc;
use std::time::Instant;

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::store::{FaqStore, MemoryFaqStore, MemoryUserStore, UserStore};
use crate::types::Result;

/// Which backend the stores run on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Mongo,
    Memory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Mongo => "mongodb",
            Storage::Memory => "memory",
        }
    }
}

pub struct AppState {
    pub args: Args,
    pub faqs: Arc<dyn FaqStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt: Arc<JwtValidator>,
    pub storage: Storage,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        faqs: Arc<dyn FaqStore>,
        users: Arc<dyn UserStore>,
        jwt: Arc<JwtValidator>,
        storage: Storage,
    ) -> Self {
        Self {
            args,
            faqs,
            users,
            jwt,
            storage,
            started_at: Instant::now(),
        }
    }

    /// State backed by empty in-memory stores
    pub fn in_memory(args: Args) -> Result<Self> {
        let jwt = Arc::new(args.jwt_validator()?);
        Ok(Self::new(
            args,
            Arc::new(MemoryFaqStore::new()),
            Arc::new(MemoryUserStore::new()),
            jwt,
            Storage::Memory,
        ))
    }
}
