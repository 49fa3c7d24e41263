//! In-memory stores backed by DashMap

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{
    Facets, Faq, FaqFilter, FaqStore, FaqUpdate, FeedbackCounts, NewFaq, NewUser, UserRecord,
    UserStore,
};
use crate::types::{FaqError, Result};

/// FAQ store held in process memory. Ids use the ObjectId hex format so
/// they look the same as MongoDB-issued ones.
#[derive(Debug, Default)]
pub struct MemoryFaqStore {
    faqs: DashMap<String, Faq>,
}

impl MemoryFaqStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.faqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faqs.is_empty()
    }

    /// Snapshot ordered oldest first
    fn snapshot(&self) -> Vec<Faq> {
        let mut all: Vec<Faq> = self.faqs.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        all
    }
}

#[async_trait]
impl FaqStore for MemoryFaqStore {
    async fn list(&self, filter: &FaqFilter) -> Result<Vec<Faq>> {
        let mut faqs: Vec<Faq> = self
            .snapshot()
            .into_iter()
            .filter(|faq| faq.matches(filter))
            .collect();
        faqs.reverse();
        Ok(faqs)
    }

    async fn facets(&self) -> Result<Facets> {
        let mut facets = Facets::default();
        for faq in self.snapshot() {
            if !facets.categories.contains(&faq.category) {
                facets.categories.push(faq.category);
            }
            for tag in faq.tags {
                if !facets.tags.contains(&tag) {
                    facets.tags.push(tag);
                }
            }
        }
        Ok(facets)
    }

    async fn create(&self, faq: NewFaq) -> Result<Faq> {
        let now = Utc::now();
        let record = Faq {
            id: ObjectId::new().to_hex(),
            question: faq.question,
            answer: faq.answer,
            category: faq.category,
            tags: faq.tags,
            views: 0,
            helpful_yes: 0,
            helpful_no: 0,
            created_by: faq.created_by,
            created_at: now,
            updated_at: now,
        };
        self.faqs.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_and_count_view(&self, id: &str) -> Result<Option<Faq>> {
        Ok(self.faqs.get_mut(id).map(|mut faq| {
            faq.views += 1;
            faq.clone()
        }))
    }

    async fn update(&self, id: &str, update: FaqUpdate) -> Result<Option<Faq>> {
        Ok(self.faqs.get_mut(id).map(|mut faq| {
            update.apply_to(&mut faq);
            faq.updated_at = Utc::now();
            faq.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.faqs.remove(id).is_some())
    }

    async fn record_feedback(&self, id: &str, helpful: bool) -> Result<Option<FeedbackCounts>> {
        Ok(self.faqs.get_mut(id).map(|mut faq| {
            if helpful {
                faq.helpful_yes += 1;
            } else {
                faq.helpful_no += 1;
            }
            FeedbackCounts {
                helpful_yes: faq.helpful_yes,
                helpful_no: faq.helpful_no,
            }
        }))
    }
}

/// User accounts held in process memory, keyed by email
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(email).map(|u| u.clone()))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(FaqError::Conflict("User already exists".into())),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: ObjectId::new().to_hex(),
                    email: user.email,
                    password_hash: user.password_hash,
                    role: user.role,
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }
}
