//! Records exchanged with the stores and sent to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Author of an FAQ, as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub helpful_yes: i64,
    pub helpful_no: i64,
    pub created_by: Creator,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Faq {
    /// Search hit: case-insensitive substring of the question or any tag
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.question.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    pub fn matches(&self, filter: &FaqFilter) -> bool {
        filter
            .search
            .as_deref()
            .map_or(true, |s| self.matches_search(s))
            && filter
                .category
                .as_deref()
                .map_or(true, |c| self.category == c)
            && filter
                .tag
                .as_deref()
                .map_or(true, |t| self.tags.iter().any(|tag| tag == t))
    }
}

/// Fields for a new FAQ
#[derive(Debug, Clone)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_by: Creator,
}

impl NewFaq {
    pub fn new(
        question: &str,
        answer: &str,
        category: &str,
        tags: Vec<String>,
        created_by: Creator,
    ) -> Self {
        Self {
            question: question.trim().to_string(),
            answer: answer.to_string(),
            category: category.trim().to_string(),
            tags: normalize_tags(tags),
            created_by,
        }
    }
}

/// Partial FAQ update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct FaqUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl FaqUpdate {
    /// Trim fields the same way creation does
    pub fn normalized(self) -> Self {
        Self {
            question: self.question.map(|q| q.trim().to_string()),
            answer: self.answer,
            category: self.category.map(|c| c.trim().to_string()),
            tags: self.tags.map(normalize_tags),
        }
    }

    pub fn apply_to(&self, faq: &mut Faq) {
        if let Some(question) = &self.question {
            faq.question = question.clone();
        }
        if let Some(answer) = &self.answer {
            faq.answer = answer.clone();
        }
        if let Some(category) = &self.category {
            faq.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            faq.tags = tags.clone();
        }
    }
}

/// Listing filter. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl FaqFilter {
    /// Build from raw query values; empty strings and `all` mean no filter
    pub fn from_query(
        search: Option<String>,
        category: Option<String>,
        tag: Option<String>,
    ) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        let selected = |v: Option<String>| present(v).filter(|s| s != "all");

        Self {
            search: present(search),
            category: selected(category),
            tag: selected(tag),
        }
    }
}

/// Distinct categories and tags across all FAQs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCounts {
    pub helpful_yes: i64,
    pub helpful_no: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
