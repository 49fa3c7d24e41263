//! MongoDB-backed stores

use async_trait::async_trait;
use bson::{doc, DateTime, Document};
use chrono::Utc;

use super::{
    Creator, Facets, Faq, FaqFilter, FaqStore, FaqUpdate, FeedbackCounts, NewFaq, NewUser,
    UserRecord, UserStore,
};
use crate::db::schemas::{FaqDoc, UserDoc, FAQ_COLLECTION, USER_COLLECTION};
use crate::db::{parse_object_id, MongoClient, MongoCollection};
use crate::types::{FaqError, Result};

pub struct MongoFaqStore {
    collection: MongoCollection<FaqDoc>,
}

impl MongoFaqStore {
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            collection: client.collection(FAQ_COLLECTION).await?,
        })
    }
}

fn faq_from_doc(doc: FaqDoc) -> Faq {
    let created_at = doc
        .metadata
        .created_at
        .map(|t| t.to_chrono())
        .unwrap_or_else(Utc::now);
    let updated_at = doc
        .metadata
        .updated_at
        .map(|t| t.to_chrono())
        .unwrap_or(created_at);

    Faq {
        id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
        question: doc.question,
        answer: doc.answer,
        category: doc.category,
        tags: doc.tags,
        views: doc.views,
        helpful_yes: doc.helpful_yes,
        helpful_no: doc.helpful_no,
        created_by: Creator {
            id: doc.created_by,
            email: doc.created_by_email,
        },
        created_at,
        updated_at,
    }
}

/// Translate a listing filter into a MongoDB query
fn filter_query(filter: &FaqFilter) -> Document {
    let mut query = doc! {};

    if let Some(search) = &filter.search {
        let pattern = regex::escape(search);
        query.insert(
            "$or",
            vec![
                doc! { "question": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "tags": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }

    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }

    if let Some(tag) = &filter.tag {
        query.insert("tags", tag.as_str());
    }

    query
}

/// `$set` document for the provided fields of an update
fn update_set(update: &FaqUpdate) -> Document {
    let mut set = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(question) = &update.question {
        set.insert("question", question.as_str());
    }
    if let Some(answer) = &update.answer {
        set.insert("answer", answer.as_str());
    }
    if let Some(category) = &update.category {
        set.insert("category", category.as_str());
    }
    if let Some(tags) = &update.tags {
        set.insert("tags", tags.clone());
    }

    set
}

#[async_trait]
impl FaqStore for MongoFaqStore {
    async fn list(&self, filter: &FaqFilter) -> Result<Vec<Faq>> {
        let docs = self
            .collection
            .find_many(filter_query(filter), doc! { "metadata.created_at": -1, "_id": -1 })
            .await?;

        Ok(docs.into_iter().map(faq_from_doc).collect())
    }

    async fn facets(&self) -> Result<Facets> {
        Ok(Facets {
            categories: self.collection.distinct_strings("category").await?,
            tags: self.collection.distinct_strings("tags").await?,
        })
    }

    async fn create(&self, faq: NewFaq) -> Result<Faq> {
        let doc = FaqDoc {
            question: faq.question,
            answer: faq.answer,
            category: faq.category,
            tags: faq.tags,
            created_by: faq.created_by.id,
            created_by_email: faq.created_by.email,
            ..Default::default()
        };

        let id = self.collection.insert_one(doc).await?;

        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .map(faq_from_doc)
            .ok_or_else(|| FaqError::Database("Inserted FAQ not found".into()))
    }

    async fn get_and_count_view(&self, id: &str) -> Result<Option<Faq>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let doc = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$inc": { "views": 1 } })
            .await?;

        Ok(doc.map(faq_from_doc))
    }

    async fn update(&self, id: &str, update: FaqUpdate) -> Result<Option<Faq>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let doc = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": update_set(&update) })
            .await?;

        Ok(doc.map(faq_from_doc))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };

        self.collection.delete_one(doc! { "_id": oid }).await
    }

    async fn record_feedback(&self, id: &str, helpful: bool) -> Result<Option<FeedbackCounts>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let mut inc = Document::new();
        inc.insert(if helpful { "helpful_yes" } else { "helpful_no" }, 1);

        let doc = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$inc": inc })
            .await?;

        Ok(doc.map(|d| FeedbackCounts {
            helpful_yes: d.helpful_yes,
            helpful_no: d.helpful_no,
        }))
    }
}

pub struct MongoUserStore {
    collection: MongoCollection<UserDoc>,
}

impl MongoUserStore {
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            collection: client.collection(USER_COLLECTION).await?,
        })
    }
}

fn user_from_doc(doc: UserDoc) -> UserRecord {
    UserRecord {
        id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
        email: doc.email,
        password_hash: doc.password_hash,
        role: doc.role,
        created_at: doc
            .metadata
            .created_at
            .map(|t| t.to_chrono())
            .unwrap_or_else(Utc::now),
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let doc = self.collection.find_one(doc! { "email": email }).await?;
        Ok(doc.map(user_from_doc))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let doc = UserDoc::new(user.email, user.password_hash, user.role);
        let mut record = user_from_doc(doc.clone());

        let id = self.collection.insert_one(doc).await.map_err(|e| match e {
            FaqError::Conflict(_) => FaqError::Conflict("User already exists".into()),
            other => other,
        })?;

        record.id = id.to_hex();
        Ok(record)
    }
}
