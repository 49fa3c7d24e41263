//! FAQ document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for FAQs
pub const FAQ_COLLECTION: &str = "faqs";

/// FAQ document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FaqDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub question: String,

    pub answer: String,

    pub category: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub views: i64,

    #[serde(default)]
    pub helpful_yes: i64,

    #[serde(default)]
    pub helpful_no: i64,

    /// Creator's user id (hex ObjectId)
    pub created_by: String,

    /// Creator's email at creation time
    #[serde(default)]
    pub created_by_email: String,
}

impl IntoIndexes for FaqDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Listing is newest first
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "category": 1 },
                Some(
                    IndexOptions::builder()
                        .name("category_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "tags": 1 },
                Some(IndexOptions::builder().name("tags_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for FaqDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
