// src/entity/topic.rs
use serde::{Deserialize, Serialize};

use super::new_id;

/// One agenda item embedded in a meeting's minutes.
///
/// Field names follow the wire format of the minutes collection: `_id`,
/// `isNew`, `isOpen`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject: String,
    /// True until the surrounding workflow marks the topic as carried over.
    pub is_new: bool,
    /// True while the topic is still under discussion.
    pub is_open: bool,
}

impl Topic {
    pub fn new(subject: String) -> Self {
        Self {
            id: new_id(),
            subject,
            is_new: true,
            is_open: true,
        }
    }
}

/// Input payload for `Minutes::upsert_topic`: the id is optional, and the
/// flags default to true for brand-new topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDoc {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject: String,
    #[serde(default = "default_true")]
    pub is_new: bool,
    #[serde(default = "default_true")]
    pub is_open: bool,
}

impl TopicDoc {
    pub fn new(subject: String) -> Self {
        Self {
            id: None,
            subject,
            is_new: true,
            is_open: true,
        }
    }

    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            id: Some(topic.id.clone()),
            subject: topic.subject.clone(),
            is_new: topic.is_new,
            is_open: topic.is_open,
        }
    }

    /// Promote the payload to a stored topic, generating an id if needed.
    pub fn into_topic(self) -> Topic {
        Topic {
            id: self.id.unwrap_or_else(new_id),
            subject: self.subject,
            is_new: self.is_new,
            is_open: self.is_open,
        }
    }
}

fn default_true() -> bool {
    true
}
