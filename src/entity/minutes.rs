// src/entity/minutes.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Topic;

/// The minutes of one meeting, as stored in the minutes collection.
///
/// Field names follow the wire format of the collection: camelCase with the
/// `_id` and `meetingSeries_id` exceptions. Serializing a record hydrated
/// from a wire document reproduces that document exactly, which matters when
/// the record is sent back whole on save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MinutesRecord {
    /// Present if and only if the document has been persisted at least once.
    /// The persistence layer assigns it on first insert.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "meetingSeries_id")]
    pub meeting_series_id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    pub is_finalized: bool,
    pub is_unfinalized: bool,
    #[serde(default)]
    pub participants: String,
    #[serde(default)]
    pub agenda: String,
}

impl MinutesRecord {
    pub fn new(meeting_series_id: String, date: String) -> Self {
        Self {
            id: None,
            meeting_series_id,
            date,
            created_at: None,
            topics: Vec::new(),
            is_finalized: false,
            is_unfinalized: true,
            participants: String::new(),
            agenda: String::new(),
        }
    }

    /// Merge a partial update onto the record. Fields left unset in the
    /// update are untouched.
    pub fn apply(&mut self, update: MinutesUpdate) {
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(participants) = update.participants {
            self.participants = participants;
        }
        if let Some(agenda) = update.agenda {
            self.agenda = agenda;
        }
        if let Some(topics) = update.topics {
            self.topics = topics;
        }
    }
}

/// Partial-update payload for a minutes document. Only the fields that are
/// set travel over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinutesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
}
