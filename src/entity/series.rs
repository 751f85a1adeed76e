// src/entity/series.rs
use serde::{Deserialize, Serialize};

use super::new_id;

/// A meeting series document, as far as the minutes client needs it. The
/// series itself is owned elsewhere; this is the slice that moderator checks
/// and navigation rely on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub project: String,
    pub name: String,
    #[serde(default)]
    pub moderators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_minutes_date: Option<String>,
}

impl SeriesRecord {
    pub fn new(project: String, name: String) -> Self {
        Self {
            id: new_id(),
            project,
            name,
            moderators: Vec::new(),
            last_minutes_date: None,
        }
    }
}
