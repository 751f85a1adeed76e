use serde_json::json;

use crate::document::ClientContext;
use crate::entity::SeriesRecord;
use crate::error::{PlenumError, Result};
use crate::gateway::{RpcCallback, SERIES_UPDATE};

/// Handle on the meeting series that owns a set of minutes.
pub struct MeetingSeries {
    ctx: ClientContext,
    record: SeriesRecord,
}

impl std::fmt::Debug for MeetingSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetingSeries")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl MeetingSeries {
    pub fn from_record(ctx: ClientContext, record: SeriesRecord) -> Self {
        Self { ctx, record }
    }

    /// Hydrate from the local cache by id, failing fast on a miss.
    pub fn load(ctx: ClientContext, id: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(PlenumError::InvalidArgument(
                "series id must not be empty".to_string(),
            ));
        }

        let record = ctx
            .cache
            .find_series(id)?
            .ok_or_else(|| PlenumError::SeriesNotFound(id.to_string()))?;

        Ok(Self { ctx, record })
    }

    pub fn record(&self) -> &SeriesRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Whether the context's acting user is among the series moderators.
    pub fn is_current_user_moderator(&self) -> bool {
        match &self.ctx.current_user {
            Some(user) => self.record.moderators.iter().any(|m| m == user),
            None => false,
        }
    }

    /// Record the date of the series' newest minutes, locally and via one
    /// `meetingseries.update` call.
    pub fn update_last_minutes_date(&mut self, date: &str, callback: Option<RpcCallback>) {
        self.record.last_minutes_date = Some(date.to_string());

        let payload = json!({
            "_id": self.record.id,
            "lastMinutesDate": date,
        });
        self.ctx.gateway.call(SERIES_UPDATE, vec![payload], callback);
    }
}
