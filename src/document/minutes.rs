use chrono::Utc;
use serde_json::{json, Value};

use crate::document::{ClientContext, MeetingSeries};
use crate::entity::{MinutesRecord, MinutesUpdate, Topic, TopicDoc};
use crate::error::{PlenumError, Result};
use crate::gateway::{
    RpcCallback, MINUTES_FINALIZE, MINUTES_INSERT, MINUTES_UNFINALIZE, MINUTES_UPDATE,
};

/// Handle on one meeting's minutes.
///
/// The handle owns its record and mutates it optimistically: every mutating
/// method updates local state synchronously and forwards the delta to the
/// gateway in the same breath, without waiting for the remote outcome.
/// Server-side failures reach the caller only through the optional
/// completion callbacks. The finalize transitions are the one exception to
/// the optimistic rule: they send the request and leave the local flags
/// alone until the authoritative flip comes back through the cache.
pub struct Minutes {
    ctx: ClientContext,
    record: MinutesRecord,
}

impl std::fmt::Debug for Minutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Minutes")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl Minutes {
    /// Adopt an already-loaded record, e.g. one delivered by a cache
    /// subscription.
    pub fn from_record(ctx: ClientContext, record: MinutesRecord) -> Self {
        Self { ctx, record }
    }

    /// Hydrate from the local cache by id. A miss fails fast; callers that
    /// can tolerate absence should ask the cache directly.
    pub fn load(ctx: ClientContext, id: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(PlenumError::InvalidArgument(
                "minutes id must not be empty".to_string(),
            ));
        }

        let record = ctx
            .cache
            .find_minutes(id)?
            .ok_or_else(|| PlenumError::MinutesNotFound(id.to_string()))?;

        Ok(Self { ctx, record })
    }

    pub fn record(&self) -> &MinutesRecord {
        &self.record
    }

    pub fn into_record(self) -> MinutesRecord {
        self.record
    }

    pub fn id(&self) -> Option<&str> {
        self.record.id.as_deref()
    }

    /// Merge a partial update onto the record and send it, with this
    /// document's id attached, as one `minutes.update` call.
    pub fn update(&mut self, update: MinutesUpdate, callback: Option<RpcCallback>) -> Result<()> {
        let mut payload = serde_json::to_value(&update)?;
        payload["_id"] = json!(self.record.id);

        self.record.apply(update);
        self.ctx
            .gateway
            .call(MINUTES_UPDATE, vec![payload], callback);
        Ok(())
    }

    /// Persist the whole document: `minutes.insert` for a document that has
    /// never been saved, `minutes.update` otherwise. Either way the record
    /// carries a `created_at` once this returns.
    pub fn save(&mut self, context_hint: Option<Value>, callback: Option<RpcCallback>) -> Result<()> {
        if self.record.created_at.is_none() {
            self.record.created_at = Some(Utc::now());
        }

        let doc = serde_json::to_value(&self.record)?;
        if self.record.id.is_none() {
            self.ctx.gateway.call(
                MINUTES_INSERT,
                vec![doc, context_hint.unwrap_or(Value::Null)],
                callback,
            );
        } else {
            self.ctx.gateway.call(MINUTES_UPDATE, vec![doc], callback);
        }
        Ok(())
    }

    /// Request the finalize transition. Local flags stay untouched; the
    /// authoritative state arrives through cache synchronization.
    pub fn finalize(&self, callback: Option<RpcCallback>) {
        self.ctx
            .gateway
            .call(MINUTES_FINALIZE, vec![json!(self.record.id)], callback);
    }

    /// Request the unfinalize transition. Same contract as `finalize`.
    pub fn unfinalize(&self, callback: Option<RpcCallback>) {
        self.ctx
            .gateway
            .call(MINUTES_UNFINALIZE, vec![json!(self.record.id)], callback);
    }

    /// Find a topic by id. Absence is a regular outcome, not an error.
    pub fn find_topic(&self, topic_id: &str) -> Option<&Topic> {
        self.record.topics.iter().find(|t| t.id == topic_id)
    }

    /// Remove the topic with the given id. When no topic matches, nothing
    /// changes and no remote call is made; the return value says which case
    /// happened.
    pub fn remove_topic(&mut self, topic_id: &str, callback: Option<RpcCallback>) -> Result<bool> {
        let pos = match self.record.topics.iter().position(|t| t.id == topic_id) {
            Some(pos) => pos,
            None => return Ok(false),
        };

        self.record.topics.remove(pos);
        self.push_topics(callback)?;
        Ok(true)
    }

    /// Topics not yet carried over from an earlier meeting, in display
    /// order.
    pub fn get_new_topics(&self) -> Vec<&Topic> {
        self.record.topics.iter().filter(|t| t.is_new).collect()
    }

    /// Carried-over topics whose discussion is closed, in display order.
    pub fn get_old_closed_topics(&self) -> Vec<&Topic> {
        self.record
            .topics
            .iter()
            .filter(|t| !t.is_new && !t.is_open)
            .collect()
    }

    /// Insert or replace a topic. A payload whose id matches an existing
    /// topic replaces that topic in place; anything else is appended, with a
    /// fresh id generated when the payload carries none. Returns the
    /// effective topic id.
    pub fn upsert_topic(&mut self, doc: TopicDoc, callback: Option<RpcCallback>) -> Result<String> {
        let topic = doc.into_topic();
        let id = topic.id.clone();

        match self.record.topics.iter().position(|t| t.id == topic.id) {
            Some(pos) => self.record.topics[pos] = topic,
            None => self.record.topics.push(topic),
        }

        self.push_topics(callback)?;
        Ok(id)
    }

    fn push_topics(&self, callback: Option<RpcCallback>) -> Result<()> {
        let payload = json!({
            "_id": self.record.id,
            "topics": self.record.topics,
        });
        self.ctx
            .gateway
            .call(MINUTES_UPDATE, vec![payload], callback);
        Ok(())
    }

    pub fn parent_meeting_series_id(&self) -> &str {
        &self.record.meeting_series_id
    }

    /// Construct a handle on the owning meeting series.
    pub fn parent_meeting_series(&self) -> Result<MeetingSeries> {
        MeetingSeries::load(self.ctx.clone(), &self.record.meeting_series_id)
    }

    /// Whether the acting user moderates the owning series. Pure forwarding
    /// to the parent handle.
    pub fn is_current_user_moderator(&self) -> Result<bool> {
        Ok(self.parent_meeting_series()?.is_current_user_moderator())
    }
}
