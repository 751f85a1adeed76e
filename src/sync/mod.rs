//! Loopback synchronization for workspaces with no remote configured.
//!
//! The real synchronization layer ships outbox calls to a server and mirrors
//! confirmed state back into the cache. Until one is attached, this module
//! stands in for the round trip: it drains the outbox and applies each call
//! to the local cache the way the authoritative store eventually would. No
//! validation or permission checks happen here; those belong to the server.

use serde_json::Value;

use crate::cache::{DocumentCache, SqliteCache};
use crate::entity::{new_id, MinutesRecord, SeriesRecord};
use crate::error::{PlenumError, Result};
use crate::gateway::{
    OutboxGateway, PendingCall, MINUTES_FINALIZE, MINUTES_INSERT, MINUTES_UNFINALIZE,
    MINUTES_UPDATE, SERIES_UPDATE,
};

/// One outbox call that made it into the cache.
#[derive(Debug, Clone)]
pub struct Applied {
    pub method: String,
    pub id: String,
}

/// Drain the outbox into the cache. Calls that cannot be applied (unknown
/// method, missing target document, malformed payload) are logged and
/// skipped; they never abort the drain.
pub fn apply_pending(outbox: &OutboxGateway, cache: &SqliteCache) -> Result<Vec<Applied>> {
    let calls = outbox.take_all()?;
    let mut applied = Vec::new();

    for call in calls {
        match apply_call(cache, &call) {
            Ok(entry) => applied.push(entry),
            Err(e) => {
                tracing::warn!(method = %call.method, error = %e, "skipping unappliable call");
            }
        }
    }

    tracing::debug!(count = applied.len(), "applied pending calls");
    Ok(applied)
}

fn apply_call(cache: &SqliteCache, call: &PendingCall) -> Result<Applied> {
    let method = call.method.as_str();
    let id = match method {
        MINUTES_INSERT => apply_minutes_insert(cache, &call.args)?,
        MINUTES_UPDATE => apply_minutes_update(cache, &call.args)?,
        MINUTES_FINALIZE => apply_finalize(cache, &call.args, true)?,
        MINUTES_UNFINALIZE => apply_finalize(cache, &call.args, false)?,
        SERIES_UPDATE => apply_series_update(cache, &call.args)?,
        other => {
            return Err(PlenumError::InvalidArgument(format!(
                "unknown method {other}"
            )))
        }
    };

    Ok(Applied {
        method: call.method.clone(),
        id,
    })
}

fn apply_minutes_insert(cache: &SqliteCache, args: &[Value]) -> Result<String> {
    let doc = first_arg(args)?;
    let mut record: MinutesRecord = serde_json::from_value(doc.clone())?;

    // Id assignment is the persistence layer's job; do it on its behalf.
    let id = match record.id.clone() {
        Some(id) => id,
        None => {
            let id = new_id();
            record.id = Some(id.clone());
            id
        }
    };

    cache.upsert_minutes(&record)?;
    Ok(id)
}

fn apply_minutes_update(cache: &SqliteCache, args: &[Value]) -> Result<String> {
    let doc = first_arg(args)?;
    let id = doc_id(doc)?;

    let existing = cache
        .find_minutes(&id)?
        .ok_or_else(|| PlenumError::MinutesNotFound(id.clone()))?;

    let mut merged = serde_json::to_value(&existing)?;
    merge_fields(&mut merged, doc);

    let record: MinutesRecord = serde_json::from_value(merged)?;
    cache.upsert_minutes(&record)?;
    Ok(id)
}

fn apply_finalize(cache: &SqliteCache, args: &[Value], finalized: bool) -> Result<String> {
    let id = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| PlenumError::InvalidArgument("expected a document id".to_string()))?
        .to_string();

    let mut record = cache
        .find_minutes(&id)?
        .ok_or_else(|| PlenumError::MinutesNotFound(id.clone()))?;

    record.is_finalized = finalized;
    record.is_unfinalized = !finalized;

    cache.upsert_minutes(&record)?;
    Ok(id)
}

fn apply_series_update(cache: &SqliteCache, args: &[Value]) -> Result<String> {
    let doc = first_arg(args)?;
    let id = doc_id(doc)?;

    let existing = cache
        .find_series(&id)?
        .ok_or_else(|| PlenumError::SeriesNotFound(id.clone()))?;

    let mut merged = serde_json::to_value(&existing)?;
    merge_fields(&mut merged, doc);

    let record: SeriesRecord = serde_json::from_value(merged)?;
    cache.upsert_series(&record)?;
    Ok(id)
}

fn first_arg(args: &[Value]) -> Result<&Value> {
    args.first()
        .filter(|v| v.is_object())
        .ok_or_else(|| PlenumError::InvalidArgument("expected a document argument".to_string()))
}

fn doc_id(doc: &Value) -> Result<String> {
    doc.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PlenumError::InvalidArgument("document carries no _id".to_string()))
}

/// Shallow top-level merge, matching how the server applies partial
/// documents.
fn merge_fields(base: &mut Value, patch: &Value) {
    if let (Value::Object(base_map), Value::Object(patch_map)) = (base, patch) {
        for (key, value) in patch_map {
            base_map.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use serde_json::json;

    use crate::gateway::RpcGateway;

    fn workspace() -> (TempDir, OutboxGateway, SqliteCache) {
        let tmp = TempDir::new().unwrap();
        let outbox = OutboxGateway::open(tmp.path()).unwrap();
        let cache = SqliteCache::open(tmp.path()).unwrap();
        (tmp, outbox, cache)
    }

    fn insert_doc() -> Value {
        json!({
            "meetingSeries_id": "s1",
            "date": "2024-03-01",
            "createdAt": "2024-03-01T09:00:00Z",
            "topics": [],
            "isFinalized": false,
            "isUnfinalized": true,
            "participants": "",
            "agenda": ""
        })
    }

    #[test]
    fn test_insert_assigns_an_id_and_caches() {
        let (_tmp, outbox, cache) = workspace();
        outbox.call("minutes.insert", vec![insert_doc(), Value::Null], None);

        let applied = apply_pending(&outbox, &cache).unwrap();

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].method, "minutes.insert");
        assert!(!applied[0].id.is_empty());

        let cached = cache.find_minutes(&applied[0].id).unwrap().unwrap();
        assert_eq!(cached.date, "2024-03-01");
        assert!(outbox.is_empty().unwrap());
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let (_tmp, outbox, cache) = workspace();
        outbox.call("minutes.insert", vec![insert_doc(), Value::Null], None);
        let applied = apply_pending(&outbox, &cache).unwrap();
        let id = applied[0].id.clone();

        outbox.call(
            "minutes.update",
            vec![json!({"_id": id, "date": "2024-03-08"})],
            None,
        );
        apply_pending(&outbox, &cache).unwrap();

        let cached = cache.find_minutes(&id).unwrap().unwrap();
        assert_eq!(cached.date, "2024-03-08");
        assert_eq!(cached.meeting_series_id, "s1");
    }

    #[test]
    fn test_finalize_flips_both_flags() {
        let (_tmp, outbox, cache) = workspace();
        outbox.call("minutes.insert", vec![insert_doc(), Value::Null], None);
        let applied = apply_pending(&outbox, &cache).unwrap();
        let id = applied[0].id.clone();

        outbox.call("minutes.finalize", vec![json!(id)], None);
        apply_pending(&outbox, &cache).unwrap();

        let cached = cache.find_minutes(&id).unwrap().unwrap();
        assert!(cached.is_finalized);
        assert!(!cached.is_unfinalized);

        outbox.call("minutes.unfinalize", vec![json!(id)], None);
        apply_pending(&outbox, &cache).unwrap();

        let cached = cache.find_minutes(&id).unwrap().unwrap();
        assert!(!cached.is_finalized);
        assert!(cached.is_unfinalized);
    }

    #[test]
    fn test_series_update_merges_onto_cached_row() {
        let (_tmp, outbox, cache) = workspace();
        let series = SeriesRecord::new("acme".to_string(), "weekly".to_string());
        cache.upsert_series(&series).unwrap();

        outbox.call(
            "meetingseries.update",
            vec![json!({"_id": series.id, "lastMinutesDate": "2024-03-08"})],
            None,
        );
        apply_pending(&outbox, &cache).unwrap();

        let cached = cache.find_series(&series.id).unwrap().unwrap();
        assert_eq!(cached.last_minutes_date.as_deref(), Some("2024-03-08"));
        assert_eq!(cached.project, "acme");
    }

    #[test]
    fn test_unappliable_calls_are_skipped_not_fatal() {
        let (_tmp, outbox, cache) = workspace();
        outbox.call("minutes.finalize", vec![json!("missing")], None);
        outbox.call("minutes.vote", vec![json!("m1")], None);
        outbox.call("minutes.insert", vec![insert_doc(), Value::Null], None);

        let applied = apply_pending(&outbox, &cache).unwrap();

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].method, "minutes.insert");
        assert!(outbox.is_empty().unwrap());
    }
}
