mod sqlite_cache;

pub use sqlite_cache::SqliteCache;

use crate::entity::{MinutesRecord, SeriesRecord};
use crate::error::Result;

/// Lookup-by-id over the locally held, server-synchronized document store.
///
/// Document handles only ever read through this interface; writes are the
/// business of whatever keeps the cache in step with the server.
pub trait DocumentCache {
    fn find_minutes(&self, id: &str) -> Result<Option<MinutesRecord>>;
    fn find_series(&self, id: &str) -> Result<Option<SeriesRecord>>;
}
