mod minutes;
mod series;
mod topic;

pub use minutes::{MinutesRecord, MinutesUpdate};
pub use series::SeriesRecord;
pub use topic::{Topic, TopicDoc};

use uuid::Uuid;

/// Generate a fresh document id. Topics get their id client-side so they can
/// be referenced before any server round trip.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
