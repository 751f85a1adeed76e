mod minutes;
mod series;

pub use minutes::Minutes;
pub use series::MeetingSeries;

use std::sync::Arc;

use crate::cache::DocumentCache;
use crate::gateway::RpcGateway;

/// Collaborators shared by every document handle: the local cache for
/// hydration, the gateway for mutations, and the acting user for role
/// checks.
#[derive(Clone)]
pub struct ClientContext {
    pub cache: Arc<dyn DocumentCache>,
    pub gateway: Arc<dyn RpcGateway>,
    pub current_user: Option<String>,
}

impl ClientContext {
    pub fn new(
        cache: Arc<dyn DocumentCache>,
        gateway: Arc<dyn RpcGateway>,
        current_user: Option<String>,
    ) -> Self {
        Self {
            cache,
            gateway,
            current_user,
        }
    }
}
