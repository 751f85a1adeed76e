mod outbox;

pub use outbox::{OutboxGateway, PendingCall};

use serde_json::Value;
use thiserror::Error;

/// Server method names invoked by this client. They are an external
/// compatibility surface and must match the server registry verbatim.
pub const MINUTES_INSERT: &str = "minutes.insert";
pub const MINUTES_UPDATE: &str = "minutes.update";
pub const MINUTES_FINALIZE: &str = "minutes.finalize";
pub const MINUTES_UNFINALIZE: &str = "minutes.unfinalize";
pub const SERIES_UPDATE: &str = "meetingseries.update";

/// Failure payload delivered to completion callbacks. The document core
/// never inspects or retries these; whatever the caller registered decides
/// what to do with them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("could not enqueue {method}: {reason}")]
    Enqueue { method: String, reason: String },

    #[error("{method} rejected: {reason}")]
    Rejected { method: String, reason: String },
}

pub type RpcResult = std::result::Result<Value, RpcError>;

/// Completion callback for a remote call, invoked at most once with the
/// eventual outcome.
pub type RpcCallback = Box<dyn FnOnce(RpcResult)>;

/// Gateway to named server-side operations.
///
/// Calls are fire-and-forget: `call` returns without waiting for the remote
/// outcome and never reports failure to the caller directly. Delivery,
/// ordering and retries are the implementation's concern; the only feedback
/// channel is the optional callback.
pub trait RpcGateway {
    fn call(&self, method: &str, args: Vec<Value>, callback: Option<RpcCallback>);
}
