pub mod cache;
pub mod cli;
pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod sync;

pub use cache::{DocumentCache, SqliteCache};
pub use document::{ClientContext, MeetingSeries, Minutes};
pub use error::{PlenumError, Result};
pub use gateway::{OutboxGateway, RpcGateway};
