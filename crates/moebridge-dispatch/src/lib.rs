#![warn(clippy::unwrap_used, clippy::expect_used)]

//! The delivery side of moebridge.
//!
//! Mapped statements leave the process through this crate. Lookup stores
//! and their caches live here too, since they are I/O as well.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod dead_letter;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod router;
pub mod settings;
pub mod statements;
pub mod token;

use async_trait::async_trait;
use moebridge_core::MappedEvent;
use serde_json::Value;

pub use cache::{CachedBlockTitles, CachedInstructors, TtlCache};
pub use catalog::{Catalog, StaffMember};
pub use config::FlatConfig;
pub use dead_letter::{DeadLetter, DeadLetterStore};
pub use dispatcher::{DispatchMode, Dispatcher};
pub use error::{DispatchError, Result};
pub use queue::{ExternalService, HttpQueueSender};
pub use router::{EventRouter, RouteOutcome};
pub use settings::{ApiSettings, CacheSettings, RetrySettings};
pub use statements::StatementClient;
pub use token::{CachedTokenProvider, HttpTokenSource, TokenSource};

/// Supplies a valid API access token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Delivers a statement to the statement store.
#[async_trait]
pub trait StatementSender: Send + Sync {
    /// Returns the store's parsed response body, if it sent one.
    async fn send(&self, event: &MappedEvent, event_name: &str) -> Result<Option<Value>>;
}

/// Delivers a statement to a message queue.
#[async_trait]
pub trait QueueSender: Send + Sync {
    async fn send(
        &self,
        event: &MappedEvent,
        event_name: &str,
        service: &ExternalService,
    ) -> Result<()>;
}
