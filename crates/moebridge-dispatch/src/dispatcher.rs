//! Delivery with bounded retry and dead-lettering.

use crate::dead_letter::{DeadLetter, DeadLetterStore};
use crate::error::{DispatchError, Result};
use crate::queue::ExternalService;
use crate::settings::RetrySettings;
use crate::{QueueSender, StatementSender};
use moebridge_core::MappedEvent;
use std::sync::Arc;

/// What happens to a statement once its retries are used up.
#[derive(Debug)]
pub enum DispatchMode {
    /// Written to the dead-letter store.
    Persistent(DeadLetterStore),
    /// Only logged.
    Transient,
}

pub struct Dispatcher {
    statements: Option<Arc<dyn StatementSender>>,
    queue: Option<Arc<dyn QueueSender>>,
    retry: RetrySettings,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(retry: RetrySettings) -> Self {
        Self {
            statements: None,
            queue: None,
            retry,
            mode: DispatchMode::Transient,
        }
    }

    #[must_use]
    pub fn with_statements(mut self, sender: Arc<dyn StatementSender>) -> Self {
        self.statements = Some(sender);
        self
    }

    #[must_use]
    pub fn with_queue(mut self, sender: Arc<dyn QueueSender>) -> Self {
        self.queue = Some(sender);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Delivers `event` to every target `service` enables.
    ///
    /// The whole delivery is repeated after a retryable failure, at most
    /// `max_retries` times with `countdown` in between.
    pub async fn dispatch(
        &self,
        event_name: &str,
        event: &MappedEvent,
        service: &ExternalService,
    ) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            let err = match self.deliver(event_name, event, service).await {
                Ok(()) => {
                    tracing::debug!(event_name, attempt, "statement dispatched");
                    return Ok(());
                }
                Err(err) => err,
            };

            if err.is_retryable() && attempt < self.retry.max_retries {
                attempt += 1;
                tracing::warn!(
                    event_name,
                    attempt,
                    max_retries = self.retry.max_retries,
                    error = %err,
                    "dispatch failed; retrying"
                );
                tokio::time::sleep(self.retry.countdown).await;
                continue;
            }

            tracing::error!(event_name, attempt, error = %err, "statement not dispatched");
            self.give_up(event_name, event, &err).await;
            return Err(err);
        }
    }

    async fn deliver(
        &self,
        event_name: &str,
        event: &MappedEvent,
        service: &ExternalService,
    ) -> Result<()> {
        if service.send_to_lrs {
            let sender = self
                .statements
                .as_ref()
                .ok_or(DispatchError::NotConfigured("statement store"))?;
            let response = sender.send(event, event_name).await?;
            tracing::debug!(event_name, ?response, "statement store answered");
        }
        if service.send_to_queue {
            let sender = self
                .queue
                .as_ref()
                .ok_or(DispatchError::NotConfigured("queue sender"))?;
            sender.send(event, event_name, service).await?;
        }
        Ok(())
    }

    /// A failing dead-letter write is logged and never replaces the
    /// delivery error.
    async fn give_up(&self, event_name: &str, event: &MappedEvent, err: &DispatchError) {
        let DispatchMode::Persistent(store) = &self.mode else {
            return;
        };
        let letter = match serde_json::to_value(event) {
            Ok(value) => DeadLetter::new(event_name, err, value),
            Err(e) => {
                tracing::error!(event_name, error = %e, "could not encode dead letter");
                return;
            }
        };
        if let Err(e) = store.persist(letter).await {
            tracing::error!(
                event_name,
                path = %store.path().display(),
                error = %e,
                "could not persist dead letter"
            );
        }
    }
}
