use crate::dispatcher::Dispatcher;
use crate::queue::ExternalService;
use moebridge_mapping::EventTransformer;
use serde_json::Value;
use std::sync::Arc;

/// What became of one routed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The verb has no counterpart in the partner schema.
    Skipped,
    /// The statement could not be transformed.
    Rejected(String),
    Dispatched,
    /// Transformed, but delivery failed for good.
    Failed(String),
}

/// Filters, transforms and dispatches raw statements.
pub struct EventRouter {
    transformer: Arc<EventTransformer>,
    dispatcher: Dispatcher,
    service: ExternalService,
}

impl EventRouter {
    pub fn new(
        transformer: Arc<EventTransformer>,
        dispatcher: Dispatcher,
        service: ExternalService,
    ) -> Self {
        Self {
            transformer,
            dispatcher,
            service,
        }
    }

    pub async fn route(&self, event_name: &str, raw: Value) -> RouteOutcome {
        let verb = raw
            .pointer("/verb/id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !self.transformer.is_relevant_event(verb) {
            tracing::debug!(event_name, verb, "skipping statement with unmapped verb");
            return RouteOutcome::Skipped;
        }

        let mapped = match self.transformer.transform_json(raw) {
            Ok(mapped) => mapped,
            Err(e) => {
                tracing::error!(event_name, error = %e, "statement not transformable");
                return RouteOutcome::Rejected(e.to_string());
            }
        };

        match self
            .dispatcher
            .dispatch(event_name, &mapped, &self.service)
            .await
        {
            Ok(()) => RouteOutcome::Dispatched,
            Err(e) => RouteOutcome::Failed(e.to_string()),
        }
    }
}
