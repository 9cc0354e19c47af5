//! Delivery to the message-queue gateway and per-route delivery switches.

use crate::error::{check_status, DispatchError, Result};
use crate::QueueSender;
use async_trait::async_trait;
use moebridge_core::MappedEvent;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn enabled() -> bool {
    true
}

/// Where a mapped statement should be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalService {
    #[serde(rename = "isSendToLRS", default = "enabled")]
    pub send_to_lrs: bool,
    #[serde(rename = "isSendToSQS", default = "enabled")]
    pub send_to_queue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_group: Option<String>,
}

impl Default for ExternalService {
    fn default() -> Self {
        Self {
            send_to_lrs: true,
            send_to_queue: true,
            queue_url: None,
            message_group: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct QueueEnvelope<'a> {
    event_name: &'a str,
    event: &'a MappedEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_group: Option<&'a str>,
}

/// Posts `{event_name, event}` envelopes to the route's queue gateway.
pub struct HttpQueueSender {
    http: Client,
}

impl HttpQueueSender {
    pub fn new() -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http })
    }
}

fn queue_target(service: &ExternalService) -> Result<Url> {
    let raw = service
        .queue_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or(DispatchError::NotConfigured("queue URL"))?;
    Ok(Url::parse(raw)?)
}

#[async_trait]
impl QueueSender for HttpQueueSender {
    async fn send(
        &self,
        event: &MappedEvent,
        event_name: &str,
        service: &ExternalService,
    ) -> Result<()> {
        let target = queue_target(service)?;
        let envelope = QueueEnvelope {
            event_name,
            event,
            message_group: service.message_group.as_deref(),
        };

        let response = self.http.post(target).json(&envelope).send().await?;
        check_status(response).await?;
        tracing::info!(event_name, "statement queued");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use moebridge_core::event::{MappedActor, MappedObject, MappedVerb};
    use moebridge_core::Section;
    use serde_json::json;

    fn event() -> MappedEvent {
        MappedEvent {
            id: "e-1".into(),
            timestamp: String::new(),
            version: "1.0.3".into(),
            actor: MappedActor {
                object_type: None,
                account: Section::new(),
            },
            verb: MappedVerb {
                id: "https://lxp.education.gov.il/xapi/moe/verbs/played".into(),
                display: None,
            },
            object: MappedObject {
                object_type: None,
                id: "o".into(),
                definition: Section::new(),
            },
            result: None,
            context: None,
        }
    }

    #[test]
    fn routing_flags_default_to_enabled() {
        let service: ExternalService =
            serde_json::from_value(json!({"queue_url": "https://queue.example/moe"})).unwrap();
        assert!(service.send_to_lrs);
        assert!(service.send_to_queue);

        let service: ExternalService =
            serde_json::from_value(json!({"isSendToLRS": false, "isSendToSQS": true})).unwrap();
        assert!(!service.send_to_lrs);
        assert_eq!(service.queue_url, None);
    }

    #[test]
    fn envelope_carries_name_event_and_group() {
        let event = event();
        let envelope = QueueEnvelope {
            event_name: "edx.video.played",
            event: &event,
            message_group: Some("bio101"),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["event_name"], json!("edx.video.played"));
        assert_eq!(value["event"]["id"], json!("e-1"));
        assert_eq!(value["message_group"], json!("bio101"));
    }

    #[tokio::test]
    async fn missing_queue_url_fails_without_a_request() {
        let sender = HttpQueueSender::new().unwrap();
        let err = sender
            .send(&event(), "edx.video.played", &ExternalService::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotConfigured(_)));
        assert!(!err.is_retryable());
    }
}
