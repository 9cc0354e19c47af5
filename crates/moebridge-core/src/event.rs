//! xAPI statement shapes on both sides of the mapping.
//!
//! [`RawEvent`] is the statement as it leaves the LMS. Only the keys the
//! mapping cannot do without are mandatory (`actor`, `verb.id`, `object.id`);
//! deserialization fails for anything missing them, which is how malformed
//! input is caught before any mapping work starts.
//!
//! [`MappedEvent`] is the statement in the partner schema. Sections whose
//! content is decided field-by-field at mapping time (account, definition,
//! result, parent activities) are kept as ordered JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered JSON object, e.g. `actor.account` or `object.definition`.
pub type Section = Map<String, Value>;

/// Activity-type URI that marks an object as a whole course.
pub const COURSE_ACTIVITY_TYPE: &str = "http://adlnet.gov/expapi/activities/course";

/// A learning-activity statement as emitted by the source LMS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub actor: RawActor,
    pub verb: RawVerb,
    pub object: RawObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RawContext>,
}

/// Source systems spell the object type either `objectType` or `object_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawActor {
    #[serde(rename = "objectType", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<Value>,
    #[serde(rename = "object_type", default, skip_serializing_if = "Option::is_none")]
    pub object_type_snake: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Section>,
}

impl RawActor {
    /// The object type, preferring the `object_type` spelling when both exist.
    pub fn object_type(&self) -> Option<&Value> {
        self.object_type_snake
            .as_ref()
            .or(self.object_type.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawVerb {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawObject {
    pub id: String,
    #[serde(rename = "objectType", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<Value>,
    #[serde(rename = "object_type", default, skip_serializing_if = "Option::is_none")]
    pub object_type_snake: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Section>,
}

impl RawObject {
    /// The object type, preferring the `object_type` spelling when both exist.
    pub fn object_type(&self) -> Option<&Value> {
        self.object_type_snake
            .as_ref()
            .or(self.object_type.as_ref())
    }

    /// `definition.type` when it is a string.
    pub fn definition_type(&self) -> Option<&str> {
        self.definition
            .as_ref()
            .and_then(|d| d.get("type"))
            .and_then(Value::as_str)
    }

    /// Whether the object itself is a course rather than something inside one.
    pub fn is_course(&self) -> bool {
        self.definition_type() == Some(COURSE_ACTIVITY_TYPE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawContext {
    #[serde(
        rename = "contextActivities",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub context_activities: Option<RawContextActivities>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawContextActivities {
    /// Enclosing activities, outermost course first.
    #[serde(default)]
    pub parent: Vec<Section>,
}

impl RawEvent {
    /// Parent activities in source order; empty when the event has no context.
    pub fn parents(&self) -> &[Section] {
        self.context
            .as_ref()
            .and_then(|c| c.context_activities.as_ref())
            .map(|a| a.parent.as_slice())
            .unwrap_or_default()
    }

    pub fn parents_mut(&mut self) -> Option<&mut Vec<Section>> {
        self.context
            .as_mut()
            .and_then(|c| c.context_activities.as_mut())
            .map(|a| &mut a.parent)
    }
}

/// A statement in the partner schema, ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappedEvent {
    pub id: String,
    pub timestamp: String,
    pub version: String,
    pub actor: MappedActor,
    pub verb: MappedVerb,
    pub object: MappedObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MappedContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappedActor {
    #[serde(rename = "objectType", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<Value>,
    #[serde(default)]
    pub account: Section,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappedVerb {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappedObject {
    #[serde(rename = "objectType", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<Value>,
    pub id: String,
    #[serde(default)]
    pub definition: Section,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MappedContext {
    #[serde(
        rename = "contextActivities",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub context_activities: Option<MappedContextActivities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<Agent>,
}

impl MappedContext {
    /// A context holds nothing worth sending once both parts are absent.
    pub fn is_empty(&self) -> bool {
        self.context_activities.is_none() && self.instructor.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MappedContextActivities {
    #[serde(default)]
    pub parent: Vec<Section>,
}

/// An xAPI agent identified by an account on some home page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    #[serde(rename = "objectType")]
    pub object_type: String,
    pub account: AgentAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentAccount {
    #[serde(rename = "homePage")]
    pub home_page: String,
    pub name: String,
}

impl Agent {
    pub fn with_account(home_page: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type: "Agent".to_string(),
            account: AgentAccount {
                home_page: home_page.into(),
                name: name.into(),
            },
        }
    }
}
