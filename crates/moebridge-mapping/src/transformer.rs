//! CampusIL statement → MOE statement.

use crate::error::Result;
use crate::ids::{normalize_parent_ids, EventIds};
use crate::projection::{FieldKind, FieldSpec, Projector};
use crate::settings::MappingSettings;
use crate::vocabulary::Vocabulary;
use moebridge_core::event::{
    Agent, MappedActor, MappedContext, MappedContextActivities, MappedObject, MappedVerb,
};
use moebridge_core::{
    BlockTitleLookup, InstructorLookup, MappedEvent, NoLookup, RawEvent, Section,
};
use serde_json::Value;

const ACCOUNT_FIELDS: &FieldSpec = &[
    ("homePage", FieldKind::Identifier),
    ("name", FieldKind::Text),
];

const DEFINITION_FIELDS: &FieldSpec = &[
    ("type", FieldKind::Text),
    ("name", FieldKind::Language),
    ("description", FieldKind::Language),
];

const RESULT_FIELDS: &FieldSpec = &[
    ("success", FieldKind::Text),
    ("completion", FieldKind::Text),
    ("duration", FieldKind::Duration),
];

const SCORE_FIELDS: &FieldSpec = &[
    ("scaled", FieldKind::Text),
    ("raw", FieldKind::Text),
    ("min", FieldKind::Text),
    ("max", FieldKind::Text),
];

const PARENT_FIELDS: &FieldSpec = &[("id", FieldKind::Text), ("objectType", FieldKind::Text)];

const PARENT_DEFINITION_FIELDS: &FieldSpec =
    &[("name", FieldKind::Language), ("type", FieldKind::Text)];

/// Maps statements onto the MOE schema.
///
/// Holds only immutable state and thread-safe lookups, so one instance can
/// serve any number of concurrent callers.
pub struct EventTransformer {
    vocabulary: &'static Vocabulary,
    settings: MappingSettings,
    block_titles: Box<dyn BlockTitleLookup>,
    instructors: Box<dyn InstructorLookup>,
}

impl EventTransformer {
    /// A transformer without lookups: no block titles, no instructors.
    pub fn new(settings: MappingSettings) -> Self {
        Self {
            vocabulary: Vocabulary::moe(),
            settings,
            block_titles: Box::new(NoLookup),
            instructors: Box::new(NoLookup),
        }
    }

    #[must_use]
    pub fn with_block_titles(mut self, lookup: impl BlockTitleLookup + 'static) -> Self {
        self.block_titles = Box::new(lookup);
        self
    }

    #[must_use]
    pub fn with_instructors(mut self, lookup: impl InstructorLookup + 'static) -> Self {
        self.instructors = Box::new(lookup);
        self
    }

    /// Whether statements with this verb are worth transforming at all.
    pub fn is_relevant_event(&self, verb_uri: &str) -> bool {
        self.vocabulary.is_relevant(verb_uri)
    }

    /// Transforms a JSON statement, rejecting it when required keys are
    /// missing.
    pub fn transform_json(&self, raw: Value) -> Result<MappedEvent> {
        let event: RawEvent = serde_json::from_value(raw)?;
        Ok(self.transform(event))
    }

    pub fn transform_str(&self, raw: &str) -> Result<MappedEvent> {
        let event: RawEvent = serde_json::from_str(raw)?;
        Ok(self.transform(event))
    }

    pub fn transform(&self, mut raw: RawEvent) -> MappedEvent {
        normalize_parent_ids(&mut raw);

        let ids = EventIds::extract(&raw);
        tracing::info!(
            course_id = %ids.course_id,
            block_id = %ids.block_id,
            "mapping CampusIL statement"
        );

        let projector = Projector::new(&self.settings, self.block_titles.as_ref());
        let empty = Section::new();

        let actor = MappedActor {
            object_type: raw.actor.object_type().cloned(),
            account: projector.project_fields(
                raw.actor.account.as_ref().unwrap_or(&empty),
                ACCOUNT_FIELDS,
                None,
            ),
        };

        let mut object = MappedObject {
            object_type: raw.object.object_type().cloned(),
            id: raw.object.id.clone(),
            definition: projector.project_fields(
                raw.object.definition.as_ref().unwrap_or(&empty),
                DEFINITION_FIELDS,
                ids.block(),
            ),
        };

        let result = raw
            .result
            .as_ref()
            .map(|section| map_result(&projector, section));

        let parents: Vec<Section> = raw
            .parents()
            .iter()
            .map(|parent| map_parent(&projector, parent))
            .collect();

        let context = MappedContext {
            context_activities: (!parents.is_empty())
                .then_some(MappedContextActivities { parent: parents }),
            instructor: self.instructor(&ids.course_id),
        };

        let verb = MappedVerb {
            id: self.vocabulary.translate_verb(&raw.verb.id).to_string(),
            display: raw.verb.display,
        };

        if let Some(Value::String(activity_type)) = object.definition.get_mut("type") {
            let mapped = self
                .vocabulary
                .translate_activity_type(activity_type)
                .to_string();
            *activity_type = mapped;
        }

        MappedEvent {
            id: raw.id.unwrap_or_default(),
            timestamp: raw.timestamp.unwrap_or_default(),
            version: raw.version.unwrap_or_default(),
            actor,
            verb,
            object,
            result,
            context: (!context.is_empty()).then_some(context),
        }
    }

    fn instructor(&self, course_id: &str) -> Option<Agent> {
        if course_id.is_empty() {
            return None;
        }
        match self.instructors.instructor_id(course_id) {
            Ok(Some(anonymous_id)) if !anonymous_id.is_empty() => Some(Agent::with_account(
                self.settings.identifier_moe.clone(),
                anonymous_id,
            )),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(course_id, error = %e, "instructor lookup failed");
                None
            }
        }
    }
}

fn map_result(projector: &Projector<'_>, source: &Section) -> Section {
    let mut result = projector.project_fields(source, RESULT_FIELDS, None);

    if let Some(score) = source.get("score") {
        let score = score.as_object().cloned().unwrap_or_default();
        result.insert(
            "score".to_string(),
            Value::Object(projector.project_fields(&score, SCORE_FIELDS, None)),
        );
    }
    if let Some(extensions) = source.get("extensions") {
        result.insert("extensions".to_string(), extensions.clone());
    }

    result
}

fn map_parent(projector: &Projector<'_>, source: &Section) -> Section {
    let mut parent = projector.project_fields(source, PARENT_FIELDS, None);

    if let Some(definition) = source.get("definition") {
        let definition = definition.as_object().cloned().unwrap_or_default();
        parent.insert(
            "definition".to_string(),
            Value::Object(projector.project_fields(
                &definition,
                PARENT_DEFINITION_FIELDS,
                None,
            )),
        );
    }

    parent
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::language::LanguageMapPolicy;
    use moebridge_core::LookupError;
    use serde_json::json;

    fn settings() -> MappingSettings {
        MappingSettings {
            identifier_moe: "urn:moe".into(),
            identifier_campusil: "urn:campusil".into(),
            identifier_unknown: "urn:unknown".into(),
            extensions_time_key: "urn:time".into(),
            language_policy: LanguageMapPolicy::Single,
        }
    }

    struct OneInstructor;

    impl InstructorLookup for OneInstructor {
        fn instructor_id(&self, course_id: &str) -> std::result::Result<Option<String>, LookupError> {
            Ok((course_id == "course-v1:MOE+BIO+2024").then(|| "anon-77".to_string()))
        }
    }

    #[test]
    fn score_that_is_not_an_object_projects_to_empty() {
        let transformer = EventTransformer::new(settings());
        let mapped = transformer
            .transform_json(json!({
                "actor": {},
                "verb": {"id": "http://adlnet.gov/expapi/verbs/answered"},
                "object": {"id": "o"},
                "result": {"score": 7}
            }))
            .unwrap();
        let result = mapped.result.unwrap();
        assert_eq!(result["score"], json!({}));
        assert_eq!(result["duration"], json!("PT00.00S"));
    }

    #[test]
    fn instructor_attached_even_without_source_context() {
        let transformer = EventTransformer::new(settings()).with_instructors(OneInstructor);
        let mapped = transformer
            .transform_json(json!({
                "actor": {},
                "verb": {"id": "http://adlnet.gov/expapi/verbs/registered"},
                "object": {
                    "id": "https://campus.gov.il/courses/course-v1:MOE+BIO+2024",
                    "definition": {"type": "http://adlnet.gov/expapi/activities/course"}
                }
            }))
            .unwrap();

        let context = mapped.context.expect("instructor context");
        assert!(context.context_activities.is_none());
        assert_eq!(
            context.instructor,
            Some(Agent::with_account("urn:moe", "anon-77"))
        );
        assert_eq!(
            mapped.object.definition["type"],
            json!("https://lxp.education.gov.il/xapi/moe/activities/course")
        );
    }

    #[test]
    fn required_keys_are_enforced() {
        let transformer = EventTransformer::new(settings());
        let err = transformer
            .transform_json(json!({"verb": {"id": "v"}, "object": {"id": "o"}}))
            .unwrap_err();
        assert!(matches!(err, crate::MappingError::NotTransformable(_)));
        assert!(transformer.transform_str("not json").is_err());
    }

    #[test]
    fn transformer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EventTransformer>();
    }
}
