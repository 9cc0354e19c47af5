use moebridge_core::{BlockTitleLookup, InstructorLookup, LookupError};
use moebridge_mapping::{EventTransformer, LanguageMapPolicy, MappingSettings};
use serde_json::{json, Value};
use std::collections::HashMap;

const TIME_EXTENSION: &str = "https://campus.gov.il/xapi/extensions/time";

fn settings(policy: LanguageMapPolicy) -> MappingSettings {
    MappingSettings {
        identifier_moe: "https://moe.gov.il/identifiers/idm".into(),
        identifier_campusil: "https://campus.gov.il/identifiers/user".into(),
        identifier_unknown: "https://campus.gov.il/identifiers/unknown".into(),
        extensions_time_key: TIME_EXTENSION.into(),
        language_policy: policy,
    }
}

struct Titles(HashMap<String, String>);

impl BlockTitleLookup for Titles {
    fn block_title(&self, _course_id: &str, block_id: &str) -> Result<Option<String>, LookupError> {
        Ok(self.0.get(block_id).cloned())
    }
}

struct Instructors(HashMap<String, String>);

impl InstructorLookup for Instructors {
    fn instructor_id(&self, course_id: &str) -> Result<Option<String>, LookupError> {
        Ok(self.0.get(course_id).cloned())
    }
}

fn video_statement() -> Value {
    json!({
        "id": "7b6a0c1e-30f1-4c57-9d4a-4f2f3f7f1b11",
        "timestamp": "2024-03-01T09:15:00.000Z",
        "version": "1.0.3",
        "actor": {
            "objectType": "Agent",
            "account": {"homePage": "https://campus.gov.il", "name": "305123456"}
        },
        "verb": {
            "id": "https://w3id.org/xapi/video/verbs/seeked",
            "display": {"en": "seeked"}
        },
        "object": {
            "object_type": "Activity",
            "id": "https://campus.gov.il/xblock/ccx-block-v1:MOE+BIO101+2024+ccx@17+type@video+block@intro",
            "definition": {"type": "https://w3id.org/xapi/video/activity-type/video"}
        },
        "result": {
            "extensions": {
                "https://w3id.org/xapi/video/extensions/time-from": 12.5,
                TIME_EXTENSION: 3725
            }
        },
        "context": {
            "contextActivities": {
                "parent": [
                    {
                        "id": "https://campus.gov.il/course/course-v1:MOE+BIO101+2024",
                        "objectType": "Activity",
                        "definition": {
                            "name": {"en-US": "ביולוגיה לכיתה י"},
                            "type": "http://adlnet.gov/expapi/activities/course"
                        }
                    }
                ]
            }
        }
    })
}

fn transformer(policy: LanguageMapPolicy) -> EventTransformer {
    EventTransformer::new(settings(policy))
        .with_block_titles(Titles(HashMap::from([(
            "block-v1:MOE+BIO101+2024+type@video+block@intro".to_string(),
            "סרטון פתיחה".to_string(),
        )])))
        .with_instructors(Instructors(HashMap::from([(
            "course-v1:MOE+BIO101+2024".to_string(),
            "a1b2c3d4".to_string(),
        )])))
}

#[test]
fn completed_statement_without_result_or_context() {
    let mapped = transformer(LanguageMapPolicy::Single)
        .transform_json(json!({
            "id": "e-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "version": "1.0.3",
            "actor": {"objectType": "Agent", "account": {"homePage": "https://campus.gov.il", "name": "12345"}},
            "verb": {"id": "http://adlnet.gov/expapi/verbs/completed", "display": {"en-US": "completed"}},
            "object": {"objectType": "Activity", "id": "https://campus.gov.il/xblock/unit-1", "definition": {}}
        }))
        .expect("statement should transform");

    let value = serde_json::to_value(&mapped).expect("mapped event serializes");
    assert_eq!(
        value["verb"]["id"],
        json!("https://lxp.education.gov.il/xapi/moe/verbs/completed")
    );
    assert_eq!(value["verb"]["display"], json!({"en-US": "completed"}));
    assert!(value.get("result").is_none());
    assert!(value.get("context").is_none());
    assert_eq!(
        value["actor"]["account"],
        json!({"homePage": "https://moe.gov.il/identifiers/idm", "name": "12345"})
    );
    assert_eq!(value["object"]["definition"], json!({}));
}

#[test]
fn video_statement_is_fully_enriched() {
    let mapped = transformer(LanguageMapPolicy::Single)
        .transform_json(video_statement())
        .expect("statement should transform");
    let value = serde_json::to_value(&mapped).expect("mapped event serializes");

    assert_eq!(
        value,
        json!({
            "id": "7b6a0c1e-30f1-4c57-9d4a-4f2f3f7f1b11",
            "timestamp": "2024-03-01T09:15:00.000Z",
            "version": "1.0.3",
            "actor": {
                "objectType": "Agent",
                "account": {"homePage": "https://moe.gov.il/identifiers/idm", "name": "305123456"}
            },
            "verb": {
                "id": "https://lxp.education.gov.il/xapi/moe/verbs/watched",
                "display": {"en": "seeked"}
            },
            "object": {
                "objectType": "Activity",
                "id": "https://campus.gov.il/xblock/ccx-block-v1:MOE+BIO101+2024+ccx@17+type@video+block@intro",
                "definition": {
                    "type": "https://lxp.education.gov.il/xapi/moe/activities/video",
                    "name": {"he": "סרטון פתיחה"},
                    "description": {"he": "סרטון פתיחה"}
                }
            },
            "result": {
                "duration": "PT1H02M05.00S",
                "extensions": {
                    "https://w3id.org/xapi/video/extensions/time-from": 12.5,
                    TIME_EXTENSION: 3725
                }
            },
            "context": {
                "contextActivities": {
                    "parent": [{
                        "id": "https://campus.gov.il/courses/course-v1:MOE+BIO101+2024",
                        "objectType": "Activity",
                        "definition": {
                            "name": {"he": "ביולוגיה לכיתה י"},
                            "type": "http://adlnet.gov/expapi/activities/course"
                        }
                    }]
                },
                "instructor": {
                    "objectType": "Agent",
                    "account": {"homePage": "https://moe.gov.il/identifiers/idm", "name": "a1b2c3d4"}
                }
            }
        })
    );
}

#[test]
fn result_extensions_are_copied_verbatim() {
    let source = video_statement();
    let mapped = transformer(LanguageMapPolicy::Single)
        .transform_json(source.clone())
        .expect("statement should transform");
    let result = mapped.result.expect("result present");
    assert_eq!(result["extensions"], source["result"]["extensions"]);
}

#[test]
fn score_is_projected_when_present() {
    let mapped = transformer(LanguageMapPolicy::Single)
        .transform_json(json!({
            "actor": {"objectType": "Agent", "account": {"homePage": "https://campus.gov.il", "name": "ff00aa"}},
            "verb": {"id": "https://w3id.org/xapi/acrossx/verbs/evaluated"},
            "object": {
                "id": "https://campus.gov.il/xblock/block-v1:MOE+BIO101+2024+type@problem+block@q1",
                "definition": {
                    "type": "http://adlnet.gov/expapi/activities/cmi.interaction",
                    "name": {"en-US": "Question 1"}
                }
            },
            "result": {
                "success": true,
                "completion": true,
                "duration": "PT30S",
                "score": {"scaled": 0.5, "raw": 1, "min": 0, "max": 2, "weight": 3}
            }
        }))
        .expect("statement should transform");

    let value = serde_json::to_value(&mapped).expect("mapped event serializes");
    assert_eq!(
        value["actor"]["account"]["homePage"],
        json!("https://campus.gov.il/identifiers/user")
    );
    assert_eq!(
        value["object"]["definition"],
        json!({
            "type": "https://lxp.education.gov.il/xapi/moe/activities/question",
            "name": {"en": "Question 1"}
        })
    );
    assert_eq!(
        value["result"],
        json!({
            "success": true,
            "completion": true,
            "duration": "PT30S",
            "score": {"scaled": 0.5, "raw": 1, "min": 0, "max": 2}
        })
    );
    assert!(value.get("context").is_none());
}

#[test]
fn per_language_policy_keeps_both_translations() {
    let mut source = video_statement();
    source["object"]["definition"]["name"] = json!({"en-US": "Opening video", "he-IL": "סרטון פתיחה"});

    let single = transformer(LanguageMapPolicy::Single)
        .transform_json(source.clone())
        .expect("statement should transform");
    assert_eq!(single.object.definition["name"], json!({"he": "סרטון פתיחה"}));

    let multi = transformer(LanguageMapPolicy::PerLanguage)
        .transform_json(source)
        .expect("statement should transform");
    assert_eq!(
        multi.object.definition["name"],
        json!({"en": "Opening video", "he": "סרטון פתיחה"})
    );
}

#[test]
fn unmapped_vocabulary_passes_through_and_is_not_relevant() {
    let transformer = transformer(LanguageMapPolicy::Single);
    let verb = "http://adlnet.gov/expapi/verbs/experienced";
    assert!(!transformer.is_relevant_event(verb));
    assert!(transformer.is_relevant_event("https://w3id.org/xapi/video/verbs/played"));

    let mapped = transformer
        .transform_json(json!({
            "actor": {},
            "verb": {"id": verb},
            "object": {"id": "o", "definition": {"type": "http://adlnet.gov/expapi/activities/lesson"}}
        }))
        .expect("statement should transform");
    assert_eq!(mapped.verb.id, verb);
    assert_eq!(
        mapped.object.definition["type"],
        json!("http://adlnet.gov/expapi/activities/lesson")
    );
    assert_eq!(mapped.actor.account.len(), 0);
    assert_eq!(mapped.id, "");
}
