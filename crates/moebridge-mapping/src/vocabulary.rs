//! Verb and activity-type vocabulary of the MOE learning-record schema.

use std::collections::HashMap;
use std::sync::LazyLock;

const VERB_MAPPING: &[(&str, &str)] = &[
    (
        "http://adlnet.gov/expapi/verbs/registered",
        "https://lxp.education.gov.il/xapi/moe/verbs/join",
    ),
    (
        "http://id.tincanapi.com/verb/unregistered",
        "https://lxp.education.gov.il/xapi/moe/verbs/leave",
    ),
    (
        "http://adlnet.gov/expapi/verbs/attempted",
        "https://lxp.education.gov.il/xapi/moe/verbs/attempted",
    ),
    (
        "http://adlnet.gov/expapi/verbs/answered",
        "https://lxp.education.gov.il/xapi/moe/verbs/answered",
    ),
    (
        "https://w3id.org/xapi/acrossx/verbs/evaluated",
        "https://lxp.education.gov.il/xapi/moe/verbs/scored",
    ),
    (
        "http://adlnet.gov/expapi/verbs/completed",
        "https://lxp.education.gov.il/xapi/moe/verbs/completed",
    ),
    (
        "https://w3id.org/xapi/video/verbs/played",
        "https://lxp.education.gov.il/xapi/moe/verbs/played",
    ),
    (
        "https://w3id.org/xapi/video/verbs/paused",
        "https://lxp.education.gov.il/xapi/moe/verbs/paused",
    ),
    (
        "https://w3id.org/xapi/video/verbs/seeked",
        "https://lxp.education.gov.il/xapi/moe/verbs/watched",
    ),
];

const ACTIVITY_MAPPING: &[(&str, &str)] = &[
    (
        "http://adlnet.gov/expapi/activities/question",
        "https://lxp.education.gov.il/xapi/moe/activities/question",
    ),
    (
        "http://adlnet.gov/expapi/activities/cmi.interaction",
        "https://lxp.education.gov.il/xapi/moe/activities/question",
    ),
    (
        "https://w3id.org/xapi/video/activity-type/video",
        "https://lxp.education.gov.il/xapi/moe/activities/video",
    ),
    (
        "http://adlnet.gov/expapi/activities/course",
        "https://lxp.education.gov.il/xapi/moe/activities/course",
    ),
];

static MOE_VOCABULARY: LazyLock<Vocabulary> =
    LazyLock::new(|| Vocabulary::from_tables(VERB_MAPPING, ACTIVITY_MAPPING));

/// Immutable verb/activity translation tables.
///
/// Unknown identifiers are passed through untouched, so events carrying
/// vocabulary the partner does not know yet still arrive with their original
/// URIs.
#[derive(Debug)]
pub struct Vocabulary {
    verbs: HashMap<&'static str, &'static str>,
    activities: HashMap<&'static str, &'static str>,
}

impl Vocabulary {
    /// The process-wide MOE vocabulary.
    pub fn moe() -> &'static Vocabulary {
        &MOE_VOCABULARY
    }

    fn from_tables(
        verbs: &[(&'static str, &'static str)],
        activities: &[(&'static str, &'static str)],
    ) -> Self {
        Self {
            verbs: verbs.iter().copied().collect(),
            activities: activities.iter().copied().collect(),
        }
    }

    pub fn translate_verb<'a>(&'a self, verb_uri: &'a str) -> &'a str {
        self.verbs.get(verb_uri).copied().unwrap_or(verb_uri)
    }

    pub fn translate_activity_type<'a>(&'a self, type_uri: &'a str) -> &'a str {
        self.activities.get(type_uri).copied().unwrap_or(type_uri)
    }

    /// True iff the verb has a counterpart in the partner schema.
    pub fn is_relevant(&self, verb_uri: &str) -> bool {
        self.verbs.contains_key(verb_uri)
    }

    /// Verb pairs in table order.
    pub fn verbs(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        VERB_MAPPING.iter().copied()
    }
}
