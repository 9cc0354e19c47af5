//! File-backed lookup store with block titles and course staff.

use moebridge_core::{BlockTitleLookup, InstructorLookup, LookupError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const STAFF_ROLE: &str = "staff";
/// Staff accounts on this domain belong to the platform, not to an instructor.
const PLATFORM_EMAIL_DOMAIN: &str = "campus.gov.il";
const MOE_IDM_UID_PREFIX: &str = "moe-edu-idm:";

/// Course staff member as exported from the LMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub email: String,
    pub role: String,
    /// Single-sign-on identities, e.g. `moe-edu-idm:<anonymized id>`.
    #[serde(default)]
    pub social_uids: Vec<String>,
}

impl StaffMember {
    fn is_instructor(&self) -> bool {
        self.role == STAFF_ROLE && !self.email.ends_with(PLATFORM_EMAIL_DOMAIN)
    }

    fn moe_identity(&self) -> Option<&str> {
        self.social_uids
            .iter()
            .find(|uid| uid.starts_with(MOE_IDM_UID_PREFIX))
            .and_then(|uid| uid.split(':').nth(1))
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Usage key → display name.
    #[serde(default)]
    pub blocks: HashMap<String, String>,
    /// Course id → staff in enrollment order.
    #[serde(default)]
    pub staff: HashMap<String, Vec<StaffMember>>,
}

impl Catalog {
    pub fn from_json_str(raw: &str) -> Result<Self, LookupError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, LookupError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl BlockTitleLookup for Catalog {
    fn block_title(&self, _course_id: &str, block_id: &str) -> Result<Option<String>, LookupError> {
        Ok(self.blocks.get(block_id).cloned())
    }
}

impl InstructorLookup for Catalog {
    /// Anonymized MOE id of the course's first instructor, if that instructor
    /// signed in through the MOE identity provider.
    fn instructor_id(&self, course_id: &str) -> Result<Option<String>, LookupError> {
        let instructor = self
            .staff
            .get(course_id)
            .and_then(|members| members.iter().find(|m| m.is_instructor()));

        Ok(instructor
            .and_then(StaffMember::moe_identity)
            .map(str::to_string))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "blocks": {
            "block-v1:MOE+BIO101+2024+type@video+block@intro": "סרטון פתיחה"
        },
        "staff": {
            "course-v1:MOE+BIO101+2024": [
                {"email": "admin@campus.gov.il", "role": "staff", "social_uids": ["moe-edu-idm:platform"]},
                {"email": "dana@school.org.il", "role": "instructor", "social_uids": ["moe-edu-idm:wrong-role"]},
                {"email": "dana@school.org.il", "role": "staff", "social_uids": ["google:123", "moe-edu-idm:a1b2c3d4"]}
            ],
            "course-v1:MOE+CHEM+2024": [
                {"email": "avi@school.org.il", "role": "staff", "social_uids": ["google:456"]}
            ]
        }
    }"#;

    #[test]
    fn block_titles_come_from_the_block_table() {
        let catalog = Catalog::from_json_str(CATALOG).unwrap();
        assert_eq!(
            catalog
                .block_title("ignored", "block-v1:MOE+BIO101+2024+type@video+block@intro")
                .unwrap()
                .as_deref(),
            Some("סרטון פתיחה")
        );
        assert_eq!(catalog.block_title("ignored", "block-v1:nope").unwrap(), None);
    }

    #[test]
    fn instructor_is_first_non_platform_staff_with_moe_identity() {
        let catalog = Catalog::from_json_str(CATALOG).unwrap();
        assert_eq!(
            catalog
                .instructor_id("course-v1:MOE+BIO101+2024")
                .unwrap()
                .as_deref(),
            Some("a1b2c3d4")
        );
    }

    #[test]
    fn instructor_without_moe_identity_is_a_miss() {
        let catalog = Catalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.instructor_id("course-v1:MOE+CHEM+2024").unwrap(), None);
        assert_eq!(catalog.instructor_id("course-v1:unknown").unwrap(), None);
    }

    #[test]
    fn empty_and_corrupt_catalogs() {
        assert_eq!(Catalog::from_json_str("{}").unwrap(), Catalog::default());
        assert!(matches!(
            Catalog::from_json_str(r#"{"blocks": []}"#),
            Err(LookupError::Corrupt(_))
        ));
    }
}
