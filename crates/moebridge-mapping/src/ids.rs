//! Course and block ids recovered from statement URLs.

use moebridge_core::RawEvent;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Marker of an Open edX block usage key inside an object id.
const BLOCK_MARKER: &str = "block-v1";
const CCX_PREFIX: &str = "ccx-";

#[allow(clippy::expect_used)]
static CCX_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ccx@\d+").expect("invalid regex"));

/// Ids the enrichment steps key their lookups on. Empty when not derivable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventIds {
    pub course_id: String,
    pub block_id: String,
}

/// A block inside a course, both ids present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef<'a> {
    pub course_id: &'a str,
    pub block_id: &'a str,
}

impl EventIds {
    pub fn extract(event: &RawEvent) -> Self {
        Self {
            course_id: extract_course_id(event),
            block_id: extract_block_id(&event.object.id),
        }
    }

    /// The block reference, if both ids could be derived.
    pub fn block(&self) -> Option<BlockRef<'_>> {
        if self.course_id.is_empty() || self.block_id.is_empty() {
            return None;
        }
        Some(BlockRef {
            course_id: &self.course_id,
            block_id: &self.block_id,
        })
    }
}

/// Rewrites `/course/` to `/courses/` in every parent activity id.
pub fn normalize_parent_ids(event: &mut RawEvent) {
    let Some(parents) = event.parents_mut() else {
        return;
    };
    for parent in parents {
        if let Some(Value::String(id)) = parent.get_mut("id") {
            if id.contains("/course/") {
                *id = id.replace("/course/", "/courses/");
            }
        }
    }
}

/// The course key: the object's own when it is a course, otherwise the first
/// parent activity's.
pub fn extract_course_id(event: &RawEvent) -> String {
    let url = if event.object.is_course() {
        Some(event.object.id.as_str())
    } else {
        event
            .parents()
            .first()
            .and_then(|p| p.get("id"))
            .and_then(Value::as_str)
    };
    url.map(last_segment).unwrap_or_default().to_string()
}

/// The canonical block usage key of a block-scoped object id.
///
/// CCX variants carry a `ccx-` prefix and a `+ccx@<n>` marker; both are
/// removed so the key matches the master course's block.
pub fn extract_block_id(object_id: &str) -> String {
    if !object_id.contains(BLOCK_MARKER) {
        return String::new();
    }
    let segment = CCX_SUFFIX.replace_all(last_segment(object_id), "");
    segment
        .strip_prefix(CCX_PREFIX)
        .unwrap_or(&*segment)
        .to_string()
}

fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
