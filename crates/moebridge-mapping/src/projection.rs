//! Field-by-field projection of a statement section into the partner schema.

use crate::duration::{encode_duration, seconds_from_value};
use crate::identifier::classify_identifier;
use crate::ids::BlockRef;
use crate::language::{language_map_for, rekey_language_map};
use crate::settings::MappingSettings;
use moebridge_core::{BlockTitleLookup, Section};
use serde_json::Value;

/// How a projected field is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Copied verbatim when present.
    Text,
    /// A language map, re-keyed by detected language. When absent, filled
    /// from the block title if the statement points at a block.
    Language,
    /// Copied when present, otherwise computed from the section's time
    /// extension.
    Duration,
    /// Replaced by the identifier-scheme URI of the section's `name`.
    Identifier,
}

/// Ordered `(field name, kind)` pairs describing one output section.
pub type FieldSpec = [(&'static str, FieldKind)];

const EXTENSIONS: &str = "extensions";
const ACCOUNT_NAME: &str = "name";

pub struct Projector<'a> {
    settings: &'a MappingSettings,
    block_titles: &'a dyn BlockTitleLookup,
}

impl<'a> Projector<'a> {
    pub fn new(settings: &'a MappingSettings, block_titles: &'a dyn BlockTitleLookup) -> Self {
        Self {
            settings,
            block_titles,
        }
    }

    /// Builds an output section from `section` according to `fields`.
    ///
    /// Fields that are absent and cannot be derived are left out.
    pub fn project_fields(
        &self,
        section: &Section,
        fields: &FieldSpec,
        block: Option<BlockRef<'_>>,
    ) -> Section {
        let mut out = Section::new();

        for &(name, kind) in fields {
            let projected = match (section.get(name), kind) {
                (Some(value), FieldKind::Text | FieldKind::Duration) => Some(value.clone()),
                (Some(value), FieldKind::Language) => Some(Value::Object(rekey_language_map(
                    value,
                    self.settings.language_policy,
                ))),
                (Some(_), FieldKind::Identifier) => {
                    Some(Value::String(self.identifier_uri(section).to_string()))
                }
                (None, FieldKind::Duration) => Some(Value::String(encode_duration(
                    self.extension_seconds(section),
                ))),
                (None, FieldKind::Language) => {
                    block.map(|b| Value::Object(language_map_for(&self.block_title(b))))
                }
                (None, FieldKind::Text | FieldKind::Identifier) => None,
            };

            if let Some(value) = projected {
                out.insert(name.to_string(), value);
            }
        }

        out
    }

    fn identifier_uri(&self, section: &Section) -> &str {
        let raw = match section.get(ACCOUNT_NAME) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        self.settings.scheme_uri(classify_identifier(&raw))
    }

    fn extension_seconds(&self, section: &Section) -> u64 {
        seconds_from_value(
            section
                .get(EXTENSIONS)
                .and_then(|ext| ext.get(&self.settings.extensions_time_key)),
        )
    }

    fn block_title(&self, block: BlockRef<'_>) -> String {
        match self.block_titles.block_title(block.course_id, block.block_id) {
            Ok(title) => title.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    course_id = block.course_id,
                    block_id = block.block_id,
                    error = %e,
                    "block title lookup failed; using default text"
                );
                String::new()
            }
        }
    }
}
