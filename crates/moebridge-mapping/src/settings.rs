use crate::identifier::IdentifierScheme;
use crate::language::LanguageMapPolicy;
use moebridge_core::{ConfigError, ConfigProvider};

pub const MAPPING_IDENTIFIER_MOE: &str = "MAPPING_IDENTIFIER_MOE";
pub const MAPPING_IDENTIFIER_CAMPUSIL: &str = "MAPPING_IDENTIFIER_CAMPUSIL";
pub const MAPPING_IDENTIFIER_UNKNOWN: &str = "MAPPING_IDENTIFIER_UNKNOWN";
pub const MAPPING_EXTENSIONS_TIME: &str = "MAPPING_EXTENSIONS_TIME";
pub const MAPPING_LANGUAGE_MAP_POLICY: &str = "MAPPING_LANGUAGE_MAP_POLICY";

/// Mapping parameters resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSettings {
    /// Identifier-scheme URI for MOE-issued user ids.
    pub identifier_moe: String,
    /// Identifier-scheme URI for CampusIL-issued user ids.
    pub identifier_campusil: String,
    pub identifier_unknown: String,
    /// Result extension key holding the time spent, in seconds.
    pub extensions_time_key: String,
    pub language_policy: LanguageMapPolicy,
}

impl MappingSettings {
    pub fn from_provider(config: &impl ConfigProvider) -> Result<Self, ConfigError> {
        let language_policy = match config.get(MAPPING_LANGUAGE_MAP_POLICY) {
            None => LanguageMapPolicy::default(),
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: MAPPING_LANGUAGE_MAP_POLICY.to_string(),
                value: raw,
            })?,
        };

        Ok(Self {
            identifier_moe: config.require(MAPPING_IDENTIFIER_MOE)?,
            identifier_campusil: config.require(MAPPING_IDENTIFIER_CAMPUSIL)?,
            identifier_unknown: config.require(MAPPING_IDENTIFIER_UNKNOWN)?,
            extensions_time_key: config.require(MAPPING_EXTENSIONS_TIME)?,
            language_policy,
        })
    }

    /// The configured URI of an identifier scheme.
    pub fn scheme_uri(&self, scheme: IdentifierScheme) -> &str {
        match scheme {
            IdentifierScheme::Moe => &self.identifier_moe,
            IdentifierScheme::CampusIl => &self.identifier_campusil,
            IdentifierScheme::Unknown => &self.identifier_unknown,
        }
    }
}
