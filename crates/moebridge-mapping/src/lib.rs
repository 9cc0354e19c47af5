#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Mapping of CampusIL xAPI statements onto the MOE learning-record schema.
//!
//! The [`EventTransformer`] rewrites vocabulary through the [`Vocabulary`]
//! tables, re-tags language maps by script, classifies learner ids and fills
//! in course-derived fields (block titles, the course instructor) through the
//! lookup traits of `moebridge-core`.

pub mod duration;
pub mod error;
pub mod identifier;
pub mod ids;
pub mod language;
pub mod projection;
pub mod settings;
pub mod transformer;
pub mod vocabulary;

pub use duration::encode_duration;
pub use error::{MappingError, Result};
pub use identifier::{classify_identifier, IdentifierScheme};
pub use language::{detect_language, Language, LanguageMapPolicy, DEFAULT_TEXT};
pub use projection::{FieldKind, Projector};
pub use settings::MappingSettings;
pub use transformer::EventTransformer;
pub use vocabulary::Vocabulary;
