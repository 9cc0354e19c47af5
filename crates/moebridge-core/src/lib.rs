//! Shared types for moebridge: the xAPI statement model and the collaborators
//! the mapping engine consults while enriching a statement.

pub mod error;
pub mod event;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

pub use error::{ConfigError, LookupError};
pub use event::{MappedEvent, RawEvent, Section};

/// Resolves the display title of a course block (xblock).
pub trait BlockTitleLookup: Send + Sync {
    fn block_title(&self, course_id: &str, block_id: &str) -> Result<Option<String>, LookupError>;
}

/// Resolves the anonymized identifier of a course's instructor.
pub trait InstructorLookup: Send + Sync {
    fn instructor_id(&self, course_id: &str) -> Result<Option<String>, LookupError>;
}

/// Flat key/value configuration source.
pub trait ConfigProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, or [`ConfigError::Missing`].
    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Parsed value for `key`, falling back to `default` when unset.
    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        Self: Sized,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
        }
    }

    /// Parsed value for a mandatory `key`.
    fn parse_required<T: FromStr>(&self, key: &str) -> Result<T, ConfigError>
    where
        Self: Sized,
    {
        let raw = self.require(key)?;
        raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        })
    }
}

/// Lookup that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl BlockTitleLookup for NoLookup {
    fn block_title(&self, _course_id: &str, _block_id: &str) -> Result<Option<String>, LookupError> {
        Ok(None)
    }
}

impl InstructorLookup for NoLookup {
    fn instructor_id(&self, _course_id: &str) -> Result<Option<String>, LookupError> {
        Ok(None)
    }
}

impl<T: BlockTitleLookup + ?Sized> BlockTitleLookup for Arc<T> {
    fn block_title(&self, course_id: &str, block_id: &str) -> Result<Option<String>, LookupError> {
        (**self).block_title(course_id, block_id)
    }
}

impl<T: InstructorLookup + ?Sized> InstructorLookup for Arc<T> {
    fn instructor_id(&self, course_id: &str) -> Result<Option<String>, LookupError> {
        (**self).instructor_id(course_id)
    }
}

impl ConfigProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
