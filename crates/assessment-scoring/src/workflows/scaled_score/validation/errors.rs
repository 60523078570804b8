use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::domain::DifficultyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    MissingRequired,
    OutOfRange,
    WrongCount,
    PositionalMismatch,
    CrossFieldMismatch,
    InvalidEnum,
    InvalidType,
}

/// Message attached to a single field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

/// Path-addressed validation failures. Each path keeps the first error recorded for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorTree {
    errors: BTreeMap<String, FieldError>,
}

impl ErrorTree {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.errors.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn record(
        &mut self,
        path: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.entry(path.into()).or_insert_with(|| FieldError {
            kind,
            message: message.into(),
        });
    }

    /// Fold `other` in without replacing errors already recorded here.
    pub fn merge(&mut self, other: ErrorTree) {
        for (path, error) in other.errors {
            self.errors.entry(path).or_insert(error);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.errors
            .iter()
            .map(|(path, error)| (path.as_str(), error))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(path, error)| (path.clone(), error.message.clone()))
            .collect()
    }

    pub fn count_of(&self, kind: ValidationErrorKind) -> usize {
        self.errors
            .values()
            .filter(|error| error.kind == kind)
            .count()
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (path, error)) in self.errors.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{path}: {}", error.message)?;
        }
        Ok(())
    }
}

pub(crate) fn weight_path(level: DifficultyLevel) -> String {
    format!("difficulty_weights.{}", level.label())
}

pub(crate) fn unit_path(unit: usize, field: &str) -> String {
    format!("units[{unit}].{field}")
}

pub(crate) fn unit_root(unit: usize) -> String {
    format!("units[{unit}]")
}

pub(crate) fn section_path(unit: usize, section: usize, field: &str) -> String {
    format!("units[{unit}].sections[{section}].{field}")
}

pub(crate) fn section_root(unit: usize, section: usize) -> String {
    format!("units[{unit}].sections[{section}]")
}

pub(crate) fn mapping_entry_path(unit: usize, entry: usize, field: &str) -> String {
    format!("units[{unit}].mapping[{entry}].{field}")
}

pub(crate) fn mapping_entry_root(unit: usize, entry: usize) -> String {
    format!("units[{unit}].mapping[{entry}]")
}
