//! Scaled score configuration: profile defaults, derived question counts, structural
//! validation, mapping table import, and serialized editing sessions.

mod blueprint;
pub mod catalog;
mod defaults;
mod derive;
pub mod document;
pub mod domain;
pub mod editor;
pub mod mapping;
pub mod router;
pub mod service;
pub mod session;
pub mod validation;

#[cfg(test)]
mod tests;

pub use blueprint::{ProfileBlueprint, UnitTemplate};
pub use catalog::{CatalogError, SectionCatalog};
pub use defaults::{apply_profile, defaults_for};
pub use derive::{recompute_question_counts, with_recomputed_counts};
pub use document::{decode_document, validate_document, DecodedDocument};
pub use domain::{
    checked_question_count, derived_question_count, unassigned_sections, AggregationStrategy,
    Configuration, ConfigurationType, DifficultyLevel, DifficultyWeights, MappingEntry, Profile,
    ScoringStrategy, Section, Unit,
};
pub use editor::{
    ConfigurationEditor, EditAction, EditError, EditOutcome, EditorSnapshot, UnitKey,
};
pub use mapping::{parse_mapping, MappingImportError, MappingImporter};
pub use router::scaled_score_router;
pub use service::{ScaledScoreService, ScaledScoreServiceError, SessionTicket};
pub use session::{EditResult, SessionError, SessionHandle, SessionId, SessionStore};
pub use validation::{
    validate, ConfigurationValidator, ErrorTree, FieldError, RuleSet, ValidationErrorKind,
};
