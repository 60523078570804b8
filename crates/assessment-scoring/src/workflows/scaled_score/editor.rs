use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::SectionCatalog;
use super::defaults::apply_profile;
use super::derive::recompute_question_counts;
use super::domain::{
    AggregationStrategy, Configuration, ConfigurationType, DifficultyLevel, MappingEntry, Profile,
    ScoringStrategy, Section, Unit,
};
use super::validation::{validate, ErrorTree};

/// Stable identity for a unit within one editing session. Indices shift on removal; keys do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKey(pub u64);

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Discrete operator edits. Each one yields a new configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditAction {
    SelectProfile {
        profile: Profile,
    },
    RenameAssessment {
        name: String,
    },
    SetConfigurationType {
        value: Option<ConfigurationType>,
    },
    SetScoreAggregation {
        value: Option<AggregationStrategy>,
    },
    SetScoringStrategy {
        value: Option<ScoringStrategy>,
    },
    SetStepSize {
        value: Option<f64>,
    },
    SetDifficultyWeight {
        level: DifficultyLevel,
        weight: Option<f64>,
    },
    AddUnit,
    RemoveUnit {
        key: UnitKey,
    },
    RenameUnit {
        key: UnitKey,
        name: String,
    },
    SetScoreBounds {
        key: UnitKey,
        max_score: Option<f64>,
        min_score: Option<f64>,
    },
    AssignSections {
        key: UnitKey,
        section_ids: Vec<u32>,
    },
    ApplyMapping {
        key: UnitKey,
        mapping: Vec<MappingEntry>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Applied,
    /// The action described the current state already.
    Unchanged,
    /// The target unit no longer exists; nothing was changed.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("{0} does not exist")]
    UnknownUnit(UnitKey),
    #[error("section {0} is not in the catalog")]
    UnknownSection(u32),
    #[error("section {section_id} is already assigned to {owner}")]
    SectionUnavailable { section_id: u32, owner: UnitKey },
    #[error("section {0} was selected more than once")]
    DuplicateSection(u32),
}

/// Read model handed to callers after every action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSnapshot {
    pub revision: u64,
    pub configuration: Configuration,
    pub unit_keys: Vec<UnitKey>,
    pub unassigned_sections: Vec<Section>,
}

/// Single owner of one configuration. All mutations flow through [`ConfigurationEditor::apply`].
#[derive(Debug, Clone)]
pub struct ConfigurationEditor {
    catalog: Arc<SectionCatalog>,
    configuration: Configuration,
    unit_keys: Vec<UnitKey>,
    next_key: u64,
    revision: u64,
}

impl ConfigurationEditor {
    pub fn new(catalog: Arc<SectionCatalog>) -> Self {
        Self::with_configuration(catalog, Configuration::default())
    }

    pub fn with_configuration(catalog: Arc<SectionCatalog>, configuration: Configuration) -> Self {
        let mut editor = Self {
            catalog,
            configuration,
            unit_keys: Vec::new(),
            next_key: 1,
            revision: 0,
        };
        editor.rekey_units();
        recompute_question_counts(&mut editor.configuration.units);
        editor
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    pub fn unit_keys(&self) -> &[UnitKey] {
        &self.unit_keys
    }

    pub fn key_at(&self, index: usize) -> Option<UnitKey> {
        self.unit_keys.get(index).copied()
    }

    pub fn index_of(&self, key: UnitKey) -> Option<usize> {
        self.unit_keys.iter().position(|candidate| *candidate == key)
    }

    pub fn unit(&self, key: UnitKey) -> Option<&Unit> {
        self.index_of(key)
            .and_then(|index| self.configuration.units.get(index))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn unassigned_sections(&self) -> Vec<Section> {
        self.catalog.unassigned(&self.configuration.units)
    }

    pub fn validate(&self) -> ErrorTree {
        validate(&self.configuration)
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            revision: self.revision,
            configuration: self.configuration.clone(),
            unit_keys: self.unit_keys.clone(),
            unassigned_sections: self.unassigned_sections(),
        }
    }

    pub fn apply(&mut self, action: EditAction) -> Result<EditOutcome, EditError> {
        let outcome = match action {
            EditAction::SelectProfile { profile } => self.select_profile(profile),
            EditAction::RenameAssessment { name } => {
                self.configuration.assessment_name = name;
                EditOutcome::Applied
            }
            EditAction::SetConfigurationType { value } => {
                self.configuration.configuration_type = value;
                EditOutcome::Applied
            }
            EditAction::SetScoreAggregation { value } => {
                self.configuration.score_aggregation_strategy = value;
                EditOutcome::Applied
            }
            EditAction::SetScoringStrategy { value } => {
                self.configuration.scoring_strategy = value;
                EditOutcome::Applied
            }
            EditAction::SetStepSize { value } => {
                self.configuration.scaled_score_step_size = value;
                EditOutcome::Applied
            }
            EditAction::SetDifficultyWeight { level, weight } => {
                self.configuration.difficulty_weights.set(level, weight);
                EditOutcome::Applied
            }
            EditAction::AddUnit => {
                self.configuration.units.push(Unit::blank());
                let key = self.issue_key();
                self.unit_keys.push(key);
                EditOutcome::Applied
            }
            EditAction::RemoveUnit { key } => {
                let index = self.require(key)?;
                self.configuration.units.remove(index);
                self.unit_keys.remove(index);
                EditOutcome::Applied
            }
            EditAction::RenameUnit { key, name } => {
                let index = self.require(key)?;
                self.configuration.units[index].name = name;
                EditOutcome::Applied
            }
            EditAction::SetScoreBounds {
                key,
                max_score,
                min_score,
            } => {
                let index = self.require(key)?;
                let unit = &mut self.configuration.units[index];
                unit.max_score = max_score;
                unit.min_score = min_score;
                EditOutcome::Applied
            }
            EditAction::AssignSections { key, section_ids } => {
                self.assign_sections(key, &section_ids)?
            }
            EditAction::ApplyMapping { key, mapping } => match self.index_of(key) {
                Some(index) => {
                    self.configuration.units[index].mapping = Some(mapping);
                    EditOutcome::Applied
                }
                None => {
                    debug!(%key, "mapping discarded for removed unit");
                    EditOutcome::Discarded
                }
            },
        };

        if outcome == EditOutcome::Applied {
            recompute_question_counts(&mut self.configuration.units);
            self.revision += 1;
        }

        Ok(outcome)
    }

    fn select_profile(&mut self, profile: Profile) -> EditOutcome {
        if self.configuration.profile == profile {
            return EditOutcome::Unchanged;
        }

        self.configuration = apply_profile(&self.configuration, profile);
        self.rekey_units();
        EditOutcome::Applied
    }

    fn assign_sections(
        &mut self,
        key: UnitKey,
        section_ids: &[u32],
    ) -> Result<EditOutcome, EditError> {
        let index = self.require(key)?;

        let mut requested = HashSet::new();
        let mut sections = Vec::with_capacity(section_ids.len());
        for &id in section_ids {
            if !requested.insert(id) {
                return Err(EditError::DuplicateSection(id));
            }
            let section = self.catalog.get(id).ok_or(EditError::UnknownSection(id))?;
            if let Some(owner) = self.owner_of(id).filter(|owner| *owner != index) {
                return Err(EditError::SectionUnavailable {
                    section_id: id,
                    owner: self.unit_keys[owner],
                });
            }
            sections.push(section.clone());
        }

        self.configuration.units[index].sections = sections;
        Ok(EditOutcome::Applied)
    }

    fn owner_of(&self, section_id: u32) -> Option<usize> {
        self.configuration
            .units
            .iter()
            .position(|unit| unit.section_ids().any(|id| id == section_id))
    }

    fn require(&self, key: UnitKey) -> Result<usize, EditError> {
        self.index_of(key).ok_or(EditError::UnknownUnit(key))
    }

    fn issue_key(&mut self) -> UnitKey {
        let key = UnitKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn rekey_units(&mut self) {
        let count = self.configuration.units.len();
        let keys: Vec<UnitKey> = (0..count).map(|_| self.issue_key()).collect();
        self.unit_keys = keys;
    }
}
