use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Assessment family driving both the defaults and the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Profile {
    Generic,
    Sat,
    Act,
}

impl Profile {
    pub const fn ordered() -> [Self; 3] {
        [Self::Generic, Self::Sat, Self::Act]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::Sat => "SAT",
            Self::Act => "ACT",
        }
    }

    /// Case-insensitive lookup used by the CLI, routes and document decoding.
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|profile| profile.label().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationType {
    Category,
    Section,
}

impl ConfigurationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Section => "Section",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        [Self::Category, Self::Section]
            .into_iter()
            .find(|kind| kind.label() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationStrategy {
    Sum,
    Average,
}

impl AggregationStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Average => "Average",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        [Self::Sum, Self::Average]
            .into_iter()
            .find(|strategy| strategy.label() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringStrategy {
    #[serde(rename = "Weighted_Mean")]
    WeightedMean,
    #[serde(rename = "Mapped_Score")]
    MappedScore,
}

impl ScoringStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WeightedMean => "Weighted_Mean",
            Self::MappedScore => "Mapped_Score",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        [Self::WeightedMean, Self::MappedScore]
            .into_iter()
            .find(|strategy| strategy.label() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[serde(rename = "No Difficulty")]
    NoDifficulty,
    #[serde(rename = "Very Easy")]
    VeryEasy,
    Easy,
    Medium,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
}

impl DifficultyLevel {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::NoDifficulty,
            Self::VeryEasy,
            Self::Easy,
            Self::Medium,
            Self::Hard,
            Self::VeryHard,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoDifficulty => "No Difficulty",
            Self::VeryEasy => "Very Easy",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::VeryHard => "Very Hard",
        }
    }

    const fn default_weight(self) -> f64 {
        match self {
            Self::NoDifficulty => 0.0,
            Self::VeryEasy => 0.2,
            Self::Easy => 0.4,
            Self::Medium => 0.6,
            Self::Hard => 0.8,
            Self::VeryHard => 1.0,
        }
    }
}

/// Weight per difficulty label. Always carried; only consulted under Weighted_Mean scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyWeights {
    #[serde(rename = "No Difficulty")]
    pub no_difficulty: Option<f64>,
    #[serde(rename = "Very Easy")]
    pub very_easy: Option<f64>,
    #[serde(rename = "Easy")]
    pub easy: Option<f64>,
    #[serde(rename = "Medium")]
    pub medium: Option<f64>,
    #[serde(rename = "Hard")]
    pub hard: Option<f64>,
    #[serde(rename = "Very Hard")]
    pub very_hard: Option<f64>,
}

impl DifficultyWeights {
    pub const fn empty() -> Self {
        Self {
            no_difficulty: None,
            very_easy: None,
            easy: None,
            medium: None,
            hard: None,
            very_hard: None,
        }
    }

    pub fn get(&self, level: DifficultyLevel) -> Option<f64> {
        match level {
            DifficultyLevel::NoDifficulty => self.no_difficulty,
            DifficultyLevel::VeryEasy => self.very_easy,
            DifficultyLevel::Easy => self.easy,
            DifficultyLevel::Medium => self.medium,
            DifficultyLevel::Hard => self.hard,
            DifficultyLevel::VeryHard => self.very_hard,
        }
    }

    pub fn set(&mut self, level: DifficultyLevel, weight: Option<f64>) {
        let slot = match level {
            DifficultyLevel::NoDifficulty => &mut self.no_difficulty,
            DifficultyLevel::VeryEasy => &mut self.very_easy,
            DifficultyLevel::Easy => &mut self.easy,
            DifficultyLevel::Medium => &mut self.medium,
            DifficultyLevel::Hard => &mut self.hard,
            DifficultyLevel::VeryHard => &mut self.very_hard,
        };
        *slot = weight;
    }

    pub fn iter(&self) -> impl Iterator<Item = (DifficultyLevel, Option<f64>)> + '_ {
        DifficultyLevel::ordered()
            .into_iter()
            .map(move |level| (level, self.get(level)))
    }
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        let mut weights = Self::empty();
        for level in DifficultyLevel::ordered() {
            weights.set(level, Some(level.default_weight()));
        }
        weights
    }
}

/// Catalog entry describing a block of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub id: Option<u32>,
    pub question_count: Option<u32>,
}

impl Section {
    pub fn new(name: impl Into<String>, id: u32, question_count: u32) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
            question_count: Some(question_count),
        }
    }
}

/// One row of a raw-to-scaled score lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub score: f64,
    pub value: f64,
}

/// Named scoring component of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub max_score: Option<f64>,
    pub min_score: Option<f64>,
    /// Derived from `sections`; see `derive::recompute_question_counts`.
    pub no_of_questions: u32,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<MappingEntry>>,
}

impl Unit {
    /// Shape appended by an explicit "add unit" action.
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            max_score: Some(0.0),
            min_score: Some(0.0),
            no_of_questions: 0,
            sections: Vec::new(),
            mapping: None,
        }
    }

    pub fn section_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.sections.iter().filter_map(|section| section.id)
    }
}

/// Root entity edited by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub assessment_name: String,
    pub profile: Profile,
    pub configuration_type: Option<ConfigurationType>,
    pub score_aggregation_strategy: Option<AggregationStrategy>,
    pub scoring_strategy: Option<ScoringStrategy>,
    #[serde(default)]
    pub difficulty_weights: DifficultyWeights,
    pub scaled_score_step_size: Option<f64>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Configuration {
    pub fn named(assessment_name: impl Into<String>) -> Self {
        Self {
            assessment_name: assessment_name.into(),
            ..Self::default()
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            assessment_name: "assessment".to_string(),
            profile: Profile::Generic,
            configuration_type: Some(ConfigurationType::Category),
            score_aggregation_strategy: Some(AggregationStrategy::Sum),
            scoring_strategy: Some(ScoringStrategy::WeightedMean),
            difficulty_weights: DifficultyWeights::default(),
            scaled_score_step_size: Some(1.0),
            units: Vec::new(),
        }
    }
}

/// Sum of section question counts, saturating at `u32::MAX`.
pub fn derived_question_count(unit: &Unit) -> u32 {
    checked_question_count(unit).unwrap_or(u32::MAX)
}

/// Sum of section question counts, or `None` when it does not fit in a `u32`.
pub fn checked_question_count(unit: &Unit) -> Option<u32> {
    unit.sections
        .iter()
        .filter_map(|section| section.question_count)
        .try_fold(0u32, u32::checked_add)
}

/// Catalog sections not referenced by any unit, in catalog order.
pub fn unassigned_sections<'a>(catalog: &'a [Section], units: &[Unit]) -> Vec<&'a Section> {
    let assigned: HashSet<u32> = units.iter().flat_map(Unit::section_ids).collect();
    catalog
        .iter()
        .filter(|section| section.id.map_or(true, |id| !assigned.contains(&id)))
        .collect()
}
