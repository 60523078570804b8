use super::domain::{AggregationStrategy, ConfigurationType, Profile, ScoringStrategy, Unit};

/// Starting shape of a unit installed by a profile template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitTemplate {
    pub name: &'static str,
    pub max_score: f64,
    pub min_score: f64,
}

impl UnitTemplate {
    pub fn instantiate(&self) -> Unit {
        Unit {
            name: self.name.to_string(),
            max_score: Some(self.max_score),
            min_score: Some(self.min_score),
            no_of_questions: 0,
            sections: Vec::new(),
            mapping: None,
        }
    }
}

/// Field values and unit template a profile change installs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileBlueprint {
    pub profile: Profile,
    pub configuration_type: ConfigurationType,
    pub score_aggregation_strategy: AggregationStrategy,
    pub scoring_strategy: ScoringStrategy,
    pub scaled_score_step_size: f64,
    units: &'static [UnitTemplate],
}

const SAT_UNITS: [UnitTemplate; 2] = [
    UnitTemplate {
        name: "Reading and Writing",
        max_score: 800.0,
        min_score: 200.0,
    },
    UnitTemplate {
        name: "Math",
        max_score: 800.0,
        min_score: 200.0,
    },
];

const ACT_UNITS: [UnitTemplate; 4] = [
    UnitTemplate {
        name: "English",
        max_score: 36.0,
        min_score: 1.0,
    },
    UnitTemplate {
        name: "Math",
        max_score: 36.0,
        min_score: 1.0,
    },
    UnitTemplate {
        name: "Reading",
        max_score: 36.0,
        min_score: 1.0,
    },
    UnitTemplate {
        name: "Science",
        max_score: 36.0,
        min_score: 1.0,
    },
];

impl ProfileBlueprint {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Generic => Self {
                profile,
                configuration_type: ConfigurationType::Category,
                score_aggregation_strategy: AggregationStrategy::Sum,
                scoring_strategy: ScoringStrategy::WeightedMean,
                scaled_score_step_size: 1.0,
                units: &[],
            },
            Profile::Sat => Self {
                profile,
                configuration_type: ConfigurationType::Category,
                score_aggregation_strategy: AggregationStrategy::Sum,
                scoring_strategy: ScoringStrategy::WeightedMean,
                scaled_score_step_size: 10.0,
                units: &SAT_UNITS,
            },
            Profile::Act => Self {
                profile,
                configuration_type: ConfigurationType::Section,
                score_aggregation_strategy: AggregationStrategy::Average,
                scoring_strategy: ScoringStrategy::MappedScore,
                scaled_score_step_size: 1.0,
                units: &ACT_UNITS,
            },
        }
    }

    pub fn unit_templates(&self) -> &[UnitTemplate] {
        self.units
    }

    pub fn units(&self) -> Vec<Unit> {
        self.units.iter().map(UnitTemplate::instantiate).collect()
    }
}
