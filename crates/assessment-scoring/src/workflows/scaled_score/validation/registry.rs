use super::super::domain::{AggregationStrategy, ConfigurationType, Profile, ScoringStrategy};

/// Values a profile pins for the scalar strategy fields. `None` leaves the field user-settable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarMandate {
    pub configuration_type: Option<ConfigurationType>,
    pub score_aggregation_strategy: Option<AggregationStrategy>,
    pub scoring_strategy: Option<ScoringStrategy>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitCountRule {
    Any,
    Exactly(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    AtLeast(f64),
    AtMost(f64),
    Exactly(f64),
}

impl ScoreBound {
    pub fn admits(self, value: f64) -> bool {
        match self {
            ScoreBound::AtLeast(min) => value >= min,
            ScoreBound::AtMost(max) => value <= max,
            ScoreBound::Exactly(expected) => value == expected,
        }
    }

    pub(crate) fn describe(self) -> String {
        match self {
            ScoreBound::AtLeast(min) => format!("must be at least {min}"),
            ScoreBound::AtMost(max) => format!("must not exceed {max}"),
            ScoreBound::Exactly(expected) => format!("must be exactly {expected}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionCountRule {
    AtLeast(usize),
    Exactly(usize),
}

impl SectionCountRule {
    pub fn admits(self, count: usize) -> bool {
        match self {
            SectionCountRule::AtLeast(min) => count >= min,
            SectionCountRule::Exactly(expected) => count == expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingRule {
    Unconstrained,
    Absent,
    /// Present, with one row per question of the owning unit.
    MatchesQuestionCount,
}

/// Rules every unit of a profile is checked against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRules {
    pub max_score: ScoreBound,
    pub min_score: ScoreBound,
    /// Whether an absent score bound is an error. A present bound is always checked.
    pub scores_required: bool,
    /// Expected `no_of_questions` by unit position. Positions past the end carry no rule.
    pub question_counts: Option<&'static [u32]>,
    pub sections: SectionCountRule,
    pub mapping: MappingRule,
}

impl UnitRules {
    pub fn expected_questions(&self, index: usize) -> Option<u32> {
        self.question_counts
            .and_then(|table| table.get(index))
            .copied()
    }
}

/// Complete structural constraint set for one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSet {
    pub profile: Profile,
    pub mandate: ScalarMandate,
    pub unit_count: UnitCountRule,
    pub units: UnitRules,
}

const SAT_QUESTION_COUNTS: [u32; 2] = [54, 44];
const ACT_QUESTION_COUNTS: [u32; 4] = [75, 60, 40, 40];

const GENERIC_RULES: RuleSet = RuleSet {
    profile: Profile::Generic,
    mandate: ScalarMandate {
        configuration_type: None,
        score_aggregation_strategy: None,
        scoring_strategy: None,
    },
    unit_count: UnitCountRule::Any,
    units: UnitRules {
        max_score: ScoreBound::AtLeast(1.0),
        min_score: ScoreBound::AtLeast(1.0),
        scores_required: false,
        question_counts: None,
        sections: SectionCountRule::AtLeast(1),
        mapping: MappingRule::Unconstrained,
    },
};

const SAT_RULES: RuleSet = RuleSet {
    profile: Profile::Sat,
    mandate: ScalarMandate {
        configuration_type: Some(ConfigurationType::Category),
        score_aggregation_strategy: Some(AggregationStrategy::Sum),
        scoring_strategy: Some(ScoringStrategy::WeightedMean),
    },
    unit_count: UnitCountRule::Exactly(2),
    units: UnitRules {
        max_score: ScoreBound::Exactly(800.0),
        min_score: ScoreBound::Exactly(200.0),
        scores_required: true,
        question_counts: Some(&SAT_QUESTION_COUNTS),
        sections: SectionCountRule::Exactly(2),
        mapping: MappingRule::Absent,
    },
};

const ACT_RULES: RuleSet = RuleSet {
    profile: Profile::Act,
    mandate: ScalarMandate {
        configuration_type: Some(ConfigurationType::Section),
        score_aggregation_strategy: Some(AggregationStrategy::Average),
        scoring_strategy: Some(ScoringStrategy::MappedScore),
    },
    unit_count: UnitCountRule::Exactly(4),
    units: UnitRules {
        max_score: ScoreBound::AtMost(36.0),
        min_score: ScoreBound::AtLeast(1.0),
        scores_required: true,
        question_counts: Some(&ACT_QUESTION_COUNTS),
        sections: SectionCountRule::Exactly(1),
        mapping: MappingRule::MatchesQuestionCount,
    },
};

impl RuleSet {
    pub const fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Generic => GENERIC_RULES,
            Profile::Sat => SAT_RULES,
            Profile::Act => ACT_RULES,
        }
    }

    pub const fn registry() -> [Self; 3] {
        [GENERIC_RULES, SAT_RULES, ACT_RULES]
    }
}
