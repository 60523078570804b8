use std::collections::HashMap;

use super::super::domain::{checked_question_count, Configuration, Unit};
use super::errors::{
    section_path, unit_path, weight_path, ErrorTree, ValidationErrorKind as Kind,
};
use super::registry::{MappingRule, RuleSet, ScoreBound, SectionCountRule, UnitCountRule};

pub(crate) fn check_assessment_name(config: &Configuration, errors: &mut ErrorTree) {
    if config.assessment_name.trim().is_empty() {
        errors.record(
            "assessment_name",
            Kind::MissingRequired,
            "Assessment Name is required",
        );
    }
}

pub(crate) fn check_strategy_fields(
    config: &Configuration,
    rules: Option<&RuleSet>,
    errors: &mut ErrorTree,
) {
    let mandate = rules.map(|rules| rules.mandate);
    let profile = rules.map(|rules| rules.profile.label()).unwrap_or_default();

    check_mandated(
        "configuration_type",
        "Configuration Type",
        config.configuration_type.map(|value| value.label()),
        mandate.and_then(|mandate| mandate.configuration_type.map(|value| value.label())),
        profile,
        errors,
    );
    check_mandated(
        "score_aggregation_strategy",
        "Score Aggregation Strategy",
        config.score_aggregation_strategy.map(|value| value.label()),
        mandate.and_then(|mandate| mandate.score_aggregation_strategy.map(|value| value.label())),
        profile,
        errors,
    );
    check_mandated(
        "scoring_strategy",
        "Scoring Strategy",
        config.scoring_strategy.map(|value| value.label()),
        mandate.and_then(|mandate| mandate.scoring_strategy.map(|value| value.label())),
        profile,
        errors,
    );
}

fn check_mandated(
    path: &str,
    label: &str,
    actual: Option<&'static str>,
    mandated: Option<&'static str>,
    profile: &str,
    errors: &mut ErrorTree,
) {
    match (actual, mandated) {
        (None, _) => errors.record(path, Kind::MissingRequired, format!("{label} is required")),
        (Some(actual), Some(mandated)) if actual != mandated => errors.record(
            path,
            Kind::InvalidEnum,
            format!("{label} must be '{mandated}' for {profile}"),
        ),
        _ => {}
    }
}

pub(crate) fn check_step_size(config: &Configuration, errors: &mut ErrorTree) {
    match config.scaled_score_step_size {
        None => errors.record(
            "scaled_score_step_size",
            Kind::MissingRequired,
            "Step size is required",
        ),
        Some(step) if !(step > 0.0) => errors.record(
            "scaled_score_step_size",
            Kind::OutOfRange,
            "Step size must be greater than 0",
        ),
        Some(_) => {}
    }
}

pub(crate) fn check_difficulty_weights(config: &Configuration, errors: &mut ErrorTree) {
    for (level, weight) in config.difficulty_weights.iter() {
        match weight {
            None => errors.record(
                weight_path(level),
                Kind::MissingRequired,
                format!("{} weight is required", level.label()),
            ),
            Some(weight) if !(weight >= 0.0) => errors.record(
                weight_path(level),
                Kind::OutOfRange,
                "Value must be non-negative",
            ),
            Some(_) => {}
        }
    }
}

pub(crate) fn check_unit_count(config: &Configuration, rules: &RuleSet, errors: &mut ErrorTree) {
    if let UnitCountRule::Exactly(expected) = rules.unit_count {
        if config.units.len() != expected {
            errors.record(
                "units",
                Kind::WrongCount,
                format!(
                    "There must be exactly {expected} units for {} (found {})",
                    rules.profile,
                    config.units.len()
                ),
            );
        }
    }
}

pub(crate) fn check_unit(index: usize, unit: &Unit, rules: &RuleSet, errors: &mut ErrorTree) {
    let profile = rules.profile;
    let unit_rules = &rules.units;

    if unit.name.trim().is_empty() {
        errors.record(
            unit_path(index, "name"),
            Kind::MissingRequired,
            "Name is required",
        );
    }

    check_score(
        index,
        "max_score",
        "Max Score",
        unit.max_score,
        unit_rules.max_score,
        rules,
        errors,
    );
    check_score(
        index,
        "min_score",
        "Min Score",
        unit.min_score,
        unit_rules.min_score,
        rules,
        errors,
    );

    if checked_question_count(unit).is_none() {
        errors.record(
            unit_path(index, "no_of_questions"),
            Kind::OutOfRange,
            format!("Section question counts exceed {}", u32::MAX),
        );
    }

    if let Some(expected) = unit_rules.expected_questions(index) {
        if unit.no_of_questions != expected {
            errors.record(
                unit_path(index, "no_of_questions"),
                Kind::PositionalMismatch,
                format!(
                    "No of Questions must be {expected} for unit {} of {profile} (found {})",
                    index + 1,
                    unit.no_of_questions
                ),
            );
        }
    }

    if !unit_rules.sections.admits(unit.sections.len()) {
        let message = match unit_rules.sections {
            SectionCountRule::AtLeast(min) => {
                format!("Each unit must have at least {min} section(s)")
            }
            SectionCountRule::Exactly(expected) => {
                format!("Each unit must have exactly {expected} section(s) for {profile}")
            }
        };
        errors.record(unit_path(index, "sections"), Kind::WrongCount, message);
    }

    for (position, section) in unit.sections.iter().enumerate() {
        if section.name.trim().is_empty() {
            errors.record(
                section_path(index, position, "name"),
                Kind::MissingRequired,
                "Section Name is required",
            );
        }
        if section.id.is_none() {
            errors.record(
                section_path(index, position, "id"),
                Kind::MissingRequired,
                "Section ID is required",
            );
        }
        if section.question_count.is_none() {
            errors.record(
                section_path(index, position, "question_count"),
                Kind::MissingRequired,
                "Question Count is required",
            );
        }
    }

    match (unit_rules.mapping, &unit.mapping) {
        (MappingRule::Absent, Some(_)) => errors.record(
            unit_path(index, "mapping"),
            Kind::InvalidEnum,
            format!("Mapping must be absent for {profile}"),
        ),
        (MappingRule::MatchesQuestionCount, None) => errors.record(
            unit_path(index, "mapping"),
            Kind::MissingRequired,
            format!("Mapping is required for {profile}"),
        ),
        (MappingRule::MatchesQuestionCount, Some(mapping))
            if mapping.len() != unit.no_of_questions as usize =>
        {
            errors.record(
                unit_path(index, "mapping"),
                Kind::CrossFieldMismatch,
                format!(
                    "The mapping has {} rows but this unit has {} questions",
                    mapping.len(),
                    unit.no_of_questions
                ),
            )
        }
        _ => {}
    }
}

fn check_score(
    index: usize,
    field: &str,
    label: &str,
    value: Option<f64>,
    bound: ScoreBound,
    rules: &RuleSet,
    errors: &mut ErrorTree,
) {
    match value {
        None if rules.units.scores_required => errors.record(
            unit_path(index, field),
            Kind::MissingRequired,
            format!("{label} is required"),
        ),
        None => {}
        Some(value) if !bound.admits(value) => errors.record(
            unit_path(index, field),
            Kind::OutOfRange,
            format!("{label} {} for {}", bound.describe(), rules.profile),
        ),
        Some(_) => {}
    }
}

/// A section id may back at most one unit; later claims are reported at their own path.
pub(crate) fn check_section_ownership(config: &Configuration, errors: &mut ErrorTree) {
    let mut owners: HashMap<u32, usize> = HashMap::new();
    for (index, unit) in config.units.iter().enumerate() {
        for (position, section) in unit.sections.iter().enumerate() {
            let Some(id) = section.id else { continue };
            match owners.get(&id) {
                Some(owner) => errors.record(
                    section_path(index, position, "id"),
                    Kind::CrossFieldMismatch,
                    if *owner == index {
                        format!("Section {id} is listed twice in this unit")
                    } else {
                        format!("Section {id} is already assigned to unit {}", owner + 1)
                    },
                ),
                None => {
                    owners.insert(id, index);
                }
            }
        }
    }
}
