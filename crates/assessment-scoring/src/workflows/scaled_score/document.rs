//! Lenient decoding of untyped form payloads.
//!
//! Form submissions arrive as loose JSON: numbers typed into text inputs come through as
//! strings, optional inputs may be `null`, and a broken client can send the wrong shape
//! entirely. Decoding never fails. Every field that cannot be read is left empty and reported
//! at its path, so the validator can add the structural findings on top.

use serde_json::{Map, Value};

use super::domain::{
    derived_question_count, AggregationStrategy, Configuration, ConfigurationType,
    DifficultyLevel, DifficultyWeights, MappingEntry, Profile, ScoringStrategy, Section, Unit,
};
use super::validation::{
    mapping_entry_path, mapping_entry_root, section_path, section_root, unit_path, unit_root,
    validate, validate_without_profile, weight_path, ErrorTree, ValidationErrorKind as Kind,
};

/// Result of lifting a JSON payload into the typed model.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDocument {
    /// Best-effort configuration; falls back to GENERIC when the profile is unreadable.
    pub configuration: Configuration,
    /// The profile as written in the payload, if it named one of the known profiles.
    pub profile: Option<Profile>,
    pub errors: ErrorTree,
}

pub fn decode_document(value: &Value) -> DecodedDocument {
    let empty = Map::new();
    let mut errors = ErrorTree::default();
    let root = match value {
        Value::Object(map) => map,
        _ => {
            errors.record(
                "configuration",
                Kind::InvalidType,
                "Configuration must be an object",
            );
            &empty
        }
    };

    let assessment_name = read_text(root, "assessment_name", "assessment_name", &mut errors)
        .unwrap_or_default();

    let profile = match read_text(root, "profile", "profile", &mut errors) {
        None => {
            errors.record("profile", Kind::MissingRequired, "Assessment Type is required");
            None
        }
        Some(raw) => {
            let parsed = Profile::from_label(&raw);
            if parsed.is_none() {
                errors.record("profile", Kind::InvalidEnum, "Invalid Assessment Type");
            }
            parsed
        }
    };

    let configuration_type = read_enum(
        root,
        "configuration_type",
        "Invalid Configuration Type",
        ConfigurationType::from_label,
        &mut errors,
    );
    let score_aggregation_strategy = read_enum(
        root,
        "score_aggregation_strategy",
        "Invalid Score Aggregation Strategy",
        AggregationStrategy::from_label,
        &mut errors,
    );
    let scoring_strategy = read_enum(
        root,
        "scoring_strategy",
        "Invalid Scoring Strategy",
        ScoringStrategy::from_label,
        &mut errors,
    );
    let scaled_score_step_size = read_number(
        root,
        "scaled_score_step_size",
        "scaled_score_step_size",
        &mut errors,
    );
    let difficulty_weights = read_weights(root, &mut errors);
    let units = read_units(root, &mut errors);

    DecodedDocument {
        configuration: Configuration {
            assessment_name,
            profile: profile.unwrap_or(Profile::Generic),
            configuration_type,
            score_aggregation_strategy,
            scoring_strategy,
            difficulty_weights,
            scaled_score_step_size,
            units,
        },
        profile,
        errors,
    }
}

/// Decode then validate. Decode findings take precedence at any shared path.
pub fn validate_document(value: &Value) -> ErrorTree {
    let decoded = decode_document(value);
    let mut errors = decoded.errors;
    match decoded.profile {
        Some(_) => errors.merge(validate(&decoded.configuration)),
        None => errors.merge(validate_without_profile(&decoded.configuration)),
    }
    errors
}

fn read_text(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut ErrorTree,
) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(_) => {
            errors.record(path, Kind::InvalidType, "Value must be text");
            None
        }
    }
}

fn read_number(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut ErrorTree,
) -> Option<f64> {
    let parsed = match map.get(key) {
        None | Some(Value::Null) => return None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => return None,
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed.filter(|number| number.is_finite()) {
        Some(number) => Some(number),
        None => {
            errors.record(path, Kind::InvalidType, "Value must be a number");
            None
        }
    }
}

fn read_count(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut ErrorTree,
) -> Option<u32> {
    let number = read_number(map, key, path, errors)?;
    if number >= 0.0 && number.fract() == 0.0 && number <= f64::from(u32::MAX) {
        Some(number as u32)
    } else {
        errors.record(path, Kind::InvalidType, "Value must be a whole number");
        None
    }
}

fn read_enum<T>(
    map: &Map<String, Value>,
    key: &str,
    invalid_message: &str,
    parse: fn(&str) -> Option<T>,
    errors: &mut ErrorTree,
) -> Option<T> {
    let raw = read_text(map, key, key, errors)?;
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse(&raw);
    if parsed.is_none() {
        errors.record(key, Kind::InvalidEnum, invalid_message);
    }
    parsed
}

fn read_array<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut ErrorTree,
) -> Option<&'a [Value]> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(_) => {
            errors.record(path, Kind::InvalidType, "Value must be a list");
            None
        }
    }
}

fn read_weights(root: &Map<String, Value>, errors: &mut ErrorTree) -> DifficultyWeights {
    let mut weights = DifficultyWeights::empty();
    let map = match root.get("difficulty_weights") {
        None | Some(Value::Null) => return weights,
        Some(Value::Object(map)) => map,
        Some(_) => {
            errors.record(
                "difficulty_weights",
                Kind::InvalidType,
                "Difficulty weights must be an object",
            );
            return weights;
        }
    };

    for level in DifficultyLevel::ordered() {
        let weight = read_number(map, level.label(), &weight_path(level), errors);
        weights.set(level, weight);
    }
    weights
}

fn read_units(root: &Map<String, Value>, errors: &mut ErrorTree) -> Vec<Unit> {
    let Some(items) = read_array(root, "units", "units", errors) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| read_unit(index, item, errors))
        .collect()
}

fn read_unit(index: usize, value: &Value, errors: &mut ErrorTree) -> Unit {
    let Value::Object(map) = value else {
        errors.record(unit_root(index), Kind::InvalidType, "Unit must be an object");
        return Unit {
            max_score: None,
            min_score: None,
            ..Unit::blank()
        };
    };

    let sections: Vec<Section> = read_array(map, "sections", &unit_path(index, "sections"), errors)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(position, item)| read_section(index, position, item, errors))
                .collect()
        })
        .unwrap_or_default();

    let mapping = match map.get("mapping") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .enumerate()
                .filter_map(|(entry, item)| read_mapping_entry(index, entry, item, errors))
                .collect(),
        ),
        Some(_) => {
            errors.record(
                unit_path(index, "mapping"),
                Kind::InvalidType,
                "Mapping must be a list",
            );
            Some(Vec::new())
        }
    };

    let mut unit = Unit {
        name: read_text(map, "name", &unit_path(index, "name"), errors).unwrap_or_default(),
        max_score: read_number(map, "max_score", &unit_path(index, "max_score"), errors),
        min_score: read_number(map, "min_score", &unit_path(index, "min_score"), errors),
        no_of_questions: 0,
        sections,
        mapping,
    };
    unit.no_of_questions = read_count(
        map,
        "no_of_questions",
        &unit_path(index, "no_of_questions"),
        errors,
    )
    // Payloads that omit the derived count get the value the editor would have set.
    .unwrap_or_else(|| derived_question_count(&unit));
    unit
}

fn read_section(unit: usize, position: usize, value: &Value, errors: &mut ErrorTree) -> Section {
    let Value::Object(map) = value else {
        errors.record(
            section_root(unit, position),
            Kind::InvalidType,
            "Section must be an object",
        );
        return Section {
            name: String::new(),
            id: None,
            question_count: None,
        };
    };

    Section {
        name: read_text(map, "name", &section_path(unit, position, "name"), errors)
            .unwrap_or_default(),
        id: read_count(map, "id", &section_path(unit, position, "id"), errors),
        question_count: read_count(
            map,
            "question_count",
            &section_path(unit, position, "question_count"),
            errors,
        ),
    }
}

fn read_mapping_entry(
    unit: usize,
    entry: usize,
    value: &Value,
    errors: &mut ErrorTree,
) -> Option<MappingEntry> {
    let Value::Object(map) = value else {
        errors.record(
            mapping_entry_root(unit, entry),
            Kind::InvalidType,
            "Mapping row must be an object",
        );
        return None;
    };

    let score_path = mapping_entry_path(unit, entry, "score");
    let value_path = mapping_entry_path(unit, entry, "value");
    let score = read_number(map, "score", &score_path, errors);
    let value = read_number(map, "value", &value_path, errors);

    if score.is_none() {
        errors.record(score_path, Kind::MissingRequired, "Score is required");
    }
    if value.is_none() {
        errors.record(value_path, Kind::MissingRequired, "Value is required");
    }

    Some(MappingEntry {
        score: score?,
        value: value?,
    })
}
