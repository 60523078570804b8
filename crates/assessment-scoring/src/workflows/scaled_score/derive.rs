use super::domain::{derived_question_count, Configuration, Unit};

/// Reset every unit's question count to the sum of its sections.
pub fn recompute_question_counts(units: &mut [Unit]) {
    for unit in units.iter_mut() {
        unit.no_of_questions = derived_question_count(unit);
    }
}

pub fn with_recomputed_counts(config: &Configuration) -> Configuration {
    let mut next = config.clone();
    recompute_question_counts(&mut next.units);
    next
}
