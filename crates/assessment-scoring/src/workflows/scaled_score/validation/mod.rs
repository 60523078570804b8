mod errors;
mod registry;
mod rules;

pub use errors::{ErrorTree, FieldError, ValidationErrorKind};
pub use registry::{
    MappingRule, RuleSet, ScalarMandate, ScoreBound, SectionCountRule, UnitCountRule, UnitRules,
};

pub(crate) use errors::{
    mapping_entry_path, mapping_entry_root, section_path, section_root, unit_path, unit_root,
    weight_path,
};

use super::domain::Configuration;
use tracing::debug;

/// Run the rule set registered for `config.profile` and collect every failure.
pub fn validate(config: &Configuration) -> ErrorTree {
    ConfigurationValidator::for_profile(config.profile).validate(config)
}

/// Rule set bound once per validation run.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationValidator {
    rules: RuleSet,
}

impl ConfigurationValidator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn for_profile(profile: super::domain::Profile) -> Self {
        Self::new(RuleSet::for_profile(profile))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn validate(&self, config: &Configuration) -> ErrorTree {
        let mut errors = ErrorTree::default();

        rules::check_assessment_name(config, &mut errors);
        rules::check_strategy_fields(config, Some(&self.rules), &mut errors);
        rules::check_step_size(config, &mut errors);
        rules::check_difficulty_weights(config, &mut errors);
        rules::check_unit_count(config, &self.rules, &mut errors);
        for (index, unit) in config.units.iter().enumerate() {
            rules::check_unit(index, unit, &self.rules, &mut errors);
        }
        rules::check_section_ownership(config, &mut errors);

        debug!(
            profile = %self.rules.profile,
            units = config.units.len(),
            errors = errors.len(),
            "configuration validated"
        );

        errors
    }
}

/// Checks that do not depend on a profile. Used when the profile itself could not be read.
pub(crate) fn validate_without_profile(config: &Configuration) -> ErrorTree {
    let mut errors = ErrorTree::default();
    rules::check_assessment_name(config, &mut errors);
    rules::check_strategy_fields(config, None, &mut errors);
    rules::check_step_size(config, &mut errors);
    rules::check_difficulty_weights(config, &mut errors);
    errors
}
