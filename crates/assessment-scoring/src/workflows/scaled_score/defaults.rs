use tracing::info;

use super::blueprint::ProfileBlueprint;
use super::derive::recompute_question_counts;
use super::domain::{Configuration, Profile};

/// Snapshot produced by selecting `profile`. Re-selecting the active profile returns the input
/// unchanged; any other selection discards prior values of the dependent fields and units.
pub fn apply_profile(config: &Configuration, profile: Profile) -> Configuration {
    if config.profile == profile {
        return config.clone();
    }

    let blueprint = ProfileBlueprint::for_profile(profile);
    let mut next = config.clone();
    next.profile = profile;
    next.configuration_type = Some(blueprint.configuration_type);
    next.score_aggregation_strategy = Some(blueprint.score_aggregation_strategy);
    next.scoring_strategy = Some(blueprint.scoring_strategy);
    next.scaled_score_step_size = Some(blueprint.scaled_score_step_size);
    next.units = blueprint.units();
    recompute_question_counts(&mut next.units);

    info!(
        from = %config.profile,
        to = %profile,
        units = next.units.len(),
        "profile defaults applied"
    );

    next
}

/// Fresh configuration already switched to `profile`.
pub fn defaults_for(profile: Profile) -> Configuration {
    apply_profile(&Configuration::default(), profile)
}
