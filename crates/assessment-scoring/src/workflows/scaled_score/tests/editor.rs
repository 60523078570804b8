use std::collections::HashSet;

use super::common::*;
use crate::workflows::scaled_score::{
    ConfigurationEditor, EditAction, EditError, EditOutcome, MappingEntry, Profile, UnitKey,
};

fn editor_with_units(count: usize) -> (ConfigurationEditor, Vec<UnitKey>) {
    let mut editor = ConfigurationEditor::new(catalog());
    for _ in 0..count {
        editor.apply(EditAction::AddUnit).expect("add unit");
    }
    let keys = editor.unit_keys().to_vec();
    (editor, keys)
}

#[test]
fn new_editor_starts_from_generic_creation_state() {
    let editor = ConfigurationEditor::new(catalog());
    assert_eq!(editor.revision(), 0);
    assert_eq!(editor.configuration().profile, Profile::Generic);
    assert!(editor.unit_keys().is_empty());
    assert_eq!(editor.unassigned_sections().len(), 8);
}

#[test]
fn assigning_sections_recomputes_question_counts() {
    let (mut editor, keys) = editor_with_units(1);

    editor
        .apply(EditAction::AssignSections {
            key: keys[0],
            section_ids: vec![2, 1],
        })
        .expect("sections assigned");

    let unit = editor.unit(keys[0]).expect("unit exists");
    assert_eq!(unit.no_of_questions, 54);
    assert_eq!(unit.sections[0].id, Some(2));
    assert_eq!(editor.revision(), 2);
}

#[test]
fn a_section_backs_at_most_one_unit() {
    let (mut editor, keys) = editor_with_units(2);
    editor
        .apply(EditAction::AssignSections {
            key: keys[0],
            section_ids: vec![1, 2],
        })
        .expect("first claim");

    let error = editor
        .apply(EditAction::AssignSections {
            key: keys[1],
            section_ids: vec![3, 1],
        })
        .expect_err("section 1 is taken");

    assert_eq!(
        error,
        EditError::SectionUnavailable {
            section_id: 1,
            owner: keys[0],
        }
    );
    assert!(editor.unit(keys[1]).expect("unit").sections.is_empty());

    let unassigned: HashSet<u32> = editor
        .unassigned_sections()
        .iter()
        .filter_map(|section| section.id)
        .collect();
    for unit in &editor.configuration().units {
        assert!(unit.section_ids().all(|id| !unassigned.contains(&id)));
    }
}

#[test]
fn a_unit_may_reselect_its_own_sections() {
    let (mut editor, keys) = editor_with_units(1);
    for ids in [vec![1, 2], vec![2, 5]] {
        editor
            .apply(EditAction::AssignSections {
                key: keys[0],
                section_ids: ids,
            })
            .expect("reassignment");
    }
    assert_eq!(editor.unit(keys[0]).expect("unit").no_of_questions, 102);
}

#[test]
fn repeated_and_unknown_sections_are_rejected() {
    let (mut editor, keys) = editor_with_units(1);

    let duplicate = editor.apply(EditAction::AssignSections {
        key: keys[0],
        section_ids: vec![4, 4],
    });
    assert_eq!(duplicate, Err(EditError::DuplicateSection(4)));

    let unknown = editor.apply(EditAction::AssignSections {
        key: keys[0],
        section_ids: vec![99],
    });
    assert_eq!(unknown, Err(EditError::UnknownSection(99)));
    assert_eq!(editor.revision(), 1);
}

#[test]
fn removing_a_unit_frees_its_sections_and_keeps_other_keys() {
    let (mut editor, keys) = editor_with_units(3);
    editor
        .apply(EditAction::AssignSections {
            key: keys[0],
            section_ids: vec![7],
        })
        .expect("assign");

    editor
        .apply(EditAction::RemoveUnit { key: keys[0] })
        .expect("remove");

    assert_eq!(editor.unit_keys(), &keys[1..]);
    assert_eq!(editor.index_of(keys[2]), Some(1));
    assert!(editor
        .unassigned_sections()
        .iter()
        .any(|section| section.id == Some(7)));
}

#[test]
fn mapping_for_a_removed_unit_is_discarded() {
    let (mut editor, keys) = editor_with_units(2);
    editor
        .apply(EditAction::RemoveUnit { key: keys[0] })
        .expect("remove");
    let revision = editor.revision();

    let outcome = editor
        .apply(EditAction::ApplyMapping {
            key: keys[0],
            mapping: vec![MappingEntry {
                score: 0.0,
                value: 1.0,
            }],
        })
        .expect("late mapping is not an error");

    assert_eq!(outcome, EditOutcome::Discarded);
    assert_eq!(editor.revision(), revision);
    assert!(editor.configuration().units[0].mapping.is_none());
}

#[test]
fn mapping_replaces_the_previous_one() {
    let (mut editor, keys) = editor_with_units(1);
    for rows in [3, 5] {
        editor
            .apply(EditAction::ApplyMapping {
                key: keys[0],
                mapping: ascending_mapping(rows),
            })
            .expect("mapping applied");
    }
    let mapping = editor.unit(keys[0]).and_then(|unit| unit.mapping.as_ref());
    assert_eq!(mapping.map(Vec::len), Some(5));
}

#[test]
fn selecting_the_active_profile_changes_nothing() {
    let (mut editor, _) = editor_with_units(1);
    let revision = editor.revision();

    let outcome = editor
        .apply(EditAction::SelectProfile {
            profile: Profile::Generic,
        })
        .expect("select");

    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(editor.revision(), revision);
    assert_eq!(editor.configuration().units.len(), 1);
}

#[test]
fn profile_change_replaces_units_and_their_keys() {
    let (mut editor, keys) = editor_with_units(1);

    editor
        .apply(EditAction::SelectProfile {
            profile: Profile::Act,
        })
        .expect("select");

    assert_eq!(editor.unit_keys().len(), 4);
    assert!(editor.unit_keys().iter().all(|key| !keys.contains(key)));
    assert_eq!(
        editor.apply(EditAction::RenameUnit {
            key: keys[0],
            name: "gone".to_string(),
        }),
        Err(EditError::UnknownUnit(keys[0]))
    );
}

#[test]
fn building_the_act_fixture_through_actions_validates_clean() {
    let mut editor = ConfigurationEditor::new(catalog());
    editor
        .apply(EditAction::RenameAssessment {
            name: "ACT practice".to_string(),
        })
        .expect("rename");
    editor
        .apply(EditAction::SelectProfile {
            profile: Profile::Act,
        })
        .expect("select");

    let keys = editor.unit_keys().to_vec();
    for (key, section_id) in keys.iter().zip([5, 6, 7, 8]) {
        editor
            .apply(EditAction::AssignSections {
                key: *key,
                section_ids: vec![section_id],
            })
            .expect("assign");
        let rows = editor.unit(*key).expect("unit").no_of_questions;
        editor
            .apply(EditAction::ApplyMapping {
                key: *key,
                mapping: ascending_mapping(rows),
            })
            .expect("mapping");
    }

    let errors = editor.validate();
    assert!(errors.is_empty(), "unexpected errors: {errors}");
    assert_eq!(editor.unassigned_sections().len(), 4);
    assert_eq!(editor.snapshot().configuration, act_configuration());
}
