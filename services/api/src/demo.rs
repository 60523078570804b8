use crate::infra::parse_profile;
use assessment_scoring::error::AppError;
use assessment_scoring::workflows::scaled_score::{
    defaults_for, validate_document, EditAction, EditOutcome, EditResult, ErrorTree,
    MappingImporter, Profile, SectionCatalog, SessionError, SessionHandle,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Configuration document (JSON) to validate
    #[arg(long)]
    pub(crate) file: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct MappingArgs {
    /// Mapping file: one header line, then `score,value` rows
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Print the parsed rows as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DefaultsArgs {
    /// Assessment profile (GENERIC, SAT or ACT)
    #[arg(long, value_parser = parse_profile)]
    pub(crate) profile: Profile,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Profile to configure during the demo
    #[arg(long, default_value = "ACT", value_parser = parse_profile)]
    pub(crate) profile: Profile,
    /// Skip the mapping upload step, leaving ACT units incomplete
    #[arg(long)]
    pub(crate) skip_mappings: bool,
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.file)?;
    let document: serde_json::Value = serde_json::from_str(&raw)?;
    let errors = validate_document(&document);

    println!("Configuration: {}", args.file.display());
    render_errors(&errors);
    Ok(())
}

pub(crate) fn run_mapping(args: MappingArgs) -> Result<(), AppError> {
    let mapping = MappingImporter::from_path(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mapping)?);
        return Ok(());
    }

    println!("Mapping file: {}", args.file.display());
    println!("Rows accepted: {}", mapping.len());
    for entry in &mapping {
        println!("  {:>8} -> {}", entry.score, entry.value);
    }
    Ok(())
}

pub(crate) fn run_defaults(args: DefaultsArgs) -> Result<(), AppError> {
    let config = defaults_for(args.profile);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = Arc::new(SectionCatalog::standard());
    let session = SessionHandle::spawn(catalog);

    println!("Scaled score configuration demo");
    println!("Profile: {}", args.profile);

    match walk_session(&session, &args).await {
        Ok(()) => Ok(()),
        Err(err) => {
            println!("  Session failed: {}", err);
            Ok(())
        }
    }
}

async fn walk_session(session: &SessionHandle, args: &DemoArgs) -> Result<(), SessionError> {
    let renamed = session
        .apply(EditAction::RenameAssessment {
            name: format!("{} practice", args.profile),
        })
        .await?;
    report_step("rename assessment", &renamed);

    if args.profile == Profile::Generic {
        for _ in 0..2 {
            let added = session.apply(EditAction::AddUnit).await?;
            report_step("add unit", &added);
        }
    } else {
        let selected = session
            .apply(EditAction::SelectProfile {
                profile: args.profile,
            })
            .await?;
        report_step("select profile", &selected);
    }

    let snapshot = session.snapshot().await?;
    println!("\nBefore sections are assigned");
    render_errors(&session.validate().await?);

    for (position, (key, section_ids)) in snapshot
        .unit_keys
        .iter()
        .zip(section_plan(args.profile))
        .enumerate()
    {
        if args.profile == Profile::Generic {
            session
                .apply(EditAction::RenameUnit {
                    key: *key,
                    name: format!("Part {}", position + 1),
                })
                .await?;
            session
                .apply(EditAction::SetScoreBounds {
                    key: *key,
                    max_score: Some(100.0),
                    min_score: Some(1.0),
                })
                .await?;
        }

        let assigned = session
            .apply(EditAction::AssignSections {
                key: *key,
                section_ids: section_ids.to_vec(),
            })
            .await?;
        report_step(&format!("assign sections {section_ids:?} to {key}"), &assigned);

        if args.profile == Profile::Act && !args.skip_mappings {
            let questions = assigned
                .snapshot
                .configuration
                .units
                .get(position)
                .map_or(0, |unit| unit.no_of_questions);
            let uploaded = session
                .upload_mapping(*key, demo_mapping(questions).as_bytes())
                .await?;
            report_step(&format!("upload mapping for {key}"), &uploaded);
        }
    }

    let late = late_upload(session).await?;
    println!(
        "\nMapping uploaded for a removed unit: {}",
        match late {
            EditOutcome::Discarded => "discarded",
            EditOutcome::Applied => "applied",
            EditOutcome::Unchanged => "unchanged",
        }
    );

    let snapshot = session.snapshot().await?;
    println!("\nFinal configuration (revision {})", snapshot.revision);
    for unit in &snapshot.configuration.units {
        println!(
            "  {:<22} questions: {:>3}  sections: {:?}  mapping rows: {}",
            unit.name,
            unit.no_of_questions,
            unit.section_ids().collect::<Vec<_>>(),
            unit.mapping.as_ref().map_or(0, Vec::len)
        );
    }
    println!(
        "  Unassigned sections: {:?}",
        snapshot
            .unassigned_sections
            .iter()
            .filter_map(|section| section.id)
            .collect::<Vec<_>>()
    );
    render_errors(&session.validate().await?);
    Ok(())
}

/// Add a throwaway unit, remove it, then upload a mapping for its key.
async fn late_upload(session: &SessionHandle) -> Result<EditOutcome, SessionError> {
    let added = session.apply(EditAction::AddUnit).await?;
    let Some(key) = added.snapshot.unit_keys.last().copied() else {
        return Ok(EditOutcome::Unchanged);
    };
    session.apply(EditAction::RemoveUnit { key }).await?;
    let result = session
        .upload_mapping(key, demo_mapping(1).as_bytes())
        .await?;
    Ok(result.outcome)
}

fn section_plan(profile: Profile) -> &'static [&'static [u32]] {
    match profile {
        Profile::Generic => &[&[1], &[2]],
        Profile::Sat => &[&[1, 2], &[3, 4]],
        Profile::Act => &[&[5], &[6], &[7], &[8]],
    }
}

/// Linear raw-to-scaled table spanning 1..=36.
fn demo_mapping(rows: u32) -> String {
    let mut text = String::from("raw score,scaled score\n");
    let span = rows.saturating_sub(1).max(1);
    for raw in 0..rows {
        text.push_str(&format!("{},{}\n", raw, 1 + raw * 35 / span));
    }
    text
}

fn report_step(label: &str, result: &EditResult) {
    println!(
        "  [rev {:>2}] {:<40} {:?}",
        result.snapshot.revision, label, result.outcome
    );
}

fn render_errors(errors: &ErrorTree) {
    if errors.is_empty() {
        println!("  Validation: no errors");
        return;
    }

    println!("  Validation: {} error(s)", errors.len());
    for (path, error) in errors.iter() {
        println!("  - {:<36} {:?}: {}", path, error.kind, error.message);
    }
}
