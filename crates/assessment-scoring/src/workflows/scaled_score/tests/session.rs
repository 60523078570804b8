use super::common::*;
use crate::workflows::scaled_score::{
    EditAction, EditError, EditOutcome, Profile, ScaledScoreServiceError, SessionError,
    SessionHandle, SessionId,
};

#[tokio::test]
async fn actions_are_applied_in_submission_order() {
    let session = SessionHandle::spawn(catalog());

    let first = session.apply(EditAction::AddUnit).await.expect("add");
    let second = session.apply(EditAction::AddUnit).await.expect("add");

    assert_eq!(first.snapshot.revision, 1);
    assert_eq!(second.snapshot.revision, 2);
    assert_eq!(second.snapshot.unit_keys.len(), 2);
    assert_eq!(session.snapshot().await.expect("snapshot"), second.snapshot);
}

#[tokio::test]
async fn upload_targets_the_unit_by_key() {
    let session = SessionHandle::spawn(catalog());
    session
        .apply(EditAction::SelectProfile {
            profile: Profile::Act,
        })
        .await
        .expect("select");
    let keys = session.snapshot().await.expect("snapshot").unit_keys;

    let result = session
        .upload_mapping(keys[1], "raw,scaled\n0,1\n1,2\nbad,row\n".as_bytes())
        .await
        .expect("upload");

    assert_eq!(result.outcome, EditOutcome::Applied);
    let mapping = result.snapshot.configuration.units[1]
        .mapping
        .clone()
        .expect("mapping set");
    assert_eq!(mapping.len(), 2);
    assert!(result.snapshot.configuration.units[0].mapping.is_none());
}

#[tokio::test]
async fn upload_after_unit_removal_is_a_no_op() {
    let session = SessionHandle::spawn(catalog());
    let added = session.apply(EditAction::AddUnit).await.expect("add");
    let key = added.snapshot.unit_keys[0];
    session
        .apply(EditAction::RemoveUnit { key })
        .await
        .expect("remove");

    let result = session
        .upload_mapping(key, "raw,scaled\n0,1\n".as_bytes())
        .await
        .expect("upload resolves");

    assert_eq!(result.outcome, EditOutcome::Discarded);
    assert!(result.snapshot.configuration.units.is_empty());
    assert_eq!(result.snapshot.revision, 2);
}

#[tokio::test]
async fn edit_errors_surface_through_the_handle() {
    let session = SessionHandle::spawn(catalog());
    let added = session.apply(EditAction::AddUnit).await.expect("add");

    let error = session
        .apply(EditAction::AssignSections {
            key: added.snapshot.unit_keys[0],
            section_ids: vec![42],
        })
        .await
        .expect_err("unknown section");

    assert!(matches!(
        error,
        SessionError::Edit(EditError::UnknownSection(42))
    ));
}

#[tokio::test]
async fn session_validation_reflects_current_state() {
    let session = SessionHandle::spawn(catalog());
    session
        .apply(EditAction::SelectProfile {
            profile: Profile::Sat,
        })
        .await
        .expect("select");

    let errors = session.validate().await.expect("validate");

    assert!(errors.contains("units[0].sections"));
    assert!(errors.contains("units[1].no_of_questions"));
}

#[tokio::test]
async fn service_tracks_sessions_in_the_store() {
    let (service, store) = build_service();

    let ticket = service.open_session().await.expect("open");
    assert!(ticket.session_id.0.starts_with("session-"));
    assert_eq!(ticket.snapshot.revision, 0);
    assert_eq!(store.len(), 1);

    service
        .apply(&ticket.session_id, EditAction::AddUnit)
        .await
        .expect("apply");
    service
        .close_session(&ticket.session_id)
        .expect("close");
    assert_eq!(store.len(), 0);

    let missing = service
        .snapshot(&ticket.session_id)
        .await
        .expect_err("closed session");
    assert!(matches!(missing, ScaledScoreServiceError::SessionNotFound(_)));
}

#[tokio::test]
async fn closing_an_unknown_session_is_not_found() {
    let (service, _) = build_service();
    let error = service
        .close_session(&SessionId("session-unknown".to_string()))
        .expect_err("unknown");
    assert!(error.to_string().contains("session-unknown"));
}
