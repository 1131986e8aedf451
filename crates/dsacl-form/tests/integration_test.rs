//! Integration tests for the permission form
//!
//! Drives the form through complete operator sessions against the
//! in-memory data source permission list.

use dsacl_core::{FormConfig, PermissionLevel, TargetKind, Team, User};
use dsacl_form::{
    DataSourceAcl, FormState, Grantee, PermissionForm, PickerKind, SubmitOutcome, SubmitPhase,
    TargetSelection,
};
use std::sync::Arc;

fn new_form() -> (Arc<DataSourceAcl>, PermissionForm<DataSourceAcl>) {
    let acl = Arc::new(DataSourceAcl::new(1));
    acl.open_form();
    let form = PermissionForm::new(Arc::clone(&acl));
    (acl, form)
}

#[tokio::test]
async fn test_team_permission_flow() {
    let (acl, form) = new_form();

    let state = form.select_team(Some(&Team::new(42, "operators")));
    assert_eq!(state.target_kind(), TargetKind::Team);
    assert_eq!(state.team_id(), 42);
    assert_eq!(state.user_id(), 0);
    assert_eq!(state.permission(), PermissionLevel::Query);
    assert!(form.can_submit());

    let outcome = form.submit().await;
    assert_eq!(outcome, SubmitOutcome::Added(state));

    let items = acl.items();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0].grantee, Grantee::Team(id) if id.get() == 42));
    assert_eq!(items[0].permission, PermissionLevel::Query);

    // Form is back to defaults and stays open for the next entry
    assert_eq!(form.state(), FormState::default());
    assert!(acl.is_adding());
}

#[tokio::test]
async fn test_user_permission_flow() {
    let (acl, form) = new_form();

    form.select_target_kind(TargetKind::User);
    assert_eq!(form.view().visible_picker, PickerKind::User);
    assert!(!form.view().submit_enabled);

    form.select_user(Some(&User::new(7, "alice")));
    let state = form.select_permission(PermissionLevel::Edit);
    assert_eq!(state.target_kind(), TargetKind::User);
    assert_eq!(state.team_id(), 0);
    assert_eq!(state.user_id(), 7);
    assert_eq!(state.permission(), PermissionLevel::Edit);
    assert!(form.view().submit_enabled);

    assert!(form.submit().await.is_success());
    assert_eq!(
        acl.items()[0].permission,
        PermissionLevel::Edit,
        "user should hold the edit level"
    );
}

#[tokio::test]
async fn test_user_kind_without_user_is_not_submitted() {
    let (acl, form) = new_form();

    form.select_target_kind(TargetKind::User);
    assert!(!form.is_valid());
    assert_eq!(form.submit().await, SubmitOutcome::Invalid);
    assert!(acl.items().is_empty());
    assert_eq!(
        acl.audit_logger().read().unwrap().entry_count(),
        0,
        "handler must not be invoked"
    );
}

#[tokio::test]
async fn test_switching_kind_discards_team() {
    let (_acl, form) = new_form();

    form.select_team(Some(&Team::new(5, "infra")));
    let state = form.select_target_kind(TargetKind::User);

    assert_eq!(state.team_id(), 0);
    assert_eq!(state.user_id(), 0);
    assert!(!form.is_valid());
}

#[tokio::test]
async fn test_clearing_picker_invalidates() {
    let (_acl, form) = new_form();

    form.select_team(Some(&Team::new(5, "infra")));
    assert!(form.is_valid());

    let state = form.select_team(None);
    assert_eq!(state.team_id(), 0);
    assert!(!form.is_valid());
}

#[tokio::test]
async fn test_duplicate_submission_fails_but_resets() {
    let (acl, form) = new_form();

    form.select_team(Some(&Team::new(42, "operators")));
    assert!(form.submit().await.is_success());

    form.select_team(Some(&Team::new(42, "operators")));
    form.select_permission(PermissionLevel::Edit);
    let outcome = form.submit().await;

    match outcome {
        SubmitOutcome::Failed { state, reason } => {
            assert_eq!(state.team_id(), 42);
            assert!(reason.contains("already exists"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(form.state(), FormState::default());
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(acl.items().len(), 1);
}

#[tokio::test]
async fn test_cancel_closes_form_without_touching_state() {
    let (acl, form) = new_form();

    form.select_team(Some(&Team::new(9, "sre")));
    form.cancel();

    assert!(!acl.is_adding());
    assert_eq!(form.state().team_id(), 9);
}

#[tokio::test]
async fn test_configured_defaults_after_submit() {
    let acl = Arc::new(DataSourceAcl::new(2));
    let defaults = FormConfig {
        default_permission: PermissionLevel::Edit,
        default_target: TargetKind::User,
    };
    let form = PermissionForm::with_config(Arc::clone(&acl), defaults);

    form.select_user(Some(&User::new(11, "bob")));
    assert!(form.submit().await.is_success());

    assert_eq!(form.state().target(), TargetSelection::User(None));
    assert_eq!(form.state().permission(), PermissionLevel::Edit);
}
