//! The permission assignment form.

use crate::handler::PermissionFormHandler;
use crate::state::{FormEvent, FormState};
use crate::view::FormView;
use dsacl_core::{FormConfig, PermissionLevel, TargetKind, Team, User};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Whether a submission is currently awaiting the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    /// Ready for input and submission
    #[default]
    Idle,
    /// `add_permission` has been called and has not completed
    Submitting,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The caller accepted the permission
    Added(FormState),

    /// The caller was invoked and reported a failure
    Failed {
        /// State that was handed to the caller
        state: FormState,
        /// Caller's error message
        reason: String,
    },

    /// Nothing to submit; the caller was not invoked
    Invalid,

    /// Another submission is still in flight; the caller was not invoked
    InFlight,
}

impl SubmitOutcome {
    /// Check if the caller accepted the permission.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    /// Check if the caller was invoked at all.
    #[must_use]
    pub fn was_dispatched(&self) -> bool {
        matches!(self, Self::Added(_) | Self::Failed { .. })
    }
}

#[derive(Debug)]
struct FormModel {
    state: FormState,
    phase: SubmitPhase,
}

/// Form for granting a data source permission to a team or a user.
///
/// Selection events replace the whole [`FormState`]; [`submit`](Self::submit)
/// hands the state to the [`PermissionFormHandler`] and resets to the
/// configured defaults once the handler returns, whatever its result. The
/// form can be shared across tasks behind an `Arc`.
#[derive(Debug)]
pub struct PermissionForm<H> {
    handler: Arc<H>,
    defaults: FormConfig,
    model: RwLock<FormModel>,
}

impl<H: PermissionFormHandler> PermissionForm<H> {
    /// Create a form with the built-in defaults (team target, query level).
    #[must_use]
    pub fn new(handler: Arc<H>) -> Self {
        Self::with_config(handler, FormConfig::default())
    }

    /// Create a form whose fresh state comes from `defaults`.
    #[must_use]
    pub fn with_config(handler: Arc<H>, defaults: FormConfig) -> Self {
        Self {
            handler,
            defaults,
            model: RwLock::new(FormModel {
                state: FormState::new(&defaults),
                phase: SubmitPhase::Idle,
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.read().state
    }

    /// Current submission phase.
    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.read().phase
    }

    /// The handler this form reports to.
    #[must_use]
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Apply a selection event and return the resulting state.
    pub fn dispatch(&self, event: FormEvent) -> FormState {
        let mut model = self.write();
        model.state = model.state.apply(event);
        debug!(
            ?event,
            target_kind = %model.state.target_kind(),
            team_id = model.state.team_id(),
            user_id = model.state.user_id(),
            permission = %model.state.permission(),
            valid = model.state.is_valid(),
            "form state changed"
        );
        model.state
    }

    /// The target-kind selector changed.
    pub fn select_target_kind(&self, kind: TargetKind) -> FormState {
        self.dispatch(FormEvent::TargetKindChanged(kind))
    }

    /// The team picker reported a team, or `None` when cleared.
    ///
    /// A record without a positive id counts as cleared.
    pub fn select_team(&self, team: Option<&Team>) -> FormState {
        self.dispatch(FormEvent::TeamSelected(team.and_then(Team::team_id)))
    }

    /// The user picker reported a user, or `None` when cleared.
    ///
    /// A record without a positive id counts as cleared.
    pub fn select_user(&self, user: Option<&User>) -> FormState {
        self.dispatch(FormEvent::UserSelected(user.and_then(User::user_id)))
    }

    /// The permission-level picker changed.
    pub fn select_permission(&self, permission: PermissionLevel) -> FormState {
        self.dispatch(FormEvent::PermissionChanged(permission))
    }

    /// Whether the current state is complete enough to submit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.read().state.is_valid()
    }

    /// Whether the submit action is enabled: valid and nothing in flight.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        let model = self.read();
        model.phase == SubmitPhase::Idle && model.state.is_valid()
    }

    /// Render model for the current state.
    #[must_use]
    pub fn view(&self) -> FormView {
        let model = self.read();
        FormView::new(&model.state, model.phase)
    }

    /// Submit the current state to the handler.
    ///
    /// Returns without calling the handler when the state is invalid or a
    /// submission is already in flight. Otherwise the state is reset to the
    /// defaults after the handler completes, even on failure, and also if
    /// this future is dropped before completion.
    pub async fn submit(&self) -> SubmitOutcome {
        let (state, in_flight) = {
            let mut model = self.write();
            if model.phase == SubmitPhase::Submitting {
                debug!("submission already in flight");
                return SubmitOutcome::InFlight;
            }
            if !model.state.is_valid() {
                debug!(target_kind = %model.state.target_kind(), "no target selected");
                return SubmitOutcome::Invalid;
            }
            model.phase = SubmitPhase::Submitting;
            (model.state, InFlight { form: self })
        };

        info!(
            target_kind = %state.target_kind(),
            team_id = state.team_id(),
            user_id = state.user_id(),
            permission = %state.permission(),
            "submitting permission"
        );

        let result = self.handler.add_permission(state).await;
        drop(in_flight);

        match result {
            Ok(()) => {
                info!(permission = %state.permission(), "permission added");
                SubmitOutcome::Added(state)
            }
            Err(e) => {
                warn!(error = %e, "adding permission failed, form reset");
                SubmitOutcome::Failed {
                    state,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The operator dismissed the form. State is left untouched.
    pub fn cancel(&self) {
        debug!("permission form cancelled");
        self.handler.cancel();
    }

    fn reset(&self) {
        let mut model = self.write();
        model.state = FormState::new(&self.defaults);
        model.phase = SubmitPhase::Idle;
    }

    fn read(&self) -> RwLockReadGuard<'_, FormModel> {
        self.model.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormModel> {
        self.model.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets the form when a submission ends, however it ends.
struct InFlight<'a, H: PermissionFormHandler> {
    form: &'a PermissionForm<H>,
}

impl<H: PermissionFormHandler> Drop for InFlight<'_, H> {
    fn drop(&mut self) {
        self.form.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AclError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingHandler {
        calls: Mutex<Vec<FormState>>,
        cancels: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PermissionFormHandler for RecordingHandler {
        async fn add_permission(&self, state: FormState) -> crate::Result<()> {
            self.calls.lock().unwrap().push(state);
            if self.fail {
                Err(AclError::Handler("backend unavailable".to_string()))
            } else {
                Ok(())
            }
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct GatedHandler {
        started: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PermissionFormHandler for GatedHandler {
        async fn add_permission(&self, _state: FormState) -> crate::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }

        fn cancel(&self) {}
    }

    #[tokio::test]
    async fn test_submit_hands_state_and_resets() {
        let handler = Arc::new(RecordingHandler::default());
        let form = PermissionForm::new(Arc::clone(&handler));

        form.select_team(Some(&Team::new(42, "ops")));
        let expected = form.state();

        let outcome = form.submit().await;
        assert_eq!(outcome, SubmitOutcome::Added(expected));
        assert_eq!(handler.calls.lock().unwrap().as_slice(), &[expected]);
        assert_eq!(form.state(), FormState::default());
        assert_eq!(form.phase(), SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn test_invalid_submit_does_not_call_handler() {
        let handler = Arc::new(RecordingHandler::default());
        let form = PermissionForm::new(Arc::clone(&handler));
        form.select_target_kind(TargetKind::User);

        assert!(!form.can_submit());
        assert_eq!(form.submit().await, SubmitOutcome::Invalid);
        assert!(handler.calls.lock().unwrap().is_empty());
        assert_eq!(form.state().target_kind(), TargetKind::User);
    }

    #[tokio::test]
    async fn test_failed_submit_still_resets() {
        let handler = Arc::new(RecordingHandler {
            fail: true,
            ..RecordingHandler::default()
        });
        let form = PermissionForm::new(Arc::clone(&handler));
        form.select_team(Some(&Team::new(8, "qa")));
        form.select_permission(PermissionLevel::Edit);

        let outcome = form.submit().await;
        assert!(outcome.was_dispatched());
        assert!(!outcome.is_success());
        assert!(matches!(outcome, SubmitOutcome::Failed { ref reason, .. } if reason.contains("backend unavailable")));
        assert_eq!(form.state(), FormState::default());
    }

    #[tokio::test]
    async fn test_second_submit_blocked_while_in_flight() {
        let handler = Arc::new(GatedHandler {
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let form = Arc::new(PermissionForm::new(Arc::clone(&handler)));
        form.select_team(Some(&Team::new(42, "ops")));

        let first = tokio::spawn({
            let form = Arc::clone(&form);
            async move { form.submit().await }
        });

        handler.started.notified().await;
        assert_eq!(form.phase(), SubmitPhase::Submitting);
        assert!(!form.can_submit());
        assert!(form.view().submitting);
        assert_eq!(form.submit().await, SubmitOutcome::InFlight);

        handler.release.notify_one();
        let outcome = first.await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert_eq!(form.state(), FormState::default());
    }

    #[tokio::test]
    async fn test_dropped_submission_resets() {
        let handler = Arc::new(GatedHandler {
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let form = Arc::new(PermissionForm::new(Arc::clone(&handler)));
        form.select_team(Some(&Team::new(42, "ops")));

        let task = tokio::spawn({
            let form = Arc::clone(&form);
            async move { form.submit().await }
        });
        handler.started.notified().await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(form.phase(), SubmitPhase::Idle);
        assert_eq!(form.state(), FormState::default());
    }

    #[test]
    fn test_cancel_leaves_state() {
        let handler = Arc::new(RecordingHandler::default());
        let form = PermissionForm::new(Arc::clone(&handler));
        form.select_team(Some(&Team::new(3, "infra")));
        let before = form.state();

        form.cancel();

        assert_eq!(handler.cancels.load(Ordering::SeqCst), 1);
        assert_eq!(form.state(), before);
    }

    #[test]
    fn test_record_without_id_counts_as_cleared() {
        let form = PermissionForm::new(Arc::new(RecordingHandler::default()));
        form.select_team(Some(&Team::new(3, "infra")));
        let state = form.select_team(Some(&Team::new(0, "broken")));
        assert_eq!(state.team_id(), 0);
        assert!(!form.is_valid());
    }

    #[test]
    fn test_custom_defaults_are_reset_target() {
        let defaults = FormConfig {
            default_permission: PermissionLevel::Edit,
            default_target: TargetKind::User,
        };
        let form =
            PermissionForm::with_config(Arc::new(RecordingHandler::default()), defaults);
        assert_eq!(form.state(), FormState::new(&defaults));
        assert_eq!(form.state().permission(), PermissionLevel::Edit);
    }
}
