//! Render model for the permission form.

use crate::form::SubmitPhase;
use crate::state::{FormState, TargetSelection};
use dsacl_core::{PermissionLevel, TargetKind, TeamId, UserId};
use serde::{Deserialize, Serialize};

/// Heading shown above the form controls.
pub const FORM_TITLE: &str = "Add Permission For";

/// Label of the submit action.
pub const SUBMIT_LABEL: &str = "Save";

/// Everything a UI needs to draw the form for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormView {
    /// Heading text
    pub title: String,

    /// Currently selected target kind
    pub target_kind: TargetKind,

    /// Options for the target-kind selector
    pub target_options: Vec<TargetOption>,

    /// Which target picker to show
    pub visible_picker: PickerKind,

    /// Team shown as picked in the team picker
    pub selected_team: Option<TeamId>,

    /// User shown as picked in the user picker
    pub selected_user: Option<UserId>,

    /// Currently selected permission level
    pub permission: PermissionLevel,

    /// Options for the permission-level picker
    pub permission_options: Vec<PermissionOption>,

    /// Submit action label
    pub submit_label: String,

    /// Whether the submit action is clickable
    pub submit_enabled: bool,

    /// Whether a submission is awaiting the caller
    pub submitting: bool,
}

impl FormView {
    /// Build the render model for `state` in `phase`.
    #[must_use]
    pub fn new(state: &FormState, phase: SubmitPhase) -> Self {
        let submitting = phase == SubmitPhase::Submitting;
        let (visible_picker, selected_team, selected_user) = match state.target() {
            TargetSelection::Team(team) => (PickerKind::Team, team, None),
            TargetSelection::User(user) => (PickerKind::User, None, user),
        };

        Self {
            title: FORM_TITLE.to_string(),
            target_kind: state.target_kind(),
            target_options: TargetOption::all(),
            visible_picker,
            selected_team,
            selected_user,
            permission: state.permission(),
            permission_options: PermissionOption::all(),
            submit_label: SUBMIT_LABEL.to_string(),
            submit_enabled: state.is_valid() && !submitting,
            submitting,
        }
    }
}

/// The picker widget shown for the current target kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerKind {
    /// Team search/select widget
    Team,
    /// User search/select widget
    User,
}

/// One entry of the target-kind selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOption {
    /// Kind selected by this entry
    pub value: TargetKind,
    /// Display text
    pub text: String,
}

impl TargetOption {
    /// Selector entries in display order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        TargetKind::ALL
            .iter()
            .map(|kind| Self {
                value: *kind,
                text: kind.display_name().to_string(),
            })
            .collect()
    }
}

/// One entry of the permission-level picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOption {
    /// Level selected by this entry
    pub value: PermissionLevel,
    /// Display label
    pub label: String,
    /// Explanation shown under the label
    pub description: String,
}

impl PermissionOption {
    /// Picker entries, least privileged first.
    #[must_use]
    pub fn all() -> Vec<Self> {
        PermissionLevel::ALL
            .iter()
            .map(|level| Self {
                value: *level,
                label: level.display_name().to_string(),
                description: level.description().to_string(),
            })
            .collect()
    }
}
