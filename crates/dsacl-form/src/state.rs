//! Form state and its transition function.
//!
//! Every event produces a complete new [`FormState`]; nothing is patched in
//! place. The target is a tagged union, so a stale identifier for the
//! inactive kind cannot exist.

use crate::AclError;
use dsacl_core::{FormConfig, PermissionLevel, TargetKind, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The concrete target chosen in the form, keyed by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSelection {
    /// A team target, with the picked team if any
    Team(Option<TeamId>),
    /// A user target, with the picked user if any
    User(Option<UserId>),
}

impl TargetSelection {
    /// An empty selection of the given kind.
    #[must_use]
    pub fn empty(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Team => Self::Team(None),
            TargetKind::User => Self::User(None),
        }
    }

    /// Which kind of target this is.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Team(_) => TargetKind::Team,
            Self::User(_) => TargetKind::User,
        }
    }

    /// Whether a concrete target has been picked for the active kind.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Team(team) => team.is_some(),
            Self::User(user) => user.is_some(),
        }
    }

    /// The picked grantee, if the selection is complete.
    #[must_use]
    pub fn grantee(&self) -> Option<Grantee> {
        match *self {
            Self::Team(team) => team.map(Grantee::Team),
            Self::User(user) => user.map(Grantee::User),
        }
    }
}

/// A fully identified permission target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum Grantee {
    /// A team
    Team(TeamId),
    /// A single user
    User(UserId),
}

impl Grantee {
    /// Which kind of target this is.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Team(_) => TargetKind::Team,
            Self::User(_) => TargetKind::User,
        }
    }
}

impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team(id) => write!(f, "team {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// A selection-changed event coming from one of the form's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    /// The target-kind selector changed (even to the same kind)
    TargetKindChanged(TargetKind),
    /// The team picker reported a team, or was cleared
    TeamSelected(Option<TeamId>),
    /// The user picker reported a user, or was cleared
    UserSelected(Option<UserId>),
    /// The permission-level picker changed
    PermissionChanged(PermissionLevel),
}

/// Complete state of an in-progress permission assignment.
///
/// Serializes to the flat record handed to callers:
/// `{"userId":0,"teamId":42,"type":"Team","permission":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "FormStatePayload", try_from = "FormStatePayload")]
pub struct FormState {
    target: TargetSelection,
    permission: PermissionLevel,
}

impl FormState {
    /// A fresh state built from the configured defaults.
    #[must_use]
    pub fn new(defaults: &FormConfig) -> Self {
        Self {
            target: TargetSelection::empty(defaults.default_target),
            permission: defaults.default_permission,
        }
    }

    /// Build a state from explicit parts.
    #[must_use]
    pub fn from_parts(target: TargetSelection, permission: PermissionLevel) -> Self {
        Self { target, permission }
    }

    /// Produce the state that follows `event`.
    #[must_use]
    pub fn apply(self, event: FormEvent) -> Self {
        match event {
            FormEvent::TargetKindChanged(kind) => Self {
                target: TargetSelection::empty(kind),
                permission: self.permission,
            },
            FormEvent::TeamSelected(team) => match self.target {
                TargetSelection::Team(_) => Self {
                    target: TargetSelection::Team(team),
                    permission: self.permission,
                },
                // team picker is not shown for user targets
                TargetSelection::User(_) => self,
            },
            FormEvent::UserSelected(user) => match self.target {
                TargetSelection::User(_) => Self {
                    target: TargetSelection::User(user),
                    permission: self.permission,
                },
                TargetSelection::Team(_) => self,
            },
            FormEvent::PermissionChanged(permission) => Self {
                target: self.target,
                permission,
            },
        }
    }

    /// Whether the state is complete enough to submit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.target.is_complete()
    }

    /// The current target selection.
    #[must_use]
    pub fn target(&self) -> TargetSelection {
        self.target
    }

    /// The selected target kind.
    #[must_use]
    pub fn target_kind(&self) -> TargetKind {
        self.target.kind()
    }

    /// The picked team id, `0` when none is picked or the target is a user.
    #[must_use]
    pub fn team_id(&self) -> i64 {
        match self.target {
            TargetSelection::Team(Some(id)) => id.get(),
            TargetSelection::Team(None) | TargetSelection::User(_) => 0,
        }
    }

    /// The picked user id, `0` when none is picked or the target is a team.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        match self.target {
            TargetSelection::User(Some(id)) => id.get(),
            TargetSelection::User(None) | TargetSelection::Team(_) => 0,
        }
    }

    /// The selected permission level.
    #[must_use]
    pub fn permission(&self) -> PermissionLevel {
        self.permission
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(&FormConfig::default())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormStatePayload {
    user_id: i64,
    team_id: i64,
    #[serde(rename = "type")]
    target_kind: TargetKind,
    permission: u8,
}

impl From<FormState> for FormStatePayload {
    fn from(state: FormState) -> Self {
        Self {
            user_id: state.user_id(),
            team_id: state.team_id(),
            target_kind: state.target_kind(),
            permission: state.permission.value(),
        }
    }
}

impl TryFrom<FormStatePayload> for FormState {
    type Error = AclError;

    fn try_from(payload: FormStatePayload) -> Result<Self, Self::Error> {
        let permission = PermissionLevel::from_value(payload.permission).ok_or_else(|| {
            AclError::InvalidState(format!("unknown permission value {}", payload.permission))
        })?;

        let target = match payload.target_kind {
            TargetKind::Team => {
                if payload.user_id != 0 {
                    return Err(AclError::InvalidState(
                        "userId must be 0 for a team target".to_string(),
                    ));
                }
                TargetSelection::Team(optional_id(payload.team_id, TeamId::new)?)
            }
            TargetKind::User => {
                if payload.team_id != 0 {
                    return Err(AclError::InvalidState(
                        "teamId must be 0 for a user target".to_string(),
                    ));
                }
                TargetSelection::User(optional_id(payload.user_id, UserId::new)?)
            }
        };

        Ok(Self { target, permission })
    }
}

fn optional_id<T>(
    raw: i64,
    make: impl FnOnce(i64) -> dsacl_core::Result<T>,
) -> Result<Option<T>, AclError> {
    if raw == 0 {
        Ok(None)
    } else {
        Ok(Some(make(raw)?))
    }
}
