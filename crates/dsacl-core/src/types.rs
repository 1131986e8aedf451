//! Shared types for permission assignment.
//!
//! Identifier newtypes guarantee a positive id, so "nothing selected" is
//! expressed as `None` instead of the sentinel `0`.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a team. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TeamId(i64);

impl TeamId {
    /// Create a new `TeamId`.
    ///
    /// # Errors
    /// Returns error if `id` is zero or negative.
    pub fn new(id: i64) -> Result<Self, CoreError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(CoreError::Validation(format!(
                "invalid team ID: must be positive, got {id}"
            )))
        }
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TeamId {
    type Error = CoreError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<TeamId> for i64 {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new `UserId`.
    ///
    /// # Errors
    /// Returns error if `id` is zero or negative.
    pub fn new(id: i64) -> Result<Self, CoreError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(CoreError::Validation(format!(
                "invalid user ID: must be positive, got {id}"
            )))
        }
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = CoreError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team record reported by the team picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Raw team identifier
    pub id: i64,
    /// Team name
    pub name: String,
    /// Team contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Number of members in the team
    #[serde(default)]
    pub member_count: u32,
}

impl Team {
    /// Create a team record with just an id and a name.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            avatar_url: None,
            member_count: 0,
        }
    }

    /// The validated identifier, or `None` when the record carries no usable id.
    #[must_use]
    pub fn team_id(&self) -> Option<TeamId> {
        TeamId::new(self.id).ok()
    }
}

/// User record reported by the user picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Raw user identifier
    pub id: i64,
    /// Login name
    pub login: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    /// Create a user record with just an id and a login.
    #[must_use]
    pub fn new(id: i64, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            email: None,
            name: None,
            avatar_url: None,
        }
    }

    /// The validated identifier, or `None` when the record carries no usable id.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        UserId::new(self.id).ok()
    }
}

/// Category of entity receiving a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetKind {
    /// A team of users
    #[default]
    Team,
    /// An individual user
    User,
}

impl TargetKind {
    /// All target kinds, in selector order.
    pub const ALL: [Self; 2] = [Self::Team, Self::User];

    /// Text shown in the target-kind selector.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Team => "Team",
            Self::User => "User",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for TargetKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team" => Ok(Self::Team),
            "user" => Ok(Self::User),
            other => Err(CoreError::Validation(format!(
                "unknown target kind '{other}'"
            ))),
        }
    }
}

/// Access tier granted on a data source.
///
/// Ordered from least to most privileged. On the wire a level travels as its
/// numeric value (see [`PermissionLevel::value`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// May run queries against the data source
    #[default]
    Query,
    /// May query and edit the data source
    Edit,
}

impl PermissionLevel {
    /// All levels, least privileged first.
    pub const ALL: [Self; 2] = [Self::Query, Self::Edit];

    /// The least privileged level.
    #[must_use]
    pub fn least_privileged() -> Self {
        Self::Query
    }

    /// Numeric wire value.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Self::Query => 1,
            Self::Edit => 2,
        }
    }

    /// Inverse of [`PermissionLevel::value`].
    #[must_use]
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Query),
            2 => Some(Self::Edit),
            _ => None,
        }
    }

    /// Label shown in the level picker.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Edit => "Edit",
        }
    }

    /// Longer explanation shown under the label.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Query => "Can query data source.",
            Self::Edit => "Can query and edit data source.",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PermissionLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" | "1" => Ok(Self::Query),
            "edit" | "2" => Ok(Self::Edit),
            other => Err(CoreError::Validation(format!(
                "unknown permission level '{other}'"
            ))),
        }
    }
}
