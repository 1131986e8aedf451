//! Audit log of data source permission changes.

use crate::state::Grantee;
use chrono::{DateTime, Utc};
use dsacl_core::PermissionLevel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Records permission additions, removals and rejected additions.
#[derive(Debug, Default)]
pub struct AuditLogger {
    entries: Vec<AuditEntry>,
}

impl AuditLogger {
    /// Create a new audit logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a permission being added.
    pub fn log_added(&mut self, grantee: Grantee, permission: PermissionLevel) {
        info!(%grantee, %permission, "permission added");
        self.push(AuditEventType::PermissionAdded {
            grantee,
            permission,
        });
    }

    /// Log a permission being removed.
    pub fn log_removed(&mut self, grantee: Grantee, permission: PermissionLevel) {
        info!(%grantee, %permission, "permission removed");
        self.push(AuditEventType::PermissionRemoved {
            grantee,
            permission,
        });
    }

    /// Log an addition that was refused.
    pub fn log_rejected(&mut self, grantee: Option<Grantee>, reason: &str) {
        warn!(?grantee, reason, "permission addition rejected");
        self.push(AuditEventType::AdditionRejected {
            grantee,
            reason: reason.to_string(),
        });
    }

    fn push(&mut self, event_type: AuditEventType) {
        self.entries.push(AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
        });
    }

    /// Get all audit entries.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Get audit entries that concern `grantee`.
    #[must_use]
    pub fn entries_for_grantee(&self, grantee: Grantee) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.involves(grantee))
            .collect()
    }

    /// Get recent audit entries (last N).
    #[must_use]
    pub fn recent_entries(&self, count: usize) -> Vec<&AuditEntry> {
        let start = self.entries.len().saturating_sub(count);
        self.entries[start..].iter().collect()
    }

    /// Clear all audit entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get count of entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// Type of event
    pub event_type: AuditEventType,
}

impl AuditEntry {
    /// Check if this entry concerns a specific grantee.
    #[must_use]
    pub fn involves(&self, grantee: Grantee) -> bool {
        match &self.event_type {
            AuditEventType::PermissionAdded { grantee: g, .. }
            | AuditEventType::PermissionRemoved { grantee: g, .. } => *g == grantee,
            AuditEventType::AdditionRejected { grantee: g, .. } => *g == Some(grantee),
        }
    }

    /// Get a human-readable description of this event.
    #[must_use]
    pub fn description(&self) -> String {
        match &self.event_type {
            AuditEventType::PermissionAdded {
                grantee,
                permission,
            } => format!("{permission} permission added for {grantee}"),
            AuditEventType::PermissionRemoved {
                grantee,
                permission,
            } => format!("{permission} permission removed from {grantee}"),
            AuditEventType::AdditionRejected {
                grantee: Some(grantee),
                reason,
            } => format!("Permission for {grantee} rejected: {reason}"),
            AuditEventType::AdditionRejected {
                grantee: None,
                reason,
            } => format!("Permission rejected: {reason}"),
        }
    }
}

/// Type of audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// A permission was added
    PermissionAdded {
        /// Who received the permission
        grantee: Grantee,
        /// Granted level
        permission: PermissionLevel,
    },

    /// A permission was removed
    PermissionRemoved {
        /// Who lost the permission
        grantee: Grantee,
        /// Level that was removed
        permission: PermissionLevel,
    },

    /// An addition was refused
    AdditionRejected {
        /// Intended grantee, if one was selected
        grantee: Option<Grantee>,
        /// Why it was refused
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsacl_core::{TeamId, UserId};

    fn team(id: i64) -> Grantee {
        Grantee::Team(TeamId::new(id).unwrap())
    }

    fn user(id: i64) -> Grantee {
        Grantee::User(UserId::new(id).unwrap())
    }

    #[test]
    fn test_audit_logger_new() {
        let logger = AuditLogger::new();
        assert_eq!(logger.entry_count(), 0);
    }

    #[test]
    fn test_log_added() {
        let mut logger = AuditLogger::new();
        logger.log_added(team(42), PermissionLevel::Query);

        assert_eq!(logger.entry_count(), 1);
        assert!(matches!(
            logger.entries()[0].event_type,
            AuditEventType::PermissionAdded { .. }
        ));
    }

    #[test]
    fn test_entries_for_grantee() {
        let mut logger = AuditLogger::new();
        logger.log_added(team(42), PermissionLevel::Query);
        logger.log_added(user(7), PermissionLevel::Edit);
        logger.log_rejected(Some(team(42)), "already exists");
        logger.log_rejected(None, "no target selected");
        logger.log_removed(team(42), PermissionLevel::Query);

        assert_eq!(logger.entries_for_grantee(team(42)).len(), 3);
        assert_eq!(logger.entries_for_grantee(user(7)).len(), 1);
        assert!(logger.entries_for_grantee(user(8)).is_empty());
    }

    #[test]
    fn test_recent_entries() {
        let mut logger = AuditLogger::new();
        for id in 1..=10 {
            logger.log_added(user(id), PermissionLevel::Query);
        }

        let recent = logger.recent_entries(3);
        assert_eq!(recent.len(), 3);
        assert!(recent[2].involves(user(10)));
        assert_eq!(logger.recent_entries(50).len(), 10);
    }

    #[test]
    fn test_clear() {
        let mut logger = AuditLogger::new();
        logger.log_added(team(1), PermissionLevel::Query);
        logger.clear();
        assert_eq!(logger.entry_count(), 0);
    }

    #[test]
    fn test_descriptions() {
        let mut logger = AuditLogger::new();
        logger.log_added(team(42), PermissionLevel::Edit);
        logger.log_rejected(None, "no target selected");

        assert_eq!(
            logger.entries()[0].description(),
            "Edit permission added for team 42"
        );
        assert_eq!(
            logger.entries()[1].description(),
            "Permission rejected: no target selected"
        );
    }

    #[test]
    fn test_audit_entry_serialization() {
        let mut logger = AuditLogger::new();
        logger.log_added(user(7), PermissionLevel::Query);

        let json = serde_json::to_value(&logger.entries()[0]).expect("serialize audit entry");
        assert_eq!(json["event_type"]["type"], "permission_added");
        assert_eq!(json["event_type"]["grantee"]["type"], "User");
        assert_eq!(json["event_type"]["grantee"]["id"], 7);
    }
}
