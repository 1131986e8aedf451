//! In-memory permission list for one data source.
//!
//! Plays the parent role of the form: it persists submitted permissions,
//! keeps the audit trail and decides whether the form is shown.

use crate::{
    audit::AuditLogger, handler::PermissionFormHandler, AclError, FormState, Grantee, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dsacl_core::PermissionLevel;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// A permission granted on a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclItem {
    /// Unique identifier for this item
    pub id: Uuid,

    /// Data source the permission applies to
    pub datasource_id: i64,

    /// Who holds the permission
    pub grantee: Grantee,

    /// Granted level
    pub permission: PermissionLevel,

    /// When the permission was added
    pub created: DateTime<Utc>,
}

/// Permission list of a single data source.
///
/// Cloning shares the underlying list, so one clone can be handed to a
/// [`PermissionForm`](crate::PermissionForm) while another lists items.
#[derive(Debug, Clone)]
pub struct DataSourceAcl {
    datasource_id: i64,
    items: Arc<RwLock<Vec<AclItem>>>,
    adding: Arc<AtomicBool>,
    audit_logger: Arc<RwLock<AuditLogger>>,
}

impl DataSourceAcl {
    /// Create an empty permission list for a data source.
    #[must_use]
    pub fn new(datasource_id: i64) -> Self {
        Self {
            datasource_id,
            items: Arc::new(RwLock::new(Vec::new())),
            adding: Arc::new(AtomicBool::new(false)),
            audit_logger: Arc::new(RwLock::new(AuditLogger::new())),
        }
    }

    /// The data source this list belongs to.
    #[must_use]
    pub fn datasource_id(&self) -> i64 {
        self.datasource_id
    }

    /// Grant `permission` to `grantee`.
    ///
    /// # Errors
    /// Returns `AclError::Duplicate` if the grantee already holds a permission.
    pub fn add(&self, grantee: Grantee, permission: PermissionLevel) -> Result<AclItem> {
        let mut items = write(&self.items);

        if items.iter().any(|item| item.grantee == grantee) {
            let err = AclError::Duplicate(grantee);
            write(&self.audit_logger).log_rejected(Some(grantee), &err.to_string());
            return Err(err);
        }

        let item = AclItem {
            id: Uuid::new_v4(),
            datasource_id: self.datasource_id,
            grantee,
            permission,
            created: Utc::now(),
        };
        items.push(item.clone());
        write(&self.audit_logger).log_added(grantee, permission);

        Ok(item)
    }

    /// Remove a permission by item id.
    ///
    /// # Errors
    /// Returns `AclError::NotFound` if no such item exists.
    pub fn remove(&self, item_id: Uuid) -> Result<AclItem> {
        let mut items = write(&self.items);
        let index = items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(AclError::NotFound(item_id))?;

        let item = items.remove(index);
        write(&self.audit_logger).log_removed(item.grantee, item.permission);
        Ok(item)
    }

    /// All permissions, in the order they were added.
    #[must_use]
    pub fn items(&self) -> Vec<AclItem> {
        read(&self.items).clone()
    }

    /// The level held by `grantee`, if any.
    #[must_use]
    pub fn permission_for(&self, grantee: Grantee) -> Option<PermissionLevel> {
        read(&self.items)
            .iter()
            .find(|item| item.grantee == grantee)
            .map(|item| item.permission)
    }

    /// Show the add-permission form.
    pub fn open_form(&self) {
        debug!(datasource_id = self.datasource_id, "opening permission form");
        self.adding.store(true, Ordering::SeqCst);
    }

    /// Whether the add-permission form is shown.
    #[must_use]
    pub fn is_adding(&self) -> bool {
        self.adding.load(Ordering::SeqCst)
    }

    /// Get a reference to the audit logger.
    #[must_use]
    pub fn audit_logger(&self) -> Arc<RwLock<AuditLogger>> {
        Arc::clone(&self.audit_logger)
    }
}

#[async_trait]
impl PermissionFormHandler for DataSourceAcl {
    async fn add_permission(&self, state: FormState) -> Result<()> {
        let Some(grantee) = state.target().grantee() else {
            let err = AclError::NoTarget(state.target_kind());
            write(&self.audit_logger).log_rejected(None, &err.to_string());
            return Err(err);
        };

        let item = self.add(grantee, state.permission())?;
        info!(
            datasource_id = self.datasource_id,
            item_id = %item.id,
            %grantee,
            "permission stored"
        );
        Ok(())
    }

    fn cancel(&self) {
        debug!(datasource_id = self.datasource_id, "closing permission form");
        self.adding.store(false, Ordering::SeqCst);
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
