//! Caller-side contract of the permission form.

use crate::{FormState, Result};
use async_trait::async_trait;

/// Operations the form's owner supplies.
///
/// Persisting the permission and telling the operator about failures are the
/// implementor's job; the form only awaits completion.
#[async_trait]
pub trait PermissionFormHandler: Send + Sync {
    /// Persist the permission described by `state`.
    async fn add_permission(&self, state: FormState) -> Result<()>;

    /// The operator dismissed the form.
    fn cancel(&self);
}
