//! dsacl Form - Permission assignment form for data sources.
//!
//! The form lets an operator grant a permission level on a data source to a
//! team or to a single user:
//! - [`FormState`] and [`FormEvent`] - immutable state and its transitions
//! - [`PermissionForm`] - event handling, validation and submission
//! - [`FormView`] - render model for the selector, pickers and submit action
//! - [`DataSourceAcl`] - in-memory permission list that can receive submissions
//!
//! # Example
//!
//! ```rust
//! use dsacl_core::{PermissionLevel, Team};
//! use dsacl_form::{DataSourceAcl, PermissionForm};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let acl = Arc::new(DataSourceAcl::new(1));
//! let form = PermissionForm::new(Arc::clone(&acl));
//!
//! form.select_team(Some(&Team::new(42, "operators")));
//! assert!(form.can_submit());
//!
//! let outcome = form.submit().await;
//! assert!(outcome.is_success());
//! assert_eq!(acl.items()[0].permission, PermissionLevel::Query);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod acl;
mod audit;
mod form;
mod handler;
mod state;
mod view;

pub use acl::{AclItem, DataSourceAcl};
pub use audit::{AuditEntry, AuditEventType, AuditLogger};
pub use form::{PermissionForm, SubmitOutcome, SubmitPhase};
pub use handler::PermissionFormHandler;
pub use state::{FormEvent, FormState, Grantee, TargetSelection};
pub use view::{FormView, PermissionOption, PickerKind, TargetOption, FORM_TITLE, SUBMIT_LABEL};

use dsacl_core::{CoreError, TargetKind};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while adding or removing permissions.
#[derive(Error, Debug)]
pub enum AclError {
    /// The grantee already holds a permission on this data source
    #[error("permission already exists for {0}")]
    Duplicate(Grantee),

    /// No concrete target was selected
    #[error("no {0} selected")]
    NoTarget(TargetKind),

    /// No permission item with this id
    #[error("permission {0} not found")]
    NotFound(Uuid),

    /// A serialized form state violates the form invariants
    #[error("invalid form state: {0}")]
    InvalidState(String),

    /// Failure reported by an external permission handler
    #[error("add permission failed: {0}")]
    Handler(String),

    /// Shared validation or configuration error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, AclError>;
