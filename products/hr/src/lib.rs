//! HR vertical slice.
//!
//! Create and update share one [`EmployeeEditor`]: an [`EmployeeForm`] for
//! field state and a [`SubmissionWorkflow`] whose only branch is the
//! [`PersistStrategy`]. Hosts plug in a [`RecordGateway`] for persistence and
//! a [`Navigator`] for route changes.

mod details;
mod form;
mod list;
mod messages;
mod routes;
mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use details::EmployeeDetails;
pub use form::{EmployeeForm, apply_contact_preference, fields};
pub use list::EmployeeList;
pub use messages::{DEFAULT_EMAIL_DOMAIN, FormSettings, default_messages};
pub use platform_gateway::RecordGateway;
pub use routes::{Navigator, Route, RouteError};
pub use workflow::{
    EmployeeEditor, ParsePolicyError, PersistStrategy, SubmissionWorkflow, SubmitError,
    SubmitPolicy,
};
