//! Headless form primitives shared by the product crates.
//!
//! A [`Form`] is an arena of field nodes: controls hold a text value, their
//! validation [`Rule`]s and the pristine/dirty and untouched/touched flags;
//! groups only hold children. Errors stay hidden until a control has been
//! touched or edited, and [`Form::collect_errors`] turns the visible ones
//! into display text through a [`ValidationMessages`] table.

mod form;
mod messages;
mod rules;

pub use form::{Control, Form, FormError, FormErrors, GroupSpec, NodeId, ValueListener};
pub use messages::{MessagesError, ValidationMessages};
pub use rules::{
    EMAIL_DOMAIN, ErrorKey, MAX_LENGTH, MIN_LENGTH, REQUIRED, Rule, email_domain, evaluate,
};
