use std::sync::Arc;

use platform_forms::{EMAIL_DOMAIN, MAX_LENGTH, MIN_LENGTH, REQUIRED, ValidationMessages};

use crate::form::NUMBER;

pub const DEFAULT_EMAIL_DOMAIN: &str = "gmail.com";

/// Message table for the employee form, keyed by leaf field name.
pub fn default_messages(email_domain: &str) -> ValidationMessages {
    ValidationMessages::new()
        .with("firstName", REQUIRED, "First Name is Required.")
        .with(
            "firstName",
            MIN_LENGTH,
            "First Name must be greater than 2 characters.",
        )
        .with(
            "firstName",
            MAX_LENGTH,
            "First Name must be less than 10 characters.",
        )
        .with("lastName", REQUIRED, "Last Name is Required.")
        .with(
            "lastName",
            MIN_LENGTH,
            "Last Name must be greater than 2 characters.",
        )
        .with(
            "lastName",
            MAX_LENGTH,
            "Last Name must be less than 10 characters.",
        )
        .with("email", REQUIRED, "Email is Required.")
        .with(
            "email",
            EMAIL_DOMAIN,
            format!("Email Domain should be {email_domain}"),
        )
        .with("phone", REQUIRED, "Phone is Required.")
        .with("skillName", REQUIRED, "Skill Name is Required.")
        .with(
            "experienceInYears",
            REQUIRED,
            "Experience in Years is Required.",
        )
        .with(
            "experienceInYears",
            NUMBER,
            "Experience in Years must be a whole number.",
        )
        .with("proficiency", REQUIRED, "Proficiency is Required.")
}

/// Shared, immutable inputs for building employee forms.
#[derive(Clone, Debug)]
pub struct FormSettings {
    pub email_domain: String,
    pub messages: Arc<ValidationMessages>,
}

impl FormSettings {
    pub fn new(email_domain: impl Into<String>) -> Self {
        let email_domain = email_domain.into();
        let messages = Arc::new(default_messages(&email_domain));
        Self {
            email_domain,
            messages,
        }
    }

    pub fn with_overrides(self, overrides: ValidationMessages) -> Self {
        let messages = Arc::unwrap_or_clone(self.messages).merged(overrides);
        Self {
            email_domain: self.email_domain,
            messages: Arc::new(messages),
        }
    }
}

impl Default for FormSettings {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL_DOMAIN)
    }
}
