use std::sync::Arc;

use entity::{ContactPreference, Employee, EmployeeId, Skill};
use platform_forms::{ErrorKey, Form, FormError, FormErrors, GroupSpec, Rule, email_domain};
use tracing::{debug, warn};

use crate::messages::FormSettings;

/// Dotted paths of the employee form controls.
pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const CONTACT_PREFERENCE: &str = "contactPreference";
    pub const PHONE: &str = "phone";
    pub const SKILL: &str = "skill";
    pub const SKILL_NAME: &str = "skill.skillName";
    pub const EXPERIENCE_IN_YEARS: &str = "skill.experienceInYears";
    pub const PROFICIENCY: &str = "skill.proficiency";
}

use fields::*;

/// Error key for non-numeric experience.
pub const NUMBER: ErrorKey = "number";

/// Whole, non-negative years; empty text is left to `Required`.
fn whole_years() -> Rule {
    Rule::custom(NUMBER, |value| {
        value.is_empty() || value.trim().parse::<u32>().is_ok()
    })
}

fn name_rules() -> Vec<Rule> {
    vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(10)]
}

/// Phone becomes required only while the preference is `phone`.
pub fn apply_contact_preference(
    form: &mut Form,
    preference: ContactPreference,
) -> Result<(), FormError> {
    match preference {
        ContactPreference::Phone => form.set_rules(PHONE, vec![Rule::Required])?,
        ContactPreference::Email => form.clear_rules(PHONE)?,
    }
    form.update_validity(PHONE)
}

/// Employee record editor state shared by the create and update screens.
#[derive(Clone, Debug)]
pub struct EmployeeForm {
    form: Form,
    settings: FormSettings,
    errors: FormErrors,
    id: Option<EmployeeId>,
}

impl EmployeeForm {
    pub fn new(settings: FormSettings) -> Self {
        let spec = GroupSpec::new()
            .control(FIRST_NAME, "", name_rules())
            .control(LAST_NAME, "", name_rules())
            .control(
                CONTACT_PREFERENCE,
                ContactPreference::default().as_str(),
                Vec::new(),
            )
            .control(
                EMAIL,
                "",
                vec![Rule::Required, email_domain(settings.email_domain.as_str())],
            )
            .control(PHONE, "", Vec::new())
            .group(
                SKILL,
                GroupSpec::new()
                    .control("skillName", "", vec![Rule::Required])
                    .control(
                        "experienceInYears",
                        "",
                        vec![Rule::Required, whole_years()],
                    )
                    .control("proficiency", "", vec![Rule::Required]),
            );
        let mut form = Form::build(spec);
        form.subscribe(
            CONTACT_PREFERENCE,
            Arc::new(|form: &mut Form, value: &str| {
                let preference = value.parse().unwrap_or_else(|err| {
                    debug!(%err, "treating unknown contact preference as email");
                    ContactPreference::Email
                });
                if let Err(err) = apply_contact_preference(form, preference) {
                    warn!(%err, "failed to apply contact preference");
                }
            }),
        )
        .expect("contactPreference is declared above");
        let errors = form.collect_errors(&settings.messages);
        Self {
            form,
            settings,
            errors,
            id: None,
        }
    }

    fn refresh_errors(&mut self) {
        self.errors = self.form.collect_errors(&self.settings.messages);
    }

    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.form.set_value(field, value)?;
        self.refresh_errors();
        Ok(())
    }

    /// Blur on `field`.
    pub fn touch(&mut self, field: &str) -> Result<(), FormError> {
        self.form.mark_touched(field)?;
        self.refresh_errors();
        Ok(())
    }

    pub fn mark_all_touched(&mut self) {
        self.form.mark_all_touched();
        self.refresh_errors();
    }

    pub fn on_contact_preference_change(
        &mut self,
        preference: ContactPreference,
    ) -> Result<(), FormError> {
        self.set_value(CONTACT_PREFERENCE, preference.as_str())
    }

    /// Fills the form from a fetched record without marking fields dirty.
    pub fn load(&mut self, employee: &Employee) -> Result<(), FormError> {
        let experience = employee
            .skill
            .experience_in_years
            .map(|years| years.to_string())
            .unwrap_or_default();
        self.form.patch_value(FIRST_NAME, employee.first_name.as_str())?;
        self.form.patch_value(LAST_NAME, employee.last_name.as_str())?;
        self.form.patch_value(EMAIL, employee.email.as_str())?;
        self.form.patch_value(PHONE, employee.phone.as_str())?;
        self.form
            .patch_value(CONTACT_PREFERENCE, employee.contact_preference.as_str())?;
        self.form
            .patch_value(SKILL_NAME, employee.skill.skill_name.as_str())?;
        self.form.patch_value(EXPERIENCE_IN_YEARS, experience)?;
        self.form
            .patch_value(PROFICIENCY, employee.skill.proficiency.as_str())?;
        self.id = employee.id;
        self.refresh_errors();
        Ok(())
    }

    /// Snapshot of the current values as a record.
    pub fn to_employee(&self) -> Employee {
        let text = |path: &str| self.form.value(path).unwrap_or_default().to_string();
        Employee {
            id: self.id,
            first_name: text(FIRST_NAME),
            last_name: text(LAST_NAME),
            email: text(EMAIL),
            phone: text(PHONE),
            contact_preference: self
                .form
                .value(CONTACT_PREFERENCE)
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            skill: Skill {
                skill_name: text(SKILL_NAME),
                experience_in_years: text(EXPERIENCE_IN_YEARS).trim().parse().ok(),
                proficiency: text(PROFICIENCY),
            },
        }
    }

    pub fn reset(&mut self) {
        self.form.reset();
        self.refresh_errors();
    }

    /// Display text per leaf field, empty while a field is pristine and untouched.
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> &str {
        self.errors.get(field)
    }

    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    pub fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    pub fn form(&self) -> &Form {
        &self.form
    }
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self::new(FormSettings::default())
    }
}
