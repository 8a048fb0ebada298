use std::{fmt, str::FromStr};

use entity::{Employee, EmployeeId};
use platform_forms::FormErrors;
use platform_gateway::{GatewayError, Payload, RecordGateway};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    form::EmployeeForm,
    messages::FormSettings,
    routes::{Navigator, Route},
};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form has validation errors:\n{0}")]
    Invalid(FormErrors),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// How a submitted record is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistStrategy {
    Create,
    Update(EmployeeId),
}

/// Whether an invalid form may still be sent to the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPolicy {
    /// Always attempt persistence; validity is advisory.
    #[default]
    Lenient,
    /// Refuse invalid forms without calling the gateway.
    RequireValid,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown submit policy: {0} (expected lenient or strict)")]
pub struct ParsePolicyError(pub String);

impl FromStr for SubmitPolicy {
    type Err = ParsePolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(SubmitPolicy::Lenient),
            "strict" | "require-valid" => Ok(SubmitPolicy::RequireValid),
            _ => Err(ParsePolicyError(value.to_string())),
        }
    }
}

impl fmt::Display for SubmitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitPolicy::Lenient => f.write_str("lenient"),
            SubmitPolicy::RequireValid => f.write_str("strict"),
        }
    }
}

/// Persists a record through the gateway and returns to the list on success.
pub struct SubmissionWorkflow<G, N> {
    gateway: G,
    navigator: N,
    strategy: PersistStrategy,
}

impl<G, N> SubmissionWorkflow<G, N>
where
    G: RecordGateway<Employee>,
    N: Navigator,
{
    pub fn new(gateway: G, navigator: N, strategy: PersistStrategy) -> Self {
        Self {
            gateway,
            navigator,
            strategy,
        }
    }

    pub fn strategy(&self) -> PersistStrategy {
        self.strategy
    }

    /// Sends `record` regardless of form validity. Failures are logged and
    /// returned; nothing is retried.
    pub async fn submit(&self, record: &Employee) -> Result<Payload, SubmitError> {
        info!(strategy = ?self.strategy, name = %record.full_name(), "submitting employee");
        let outcome = match self.strategy {
            PersistStrategy::Create => self.gateway.create(record).await,
            PersistStrategy::Update(id) => self.gateway.update(id, record).await,
        };
        match outcome {
            Ok(payload) => {
                debug!(%payload, "employee persisted");
                self.navigator.navigate(Route::List);
                Ok(payload)
            }
            Err(err) => {
                error!(code = err.code(), error = %err, "failed to persist employee");
                Err(err.into())
            }
        }
    }
}

/// One create or update screen: form state plus its submission workflow.
pub struct EmployeeEditor<G, N> {
    form: EmployeeForm,
    workflow: SubmissionWorkflow<G, N>,
    policy: SubmitPolicy,
}

impl<G, N> EmployeeEditor<G, N>
where
    G: RecordGateway<Employee>,
    N: Navigator,
{
    /// Empty form persisted with `create`.
    pub fn create(gateway: G, navigator: N, settings: FormSettings) -> Self {
        Self {
            form: EmployeeForm::new(settings),
            workflow: SubmissionWorkflow::new(gateway, navigator, PersistStrategy::Create),
            policy: SubmitPolicy::default(),
        }
    }

    /// Form filled from `get_by_id(id)` and persisted with `update(id, ..)`.
    pub async fn load(
        gateway: G,
        navigator: N,
        settings: FormSettings,
        id: EmployeeId,
    ) -> Result<Self, GatewayError> {
        let employee = gateway.get_by_id(id).await.inspect_err(|err| {
            error!(id, code = err.code(), error = %err, "failed to load employee");
        })?;
        let mut form = EmployeeForm::new(settings);
        if let Err(err) = form.load(&employee) {
            warn!(id, error = %err, "employee record did not fit the form");
        }
        Ok(Self {
            form,
            workflow: SubmissionWorkflow::new(gateway, navigator, PersistStrategy::Update(id)),
            policy: SubmitPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn strategy(&self) -> PersistStrategy {
        self.workflow.strategy()
    }

    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EmployeeForm {
        &mut self.form
    }

    pub async fn submit(&mut self) -> Result<Payload, SubmitError> {
        if self.policy == SubmitPolicy::RequireValid && !self.form.is_valid() {
            self.form.mark_all_touched();
            warn!(strategy = ?self.strategy(), "refusing to submit invalid employee form");
            return Err(SubmitError::Invalid(self.form.errors().clone()));
        }
        let record = self.form.to_employee();
        self.workflow.submit(&record).await
    }
}
