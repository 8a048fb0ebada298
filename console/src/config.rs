use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use platform_forms::ValidationMessages;
use platform_gateway::GatewayConfig;
use products_hr::{DEFAULT_EMAIL_DOMAIN, FormSettings, SubmitPolicy};

pub const DEFAULT_API_URL: &str = "http://localhost:8082/api/v1/employees";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub timeout: Option<Duration>,
    pub email_domain: String,
    pub messages_path: Option<PathBuf>,
    pub submit_policy: SubmitPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = var("EMPLOYEE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());

        let timeout = var("EMPLOYEE_API_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .with_context(|| format!("invalid EMPLOYEE_API_TIMEOUT_SECS: {raw}"))
            })
            .transpose()?
            .map(Duration::from_secs);
        if timeout == Some(Duration::ZERO) {
            return Err(anyhow!("EMPLOYEE_API_TIMEOUT_SECS must be positive"));
        }

        let email_domain =
            var("EMPLOYEE_EMAIL_DOMAIN").unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.into());
        let messages_path = var("VALIDATION_MESSAGES_PATH").map(PathBuf::from);
        let submit_policy = var("SUBMIT_POLICY")
            .map(|raw| raw.parse::<SubmitPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api_url,
            timeout,
            email_domain,
            messages_path,
            submit_policy,
        })
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        let config = GatewayConfig::new(self.api_url.clone());
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }

    /// Default messages for the configured domain, with file overrides applied.
    pub fn form_settings(&self) -> Result<FormSettings> {
        let settings = FormSettings::new(self.email_domain.clone());
        let Some(path) = &self.messages_path else {
            return Ok(settings);
        };
        let overrides = ValidationMessages::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
        Ok(settings.with_overrides(overrides))
    }
}
