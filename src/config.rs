//! Process-level configuration.
//!
//! Credentials for the document store and the payment processor are
//! constructed once at startup, passed explicitly to the collaborators that
//! need them, and never mutated afterwards. Secrets are held in
//! [`SecretString`] so they cannot leak through debug output or logs.

use secrecy::SecretString;

use crate::error::{EntitlementError, Result};

/// Default trial length granted to new professional accounts.
pub const DEFAULT_TRIAL_DAYS: u32 = 7;

/// Read-only configuration for the entitlements subsystem.
#[derive(Debug, Clone)]
pub struct EntitlementsConfig {
    /// Document-store project identifier.
    pub project_id: String,
    /// Path to the document-store service credentials, if file-based.
    pub credentials_path: Option<String>,
    /// Payment-processor API secret key.
    pub billing_secret_key: SecretString,
    /// Payment-processor webhook signing secret (consumed by the SDK layer).
    pub billing_webhook_secret: SecretString,
    /// Trial length in days.
    pub trial_days: u32,
}

impl EntitlementsConfig {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`EntitlementsConfig`] with environment variable support.
#[must_use = "builder does nothing until you call build()"]
#[derive(Default)]
pub struct ConfigBuilder {
    project_id: Option<String>,
    credentials_path: Option<String>,
    billing_secret_key: Option<String>,
    billing_webhook_secret: Option<String>,
    trial_days: Option<u32>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<String>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    pub fn with_billing_secret_key(mut self, key: impl Into<String>) -> Self {
        self.billing_secret_key = Some(key.into());
        self
    }

    pub fn with_billing_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.billing_webhook_secret = Some(secret.into());
        self
    }

    pub fn with_trial_days(mut self, days: u32) -> Self {
        self.trial_days = Some(days);
        self
    }

    /// Fill unset fields from the environment.
    ///
    /// Reads `AGENDFY_PROJECT_ID`, `AGENDFY_CREDENTIALS_PATH`,
    /// `AGENDFY_BILLING_SECRET_KEY`, `AGENDFY_BILLING_WEBHOOK_SECRET`, and
    /// `AGENDFY_TRIAL_DAYS`.
    pub fn from_env(mut self) -> Self {
        if self.project_id.is_none() {
            self.project_id = std::env::var("AGENDFY_PROJECT_ID").ok();
        }
        if self.credentials_path.is_none() {
            self.credentials_path = std::env::var("AGENDFY_CREDENTIALS_PATH").ok();
        }
        if self.billing_secret_key.is_none() {
            self.billing_secret_key = std::env::var("AGENDFY_BILLING_SECRET_KEY").ok();
        }
        if self.billing_webhook_secret.is_none() {
            self.billing_webhook_secret = std::env::var("AGENDFY_BILLING_WEBHOOK_SECRET").ok();
        }
        if self.trial_days.is_none() {
            self.trial_days = std::env::var("AGENDFY_TRIAL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<EntitlementsConfig> {
        let project_id = self
            .project_id
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EntitlementError::config("project_id is required"))?;

        let billing_secret_key = self
            .billing_secret_key
            .ok_or_else(|| EntitlementError::config("billing_secret_key is required"))?;

        let billing_webhook_secret = self
            .billing_webhook_secret
            .ok_or_else(|| EntitlementError::config("billing_webhook_secret is required"))?;

        Ok(EntitlementsConfig {
            project_id,
            credentials_path: self.credentials_path,
            billing_secret_key: billing_secret_key.into(),
            billing_webhook_secret: billing_webhook_secret.into(),
            trial_days: self.trial_days.unwrap_or(DEFAULT_TRIAL_DAYS),
        })
    }
}
