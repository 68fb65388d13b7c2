//! Excess-resource detection after a trial lapses.
//!
//! A professional who built up services and clients during a premium trial
//! may exceed the free-tier caps once the trial ends. This module surfaces
//! that exactly once: the detector computes the excess, the UI shows a
//! banner, and acknowledging it flips `transition.notified` — the single
//! write this crate performs.

use crate::account::Account;
use crate::error::Result;
use crate::plans::{FREE_MAX_CLIENTS, FREE_MAX_SERVICES};
use crate::storage::{AccountStore, ResourceStore};

/// Outcome of the excess-resource check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcessReport {
    /// Whether any resource exceeds the free-tier cap.
    pub has_excess: bool,
    /// Active services beyond the free cap.
    pub excess_services: u32,
    /// Clients beyond the free cap.
    pub excess_clients: u32,
    /// Human-readable summary naming which resources exceed and by how much.
    pub message: String,
}

impl ExcessReport {
    /// Compute a report from live counts. Pure: the I/O happens before this.
    #[must_use]
    pub fn compute(service_count: u32, client_count: u32) -> Self {
        let excess_services = service_count.saturating_sub(FREE_MAX_SERVICES);
        let excess_clients = client_count.saturating_sub(FREE_MAX_CLIENTS);
        let has_excess = excess_services > 0 || excess_clients > 0;

        let message = if has_excess {
            let mut parts = Vec::new();
            if excess_services > 0 {
                parts.push(format!(
                    "{} active services over the limit of {}",
                    excess_services, FREE_MAX_SERVICES
                ));
            }
            if excess_clients > 0 {
                parts.push(format!(
                    "{} clients over the limit of {}",
                    excess_clients, FREE_MAX_CLIENTS
                ));
            }
            format!(
                "Your trial has ended and your account exceeds the free plan: {}.",
                parts.join(" and ")
            )
        } else {
            "Your usage is within the free plan limits.".to_string()
        };

        Self {
            has_excess,
            excess_services,
            excess_clients,
            message,
        }
    }
}

/// Caller-side guard: whether the excess check should run at all for this
/// account. The detector itself does not re-check `notified`; the UI layer
/// short-circuits here before invoking it.
#[must_use]
pub fn should_check_transition(account: &Account) -> bool {
    if account.transition_notified() {
        return false;
    }
    if account.has_premium_access() {
        return false;
    }
    // A trial was held and has since lapsed.
    account.trial.map_or(false, |t| !t.active)
}

/// Detects excess resources after a trial lapses and records the one-time
/// acknowledgement.
pub struct TransitionDetector<S: AccountStore, R: ResourceStore> {
    accounts: S,
    resources: R,
}

impl<S: AccountStore, R: ResourceStore> TransitionDetector<S, R> {
    /// Create a new transition detector.
    #[must_use]
    pub fn new(accounts: S, resources: R) -> Self {
        Self { accounts, resources }
    }

    /// Fetch current counts for the account and compute the excess report.
    ///
    /// Store failures propagate to the caller; the computation itself cannot
    /// fail.
    pub async fn check_excess_resources(&self, account_id: &str) -> Result<ExcessReport> {
        let service_count = self.resources.count_active_services(account_id).await?;
        let client_count = self.resources.count_clients(account_id).await?;

        let report = ExcessReport::compute(service_count, client_count);
        tracing::debug!(
            target: "agendfy::transition",
            account_id = %account_id,
            has_excess = report.has_excess,
            excess_services = report.excess_services,
            excess_clients = report.excess_clients,
            "Checked excess resources"
        );
        Ok(report)
    }

    /// Record that the transition notice has been shown and acknowledged.
    ///
    /// Idempotent: calling this when `notified` is already true leaves it
    /// true. The transition `NOT_NOTIFIED → NOTIFIED` is one-way; no reset
    /// path exists here.
    pub async fn mark_notification_seen(&self, account_id: &str) -> Result<()> {
        self.accounts.set_transition_notified(account_id).await?;
        tracing::info!(
            target: "agendfy::transition",
            account_id = %account_id,
            "Transition notification acknowledged"
        );
        Ok(())
    }
}
