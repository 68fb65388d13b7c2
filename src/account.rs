//! Account records as read from the external document store.
//!
//! This crate never creates accounts; it reads them, derives entitlement
//! decisions, and writes back exactly one field (`transition.notified`).

use serde::{Deserialize, Deserializer, Serialize};

use crate::plans::Tier;

/// Role of an account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// A service professional (salon, clinic, gym) with a bookable agenda.
    Professional,
    /// A client booking appointments with professionals.
    Client,
    /// Platform operator.
    Ceo,
}

/// Trial window on a professional account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialWindow {
    /// Whether the trial currently grants premium access. This flag is
    /// authoritative: a `premium_trial` account without `active == true`
    /// resolves to free-tier limits.
    pub active: bool,
    /// Trial start (unix seconds).
    pub started_at: u64,
    /// Trial end (unix seconds).
    pub ends_at: u64,
}

impl TrialWindow {
    /// Remaining whole days of the trial, if any.
    #[must_use]
    pub fn days_remaining(&self, now: u64) -> Option<u32> {
        if self.active && self.ends_at > now {
            Some(((self.ends_at - now) / 86400) as u32)
        } else {
            None
        }
    }
}

/// Subscription fields synced from billing webhooks.
///
/// This crate only reads these; the webhook processor is the sole writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Whether the subscription will cancel at the end of the billing period.
    pub cancel_at_period_end: bool,
    /// Cancellation-effective timestamp (unix seconds), if scheduled.
    pub cancel_at: Option<u64>,
}

/// Tracks the one-time "you now exceed free-tier limits" notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// When the excess check last ran (unix seconds).
    pub last_check: u64,
    /// Services deactivated by the downgrade at that check.
    pub services_disabled: u32,
    /// Client count observed at that check.
    pub total_clients: u32,
    /// Appointment count observed at that check.
    pub total_appointments: u32,
    /// Whether the notice has been shown. Monotonic: once true, nothing in
    /// this crate resets it.
    pub notified: bool,
}

/// An account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub role: AccountRole,
    /// Subscription status as last synced from billing. `None` when the
    /// stored value is absent or unrecognized; both resolve to the free
    /// tier downstream.
    #[serde(default, deserialize_with = "de_subscription_status")]
    pub subscription_status: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<TrialWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionRecord>,
}

impl Account {
    /// Create a minimal account with no subscription state.
    #[must_use]
    pub fn new(id: impl Into<String>, role: AccountRole) -> Self {
        Self {
            id: id.into(),
            role,
            subscription_status: None,
            trial: None,
            subscription: None,
            transition: None,
        }
    }

    /// Whether this account currently has full premium access: either a
    /// paid premium subscription, or a premium trial whose window is active.
    #[must_use]
    pub fn has_premium_access(&self) -> bool {
        match self.subscription_status {
            Some(Tier::Premium) => true,
            Some(Tier::PremiumTrial) => self.trial.map_or(false, |t| t.active),
            Some(Tier::Free) | None => false,
        }
    }

    /// Whether the transition notice has already been shown.
    #[must_use]
    pub fn transition_notified(&self) -> bool {
        self.transition.map_or(false, |t| t.notified)
    }
}

/// Deserialize a subscription status, mapping unrecognized values to `None`
/// rather than failing. A record written by an older or newer version of the
/// platform must still resolve — to the free tier.
fn de_subscription_status<'de, D>(deserializer: D) -> Result<Option<Tier>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Tier::parse))
}
