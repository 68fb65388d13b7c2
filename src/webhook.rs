//! Billing webhook consumption.
//!
//! Subscription lifecycle events arrive already verified by the payment
//! processor's SDK; this module only syncs the fields the entitlement logic
//! reads — subscription status, trial window, and cancellation schedule —
//! onto the account record. Events are idempotent by id: a redelivered
//! event is acknowledged without re-applying.

use serde::Deserialize;

use crate::account::{SubscriptionInfo, TrialWindow};
use crate::error::Result;
use crate::plans::Tier;
use crate::storage::{unix_now, AccountStore};

/// A verified subscription lifecycle event.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEvent {
    /// Event ID, used for idempotency.
    pub id: String,
    /// Event type (e.g. "subscription.updated").
    #[serde(rename = "type")]
    pub event_type: String,
    /// The account this event applies to.
    pub account_id: String,
    /// Subscription status as reported by the processor.
    #[serde(default)]
    pub status: Option<String>,
    /// Whether the subscription will cancel at period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,
    /// Cancellation-effective timestamp (unix seconds).
    #[serde(default)]
    pub cancel_at: Option<u64>,
    /// Trial end timestamp (unix seconds), if the subscription is trialing.
    #[serde(default)]
    pub trial_end: Option<u64>,
    /// When the event was created (unix seconds).
    pub created: u64,
}

/// Parse a verified event payload.
pub fn parse_event(payload: &[u8]) -> Result<SubscriptionEvent> {
    serde_json::from_slice(payload).map_err(|e| {
        tracing::warn!(
            target: "agendfy::webhook",
            error = %e,
            "Failed to parse billing event payload"
        );
        crate::error::EntitlementError::invalid_event("malformed JSON payload")
    })
}

/// Outcome of applying a billing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event was applied to the account.
    Processed,
    /// Event was not relevant (unknown type or unknown account).
    Ignored,
    /// Event id was seen before (idempotency).
    AlreadyProcessed,
}

/// Applies subscription lifecycle events to account records.
pub struct WebhookProcessor<S: AccountStore> {
    store: S,
}

impl<S: AccountStore> WebhookProcessor<S> {
    /// Create a new webhook processor.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Apply a verified event, handling idempotency and routing.
    pub async fn apply(&self, event: SubscriptionEvent) -> Result<WebhookOutcome> {
        if self.store.is_event_processed(&event.id).await? {
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        let outcome = match event.event_type.as_str() {
            "subscription.created" | "subscription.updated" => {
                self.apply_update(&event).await?
            }
            "subscription.cancelled" => self.apply_cancellation(&event).await?,
            _ => WebhookOutcome::Ignored,
        };

        if !matches!(outcome, WebhookOutcome::Ignored) {
            self.store.mark_event_processed(&event.id).await?;
        }

        Ok(outcome)
    }

    /// Sync status, trial window, and cancellation schedule from a
    /// created/updated event.
    async fn apply_update(&self, event: &SubscriptionEvent) -> Result<WebhookOutcome> {
        let Some(mut account) = self.store.get_account(&event.account_id).await? else {
            tracing::warn!(
                target: "agendfy::webhook",
                account_id = %event.account_id,
                event_id = %event.id,
                "Billing event for unknown account"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        // Unrecognized statuses become None and resolve to free downstream.
        account.subscription_status = event.status.as_deref().and_then(Tier::parse);

        match account.subscription_status {
            Some(Tier::PremiumTrial) => {
                let now = unix_now();
                let ends_at = event.trial_end.unwrap_or(event.created);
                let started_at = account
                    .trial
                    .map(|t| t.started_at)
                    .unwrap_or(event.created);
                account.trial = Some(TrialWindow {
                    active: ends_at > now,
                    started_at,
                    ends_at,
                });
            }
            _ => {
                // Status moved off the trial; the window no longer grants access.
                if let Some(trial) = account.trial.as_mut() {
                    trial.active = false;
                }
            }
        }

        account.subscription = Some(SubscriptionInfo {
            cancel_at_period_end: event.cancel_at_period_end,
            cancel_at: event.cancel_at,
        });

        self.store.save_account(&account).await?;
        tracing::info!(
            target: "agendfy::webhook",
            account_id = %event.account_id,
            status = ?account.subscription_status,
            "Synced subscription from billing event"
        );
        Ok(WebhookOutcome::Processed)
    }

    /// Apply a cancellation event. A cancellation already effective drops
    /// the account to the free tier; one scheduled for period end only
    /// records the schedule.
    async fn apply_cancellation(&self, event: &SubscriptionEvent) -> Result<WebhookOutcome> {
        let Some(mut account) = self.store.get_account(&event.account_id).await? else {
            tracing::warn!(
                target: "agendfy::webhook",
                account_id = %event.account_id,
                event_id = %event.id,
                "Cancellation event for unknown account"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let effective_now = event.cancel_at.map_or(true, |at| at <= event.created);

        if effective_now {
            account.subscription_status = Some(Tier::Free);
            if let Some(trial) = account.trial.as_mut() {
                trial.active = false;
            }
            account.subscription = Some(SubscriptionInfo {
                cancel_at_period_end: false,
                cancel_at: event.cancel_at,
            });
        } else {
            account.subscription = Some(SubscriptionInfo {
                cancel_at_period_end: true,
                cancel_at: event.cancel_at,
            });
        }

        self.store.save_account(&account).await?;
        tracing::info!(
            target: "agendfy::webhook",
            account_id = %event.account_id,
            effective_now,
            "Applied subscription cancellation"
        );
        Ok(WebhookOutcome::Processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountRole};
    use crate::storage::test::InMemoryStore;

    fn event(id: &str, event_type: &str, account_id: &str) -> SubscriptionEvent {
        SubscriptionEvent {
            id: id.to_string(),
            event_type: event_type.to_string(),
            account_id: account_id.to_string(),
            status: None,
            cancel_at_period_end: false,
            cancel_at: None,
            trial_end: None,
            created: 1_700_000_000,
        }
    }

    #[test]
    fn test_parse_event() {
        let payload = br#"{
            "id": "evt_1",
            "type": "subscription.updated",
            "account_id": "acct_1",
            "status": "premium",
            "created": 1700000000
        }"#;
        let event = parse_event(payload).unwrap();
        assert_eq!(event.event_type, "subscription.updated");
        assert_eq!(event.status.as_deref(), Some("premium"));
        assert!(!event.cancel_at_period_end);
    }

    #[test]
    fn test_parse_event_malformed() {
        assert!(parse_event(b"{ nope").is_err());
    }

    #[tokio::test]
    async fn test_apply_update_sets_status() {
        let store = InMemoryStore::new();
        store.put_account(Account::new("acct_1", AccountRole::Professional));
        let processor = WebhookProcessor::new(store.clone());

        let mut evt = event("evt_1", "subscription.updated", "acct_1");
        evt.status = Some("premium".to_string());

        let outcome = processor.apply(evt).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed);

        let account = store.get_account("acct_1").await.unwrap().unwrap();
        assert_eq!(account.subscription_status, Some(Tier::Premium));
    }

    #[tokio::test]
    async fn test_apply_update_unrecognized_status_clears() {
        let store = InMemoryStore::new();
        let mut account = Account::new("acct_1", AccountRole::Professional);
        account.subscription_status = Some(Tier::Premium);
        store.put_account(account);
        let processor = WebhookProcessor::new(store.clone());

        let mut evt = event("evt_1", "subscription.updated", "acct_1");
        evt.status = Some("platinum".to_string());

        processor.apply(evt).await.unwrap();
        let account = store.get_account("acct_1").await.unwrap().unwrap();
        assert_eq!(account.subscription_status, None);
    }

    #[tokio::test]
    async fn test_apply_trial_event_activates_window() {
        let store = InMemoryStore::new();
        store.put_account(Account::new("acct_1", AccountRole::Professional));
        let processor = WebhookProcessor::new(store.clone());

        let mut evt = event("evt_1", "subscription.created", "acct_1");
        evt.status = Some("premium_trial".to_string());
        evt.trial_end = Some(unix_now() + 86400 * 7);

        processor.apply(evt).await.unwrap();
        let account = store.get_account("acct_1").await.unwrap().unwrap();
        assert_eq!(account.subscription_status, Some(Tier::PremiumTrial));
        assert!(account.trial.unwrap().active);
        assert!(account.has_premium_access());
    }

    #[tokio::test]
    async fn test_replayed_event_is_not_reapplied() {
        let store = InMemoryStore::new();
        store.put_account(Account::new("acct_1", AccountRole::Professional));
        let processor = WebhookProcessor::new(store.clone());

        let mut evt = event("evt_1", "subscription.updated", "acct_1");
        evt.status = Some("premium".to_string());

        assert_eq!(
            processor.apply(evt.clone()).await.unwrap(),
            WebhookOutcome::Processed
        );
        assert_eq!(
            processor.apply(evt).await.unwrap(),
            WebhookOutcome::AlreadyProcessed
        );
    }

    #[tokio::test]
    async fn test_unknown_event_type_ignored() {
        let store = InMemoryStore::new();
        let processor = WebhookProcessor::new(store.clone());

        let evt = event("evt_1", "invoice.paid", "acct_1");
        assert_eq!(processor.apply(evt).await.unwrap(), WebhookOutcome::Ignored);
        // Ignored events are not marked processed.
        assert!(!store.is_event_processed("evt_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_account_ignored() {
        let store = InMemoryStore::new();
        let processor = WebhookProcessor::new(store);

        let mut evt = event("evt_1", "subscription.updated", "ghost");
        evt.status = Some("premium".to_string());
        assert_eq!(processor.apply(evt).await.unwrap(), WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_cancellation_effective_now_downgrades() {
        let store = InMemoryStore::new();
        let mut account = Account::new("acct_1", AccountRole::Professional);
        account.subscription_status = Some(Tier::Premium);
        store.put_account(account);
        let processor = WebhookProcessor::new(store.clone());

        let evt = event("evt_1", "subscription.cancelled", "acct_1");
        processor.apply(evt).await.unwrap();

        let account = store.get_account("acct_1").await.unwrap().unwrap();
        assert_eq!(account.subscription_status, Some(Tier::Free));
    }

    #[tokio::test]
    async fn test_cancellation_at_period_end_keeps_status() {
        let store = InMemoryStore::new();
        let mut account = Account::new("acct_1", AccountRole::Professional);
        account.subscription_status = Some(Tier::Premium);
        store.put_account(account);
        let processor = WebhookProcessor::new(store.clone());

        let mut evt = event("evt_1", "subscription.cancelled", "acct_1");
        evt.cancel_at = Some(evt.created + 86400 * 30);
        processor.apply(evt).await.unwrap();

        let account = store.get_account("acct_1").await.unwrap().unwrap();
        // Still premium until the cancellation takes effect.
        assert_eq!(account.subscription_status, Some(Tier::Premium));
        let sub = account.subscription.unwrap();
        assert!(sub.cancel_at_period_end);
        assert_eq!(sub.cancel_at, Some(1_700_000_000 + 86400 * 30));
    }
}
