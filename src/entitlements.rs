//! Entitlement resolution and feature gating.
//!
//! Resolution is a total, pure function of the account's subscription
//! fields: same input, same output. The dashboard recomputes it on every
//! render without caching, so nothing here touches I/O — the store-backed
//! [`EntitlementsManager`] only fetches the account and then delegates.

use crate::account::Account;
use crate::error::Result;
use crate::limits::{check_limit, LimitCheckResult};
use crate::plans::{plan_limits, Feature, PlanLimits, Resource, Tier};
use crate::storage::AccountStore;

/// Resolve the effective limits for an account.
///
/// The match is exhaustive on purpose: absent status, unrecognized status
/// (already `None` after parsing), and a lapsed trial all take an explicit
/// branch to the free tier rather than falling through a lookup default.
#[must_use]
pub fn resolve_entitlements(account: &Account) -> PlanLimits {
    match account.subscription_status {
        None => PlanLimits::free(),
        Some(Tier::Free) => plan_limits(Tier::Free),
        Some(Tier::Premium) => plan_limits(Tier::Premium),
        Some(Tier::PremiumTrial) => {
            // Trial lapsed or never recorded: silent downgrade to free.
            if account.trial.map_or(false, |t| t.active) {
                plan_limits(Tier::PremiumTrial)
            } else {
                PlanLimits::free()
            }
        }
    }
}

/// Feature gate over resolved limits.
#[must_use]
pub fn is_feature_enabled(limits: &PlanLimits, feature: Feature) -> bool {
    limits.has_feature(feature)
}

/// Store-backed entitlements lookups.
///
/// Convenience wrapper for callers that hold an account id rather than a
/// loaded record. A missing account resolves to free-tier limits — least
/// privilege, never an error.
pub struct EntitlementsManager<S: AccountStore> {
    store: S,
}

impl<S: AccountStore> EntitlementsManager<S> {
    /// Create a new entitlements manager.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve the effective limits for an account id.
    pub async fn entitlements_for(&self, account_id: &str) -> Result<PlanLimits> {
        let account = self.store.get_account(account_id).await?;
        Ok(account
            .as_ref()
            .map(resolve_entitlements)
            .unwrap_or_else(PlanLimits::free))
    }

    /// Check if a feature is enabled for an account.
    pub async fn has_feature(&self, account_id: &str, feature: Feature) -> Result<bool> {
        let limits = self.entitlements_for(account_id).await?;
        Ok(limits.has_feature(feature))
    }

    /// Check a usage count against the account's limit for a resource.
    pub async fn check_limit(
        &self,
        account_id: &str,
        resource: Resource,
        current: u32,
    ) -> Result<LimitCheckResult> {
        let limits = self.entitlements_for(account_id).await?;
        Ok(check_limit(current, limits.limit_for(resource)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountRole, TrialWindow};
    use crate::plans::ResourceLimit;
    use crate::storage::test::InMemoryStore;

    fn professional(id: &str) -> Account {
        Account::new(id, AccountRole::Professional)
    }

    fn trial(active: bool) -> TrialWindow {
        TrialWindow {
            active,
            started_at: 1_700_000_000,
            ends_at: 1_700_604_800,
        }
    }

    #[test]
    fn test_premium_resolves_unbounded_regardless_of_trial_fields() {
        let mut account = professional("acct_1");
        account.subscription_status = Some(Tier::Premium);

        for trial_state in [None, Some(trial(true)), Some(trial(false))] {
            account.trial = trial_state;
            let limits = resolve_entitlements(&account);
            assert_eq!(limits, PlanLimits::premium());
        }
    }

    #[test]
    fn test_active_trial_resolves_premium() {
        let mut account = professional("acct_1");
        account.subscription_status = Some(Tier::PremiumTrial);
        account.trial = Some(trial(true));
        assert_eq!(resolve_entitlements(&account), PlanLimits::premium());
    }

    #[test]
    fn test_lapsed_trial_resolves_exact_free_limits() {
        let mut account = professional("acct_1");
        account.subscription_status = Some(Tier::PremiumTrial);
        account.trial = Some(trial(false));

        let limits = resolve_entitlements(&account);
        assert_eq!(limits.services, ResourceLimit::Limited(3));
        assert_eq!(limits.clients, ResourceLimit::Limited(15));
        assert_eq!(limits.appointments_per_month, ResourceLimit::Limited(30));
        assert!(!limits.has_feature(Feature::Financial));
        assert!(!limits.has_feature(Feature::Analytics));
        assert!(!limits.has_feature(Feature::BulkActions));
    }

    #[test]
    fn test_trial_status_without_window_resolves_free() {
        let mut account = professional("acct_1");
        account.subscription_status = Some(Tier::PremiumTrial);
        account.trial = None;
        assert_eq!(resolve_entitlements(&account), PlanLimits::free());
    }

    #[test]
    fn test_absent_status_resolves_free() {
        let account = professional("acct_1");
        assert_eq!(resolve_entitlements(&account), PlanLimits::free());
    }

    #[test]
    fn test_resolution_is_referentially_transparent() {
        let mut account = professional("acct_1");
        account.subscription_status = Some(Tier::PremiumTrial);
        account.trial = Some(trial(true));

        let first = resolve_entitlements(&account);
        let second = resolve_entitlements(&account);
        assert_eq!(first, second);
    }

    #[test]
    fn test_feature_gate() {
        assert!(is_feature_enabled(
            &PlanLimits::premium(),
            Feature::Financial
        ));
        assert!(!is_feature_enabled(&PlanLimits::free(), Feature::Analytics));
    }

    #[tokio::test]
    async fn test_manager_resolves_from_store() {
        let store = InMemoryStore::new();
        let mut account = professional("acct_pro");
        account.subscription_status = Some(Tier::Premium);
        store.put_account(account);

        let manager = EntitlementsManager::new(store);
        let limits = manager.entitlements_for("acct_pro").await.unwrap();
        assert_eq!(limits, PlanLimits::premium());
        assert!(manager
            .has_feature("acct_pro", Feature::BulkActions)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_manager_missing_account_resolves_free() {
        let store = InMemoryStore::new();
        let manager = EntitlementsManager::new(store);

        let limits = manager.entitlements_for("nonexistent").await.unwrap();
        assert_eq!(limits, PlanLimits::free());
        assert!(!manager
            .has_feature("nonexistent", Feature::Financial)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_manager_check_limit() {
        let store = InMemoryStore::new();
        let mut account = professional("acct_free");
        account.subscription_status = Some(Tier::Free);
        store.put_account(account);

        let manager = EntitlementsManager::new(store);

        let result = manager
            .check_limit("acct_free", Resource::Clients, 14)
            .await
            .unwrap();
        assert_eq!(
            result,
            LimitCheckResult::WithinLimit {
                current: 14,
                max: 15
            }
        );

        let result = manager
            .check_limit("acct_free", Resource::Clients, 15)
            .await
            .unwrap();
        assert!(result.is_at_limit());
    }
}
