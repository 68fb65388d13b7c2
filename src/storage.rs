//! Storage contracts for account and resource data.
//!
//! The platform persists accounts, services, clients, and appointments in a
//! managed document store. This crate only depends on the narrow contracts
//! below; an in-memory implementation is provided for testing.

use async_trait::async_trait;

use crate::account::Account;
use crate::error::Result;

/// Read/write access to account records.
///
/// Failures from the underlying store propagate unchanged; this crate does
/// not retry.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Read one account record by id.
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    /// Save an account record. Used only by the webhook sync path.
    async fn save_account(&self, account: &Account) -> Result<()>;

    /// Idempotently set `transition.notified = true` on the account, with a
    /// server-assigned update timestamp. Calling this when the flag is
    /// already true is a no-op in effect. Two sessions racing here are
    /// last-write-wins; the flag is a display hint, not a billing-correctness
    /// primitive.
    async fn set_transition_notified(&self, account_id: &str) -> Result<()>;

    // Webhook idempotency

    /// Check if a billing event has already been processed.
    async fn is_event_processed(&self, event_id: &str) -> Result<bool>;

    /// Mark a billing event as processed.
    async fn mark_event_processed(&self, event_id: &str) -> Result<()>;
}

/// Read-only usage counts owned by the external persistence layer.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Count the account's active services.
    async fn count_active_services(&self, account_id: &str) -> Result<u32>;

    /// Count the account's registered clients.
    async fn count_clients(&self, account_id: &str) -> Result<u32>;

    /// Count the account's appointments in a calendar month.
    async fn count_appointments_in_month(
        &self,
        account_id: &str,
        year: i32,
        month: u32,
    ) -> Result<u32>;
}

/// Current unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// In-memory store for testing.
#[cfg(any(test, feature = "test-store"))]
pub mod test {
    use super::*;
    use crate::account::TransitionRecord;
    use crate::error::EntitlementError;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, RwLock};

    /// In-memory account and resource store for testing.
    ///
    /// Wraps data in `Arc` for cheap cloning.
    #[derive(Default, Clone)]
    pub struct InMemoryStore {
        inner: Arc<InMemoryStoreInner>,
    }

    #[derive(Default)]
    struct InMemoryStoreInner {
        accounts: RwLock<HashMap<String, Account>>,
        service_counts: RwLock<HashMap<String, u32>>,
        client_counts: RwLock<HashMap<String, u32>>,
        // Keyed by (account_id, year, month).
        appointment_counts: RwLock<HashMap<(String, i32, u32), u32>>,
        processed_events: RwLock<HashSet<String>>,
    }

    impl InMemoryStore {
        /// Create a new in-memory store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed an account.
        pub fn put_account(&self, account: Account) {
            self.inner
                .accounts
                .write()
                .unwrap()
                .insert(account.id.clone(), account);
        }

        /// Seed the active-service count for an account.
        pub fn set_service_count(&self, account_id: &str, count: u32) {
            self.inner
                .service_counts
                .write()
                .unwrap()
                .insert(account_id.to_string(), count);
        }

        /// Seed the client count for an account.
        pub fn set_client_count(&self, account_id: &str, count: u32) {
            self.inner
                .client_counts
                .write()
                .unwrap()
                .insert(account_id.to_string(), count);
        }

        /// Seed the appointment count for a month.
        pub fn set_appointment_count(&self, account_id: &str, year: i32, month: u32, count: u32) {
            self.inner
                .appointment_counts
                .write()
                .unwrap()
                .insert((account_id.to_string(), year, month), count);
        }
    }

    #[async_trait]
    impl AccountStore for InMemoryStore {
        async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
            Ok(self.inner.accounts.read().unwrap().get(account_id).cloned())
        }

        async fn save_account(&self, account: &Account) -> Result<()> {
            self.inner
                .accounts
                .write()
                .unwrap()
                .insert(account.id.clone(), account.clone());
            Ok(())
        }

        async fn set_transition_notified(&self, account_id: &str) -> Result<()> {
            let mut accounts = self.inner.accounts.write().unwrap();
            let account = accounts
                .get_mut(account_id)
                .ok_or_else(|| EntitlementError::account_not_found(account_id))?;

            let transition = account.transition.get_or_insert_with(TransitionRecord::default);
            transition.notified = true;
            transition.last_check = unix_now();
            Ok(())
        }

        async fn is_event_processed(&self, event_id: &str) -> Result<bool> {
            Ok(self
                .inner
                .processed_events
                .read()
                .unwrap()
                .contains(event_id))
        }

        async fn mark_event_processed(&self, event_id: &str) -> Result<()> {
            self.inner
                .processed_events
                .write()
                .unwrap()
                .insert(event_id.to_string());
            Ok(())
        }
    }

    #[async_trait]
    impl ResourceStore for InMemoryStore {
        async fn count_active_services(&self, account_id: &str) -> Result<u32> {
            Ok(self
                .inner
                .service_counts
                .read()
                .unwrap()
                .get(account_id)
                .copied()
                .unwrap_or(0))
        }

        async fn count_clients(&self, account_id: &str) -> Result<u32> {
            Ok(self
                .inner
                .client_counts
                .read()
                .unwrap()
                .get(account_id)
                .copied()
                .unwrap_or(0))
        }

        async fn count_appointments_in_month(
            &self,
            account_id: &str,
            year: i32,
            month: u32,
        ) -> Result<u32> {
            Ok(self
                .inner
                .appointment_counts
                .read()
                .unwrap()
                .get(&(account_id.to_string(), year, month))
                .copied()
                .unwrap_or(0))
        }
    }
}
