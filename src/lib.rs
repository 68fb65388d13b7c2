//! AgendFy entitlements — plan limits, trial transitions, and feature gating
//! for the AgendFy booking platform.
//!
//! This crate is the billing-entitlement core behind the dashboard: it
//! resolves what a professional account may do from its subscription status
//! and trial window, checks usage counts against plan limits, and surfaces
//! the one-time notice when a lapsed trial leaves an account over the
//! free-tier caps.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use agendfy_entitlements::{
//!     resolve_entitlements, is_feature_enabled, Feature,
//! };
//!
//! let limits = resolve_entitlements(&account);
//! if !is_feature_enabled(&limits, Feature::Financial) {
//!     return Err(ApiError::UpgradeRequired);
//! }
//! ```
//!
//! Resolution is pure and total: unrecognized or missing subscription state
//! resolves to the free tier, never an error. The only write this crate
//! performs is the `transition.notified` acknowledgement flag.

pub mod account;
pub mod config;
pub mod entitlements;
mod error;
pub mod limits;
pub mod plans;
pub mod storage;
pub mod transition;
pub mod webhook;

// Plan exports
pub use plans::{
    plan_limits, Feature, FeatureSet, PlanLimits, Resource, ResourceLimit, Tier,
    FREE_MAX_APPOINTMENTS_PER_MONTH, FREE_MAX_CLIENTS, FREE_MAX_SERVICES,
};

// Account exports
pub use account::{Account, AccountRole, SubscriptionInfo, TransitionRecord, TrialWindow};

// Entitlement exports
pub use entitlements::{is_feature_enabled, resolve_entitlements, EntitlementsManager};

// Limit-checking exports
pub use limits::{
    can_add_more, check_limit, has_full_premium_access, has_reached_limit, remaining_count,
    remaining_for, LimitCheckResult, RemainingCount,
};

// Transition exports
pub use transition::{should_check_transition, ExcessReport, TransitionDetector};

// Storage exports
pub use storage::{AccountStore, ResourceStore};

// Webhook exports
pub use webhook::{parse_event, SubscriptionEvent, WebhookOutcome, WebhookProcessor};

// Config exports
pub use config::{ConfigBuilder, EntitlementsConfig, DEFAULT_TRIAL_DAYS};

// Error exports
pub use error::{EntitlementError, Result};

// Test exports
#[cfg(any(test, feature = "test-store"))]
pub use storage::test::InMemoryStore;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults.
///
/// Call this early in your application, before constructing the stores.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g. "info", "agendfy=debug")
/// - `AGENDFY_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("AGENDFY_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
