//! Usage counting against plan limits.
//!
//! Pure comparisons between already-fetched counts and resolved limits.
//! The entitlement-aware helpers exist for call sites that hold raw
//! subscription fields rather than a resolved [`PlanLimits`]; both paths
//! read the same canonical plan table.

use crate::plans::{plan_limits, PlanLimits, Resource, ResourceLimit, Tier};

/// Result of checking a usage count against a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCheckResult {
    /// No cap on this resource.
    Unlimited,
    /// Usage is under the cap.
    WithinLimit { current: u32, max: u32 },
    /// Usage has reached or exceeded the cap.
    AtLimit { current: u32, max: u32 },
}

impl LimitCheckResult {
    /// Check if adding one more is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Unlimited | Self::WithinLimit { .. })
    }

    /// Check if at or over the cap.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        matches!(self, Self::AtLimit { .. })
    }
}

/// How many more of a resource an account may add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingCount {
    /// No cap; any number may be added.
    Unbounded,
    /// Exactly this many more. Never negative: usage already over the cap
    /// reports zero remaining.
    Count(u32),
}

impl RemainingCount {
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// The remaining count, if bounded.
    #[must_use]
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Unbounded => None,
        }
    }
}

/// True iff the limit is finite and `current` has reached it.
#[must_use]
pub fn has_reached_limit(current: u32, limit: ResourceLimit) -> bool {
    match limit {
        ResourceLimit::Unlimited => false,
        ResourceLimit::Limited(max) => current >= max,
    }
}

/// How many more may be added under `limit`.
#[must_use]
pub fn remaining_count(current: u32, limit: ResourceLimit) -> RemainingCount {
    match limit {
        ResourceLimit::Unlimited => RemainingCount::Unbounded,
        ResourceLimit::Limited(max) => RemainingCount::Count(max.saturating_sub(current)),
    }
}

/// Check a usage count against a limit.
#[must_use]
pub fn check_limit(current: u32, limit: ResourceLimit) -> LimitCheckResult {
    match limit {
        ResourceLimit::Unlimited => LimitCheckResult::Unlimited,
        ResourceLimit::Limited(max) if current < max => {
            LimitCheckResult::WithinLimit { current, max }
        }
        ResourceLimit::Limited(max) => LimitCheckResult::AtLimit { current, max },
    }
}

/// Whether raw subscription fields amount to full premium access: a paid
/// premium subscription, or a premium trial that is currently active.
#[must_use]
pub fn has_full_premium_access(status: Option<Tier>, trial_active: bool) -> bool {
    match status {
        Some(Tier::Premium) => true,
        Some(Tier::PremiumTrial) => trial_active,
        Some(Tier::Free) | None => false,
    }
}

/// Entitlement-aware gate for call sites holding raw subscription fields.
///
/// Full premium access always permits; otherwise the count is compared
/// against the canonical free-tier cap for the resource.
#[must_use]
pub fn can_add_more(
    current: u32,
    resource: Resource,
    status: Option<Tier>,
    trial_active: bool,
) -> bool {
    if has_full_premium_access(status, trial_active) {
        return true;
    }
    !has_reached_limit(current, PlanLimits::free().limit_for(resource))
}

/// Entitlement-aware remaining count, companion to [`can_add_more`].
#[must_use]
pub fn remaining_for(
    current: u32,
    resource: Resource,
    status: Option<Tier>,
    trial_active: bool,
) -> RemainingCount {
    let limits = if has_full_premium_access(status, trial_active) {
        plan_limits(Tier::Premium)
    } else {
        PlanLimits::free()
    };
    remaining_count(current, limits.limit_for(resource))
}
