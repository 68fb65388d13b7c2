//! Plan tiers and the canonical limits table.
//!
//! There is exactly one source of truth for what each tier allows. Every
//! gating call site — the resolver, the raw limit checkers, the transition
//! detector — reads from this table, so the numbers cannot drift between
//! entry points.

use serde::{Deserialize, Serialize};

/// Free-tier cap on active services.
pub const FREE_MAX_SERVICES: u32 = 3;
/// Free-tier cap on registered clients.
pub const FREE_MAX_CLIENTS: u32 = 15;
/// Free-tier cap on appointments per calendar month.
pub const FREE_MAX_APPOINTMENTS_PER_MONTH: u32 = 30;

/// Billing tier an account can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Default tier with fixed resource caps and no paid features.
    Free,
    /// Trial of the premium tier. Only grants premium limits while the
    /// account's trial window is active; a lapsed trial degrades to free.
    PremiumTrial,
    /// Paid tier with unbounded limits and all features.
    Premium,
}

impl Tier {
    /// Parse a tier from its wire representation.
    ///
    /// Returns `None` for unrecognized values so callers must take the
    /// fail-to-free branch explicitly instead of relying on a map fallback.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "premium_trial" => Some(Self::PremiumTrial),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Wire representation of this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::PremiumTrial => "premium_trial",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A countable resource that plans cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Services,
    Clients,
    AppointmentsPerMonth,
}

impl Resource {
    /// Human-readable name, used when composing limit messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Clients => "clients",
            Self::AppointmentsPerMonth => "appointments per month",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A numeric cap on a countable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceLimit {
    /// At most this many.
    Limited(u32),
    /// No cap.
    Unlimited,
}

impl ResourceLimit {
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// The numeric cap, if one exists.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        match self {
            Self::Limited(max) => Some(*max),
            Self::Unlimited => None,
        }
    }
}

/// A feature that can be gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Financial reporting dashboard.
    Financial,
    /// Usage analytics.
    Analytics,
    /// Bulk actions over services and appointments.
    BulkActions,
}

impl Feature {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Analytics => "analytics",
            Self::BulkActions => "bulk_actions",
        }
    }
}

/// Feature flags resolved for a tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub financial: bool,
    pub analytics: bool,
    pub bulk_actions: bool,
}

impl FeatureSet {
    /// All features enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            financial: true,
            analytics: true,
            bulk_actions: true,
        }
    }

    /// No features enabled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Check whether a single feature is enabled.
    #[must_use]
    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Financial => self.financial,
            Feature::Analytics => self.analytics,
            Feature::BulkActions => self.bulk_actions,
        }
    }
}

/// Resolved limits and feature flags for an account at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub services: ResourceLimit,
    pub clients: ResourceLimit,
    pub appointments_per_month: ResourceLimit,
    pub features: FeatureSet,
}

impl PlanLimits {
    /// The free-tier limits. Also what a lapsed trial resolves to.
    #[must_use]
    pub fn free() -> Self {
        Self {
            services: ResourceLimit::Limited(FREE_MAX_SERVICES),
            clients: ResourceLimit::Limited(FREE_MAX_CLIENTS),
            appointments_per_month: ResourceLimit::Limited(FREE_MAX_APPOINTMENTS_PER_MONTH),
            features: FeatureSet::none(),
        }
    }

    /// The premium limits: everything unbounded, all features on.
    #[must_use]
    pub fn premium() -> Self {
        Self {
            services: ResourceLimit::Unlimited,
            clients: ResourceLimit::Unlimited,
            appointments_per_month: ResourceLimit::Unlimited,
            features: FeatureSet::all(),
        }
    }

    /// Check if a feature is enabled under these limits.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.enabled(feature)
    }

    /// The cap for a given resource.
    #[must_use]
    pub fn limit_for(&self, resource: Resource) -> ResourceLimit {
        match resource {
            Resource::Services => self.services,
            Resource::Clients => self.clients,
            Resource::AppointmentsPerMonth => self.appointments_per_month,
        }
    }
}

/// Look up the limits a tier grants.
///
/// `PremiumTrial` maps to the premium limits; whether a trial is actually
/// active is the resolver's concern, decided before this lookup.
#[must_use]
pub fn plan_limits(tier: Tier) -> PlanLimits {
    match tier {
        Tier::Free => PlanLimits::free(),
        Tier::PremiumTrial | Tier::Premium => PlanLimits::premium(),
    }
}
