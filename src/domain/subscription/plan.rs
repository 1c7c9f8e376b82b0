//! Plan catalog.
//!
//! Static description of the three subscription plans, their credit
//! allowances and the billing-provider price ids that sell them. The catalog
//! doubles as the price-to-plan table used when a checkout is reconciled.
//!
//! | Plan | Credits | Unlocks |
//! |------|---------|---------|
//! | Freemium | 5 | Free modules |
//! | PRO | 100 | Free + PRO modules |
//! | Premium | 200 | every module |

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};

use super::ModuleTier;
use crate::domain::foundation::ValidationError;

/// Price id of the monthly PRO plan in the live billing account.
pub const PRO_MONTHLY_PRICE_ID: &str = "price_1Rp7JzRvPDGCZGnjYfwxrJf9";

/// Credits granted to every new user.
pub const FREEMIUM_CREDITS: u32 = 5;

/// Identifies a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Freemium,
    Pro,
    Premium,
}

impl PlanId {
    /// Every plan, cheapest first.
    pub const ALL: [PlanId; 3] = [PlanId::Freemium, PlanId::Pro, PlanId::Premium];

    /// Parses a stored plan value; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "freemium" | "free" => Some(PlanId::Freemium),
            "pro" => Some(PlanId::Pro),
            "premium" => Some(PlanId::Premium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Freemium => "freemium",
            PlanId::Pro => "pro",
            PlanId::Premium => "premium",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanId::Freemium => "Freemium",
            PlanId::Pro => "PRO",
            PlanId::Premium => "Premium",
        }
    }

    /// Highest module tier this plan unlocks.
    pub fn access_tier(&self) -> ModuleTier {
        match self {
            PlanId::Freemium => ModuleTier::Free,
            PlanId::Pro => ModuleTier::Pro,
            PlanId::Premium => ModuleTier::Premium,
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanId::Freemium)
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deserializes a stored plan field, mapping unknown strings and nulls to `None`.
///
/// A document with a garbled plan must fall back to the lowest tier instead
/// of failing the whole read.
pub(crate) fn deserialize_lenient_plan<'de, D>(deserializer: D) -> Result<Option<PlanId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.as_str().and_then(PlanId::parse)))
}

/// Billing cadence offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

/// A subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub credits_limit: u32,
    pub monthly_price_id: Option<String>,
    pub yearly_price_id: Option<String>,
}

impl Plan {
    pub fn access_tier(&self) -> ModuleTier {
        self.id.access_tier()
    }

    pub fn price_id(&self, interval: BillingInterval) -> Option<&str> {
        match interval {
            BillingInterval::Monthly => self.monthly_price_id.as_deref(),
            BillingInterval::Yearly => self.yearly_price_id.as_deref(),
        }
    }

    fn sells(&self, price_id: &str) -> bool {
        self.monthly_price_id.as_deref() == Some(price_id)
            || self.yearly_price_id.as_deref() == Some(price_id)
    }
}

static STANDARD_PLANS: Lazy<Vec<Plan>> = Lazy::new(|| {
    vec![
        Plan {
            id: PlanId::Freemium,
            credits_limit: FREEMIUM_CREDITS,
            monthly_price_id: None,
            yearly_price_id: None,
        },
        Plan {
            id: PlanId::Pro,
            credits_limit: 100,
            monthly_price_id: Some(PRO_MONTHLY_PRICE_ID.to_string()),
            yearly_price_id: None,
        },
        Plan {
            id: PlanId::Premium,
            credits_limit: 200,
            monthly_price_id: None,
            yearly_price_id: None,
        },
    ]
});

/// The full set of plans plus the price-to-plan lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// Standard catalog with the built-in PRO monthly price.
    pub fn standard() -> Self {
        Self {
            plans: STANDARD_PLANS.clone(),
        }
    }

    /// Binds a billing-provider price id to a plan and interval.
    ///
    /// # Errors
    ///
    /// Fails for Freemium (it is never sold) and when the price id already
    /// sells a different plan, which would make reconciliation ambiguous.
    pub fn with_price(
        mut self,
        plan: PlanId,
        interval: BillingInterval,
        price_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let price_id = price_id.into();
        if price_id.trim().is_empty() {
            return Err(ValidationError::empty_field("price_id"));
        }
        if !plan.is_paid() {
            return Err(ValidationError::invalid_format(
                "price_id",
                "the freemium plan cannot carry a price",
            ));
        }
        if let Some(owner) = self.plans.iter().find(|p| p.id != plan && p.sells(&price_id)) {
            return Err(ValidationError::invalid_format(
                "price_id",
                format!("'{}' already sells the {} plan", price_id, owner.id),
            ));
        }

        let entry = self.plan_mut(plan);
        match interval {
            BillingInterval::Monthly => entry.monthly_price_id = Some(price_id),
            BillingInterval::Yearly => entry.yearly_price_id = Some(price_id),
        }
        Ok(self)
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan(&self, id: PlanId) -> &Plan {
        // The catalog is constructed with exactly one entry per PlanId.
        self.plans
            .iter()
            .find(|p| p.id == id)
            .unwrap_or(&self.plans[0])
    }

    fn plan_mut(&mut self, id: PlanId) -> &mut Plan {
        let idx = self.plans.iter().position(|p| p.id == id).unwrap_or(0);
        &mut self.plans[idx]
    }

    /// Maps a purchased price id back to its plan.
    pub fn resolve_price(&self, price_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.sells(price_id))
    }

    /// Cheapest plan that unlocks modules of `tier`.
    pub fn cheapest_plan_for(&self, tier: ModuleTier) -> &Plan {
        let id = PlanId::ALL
            .into_iter()
            .find(|p| p.access_tier().covers(tier))
            .unwrap_or(PlanId::Premium);
        self.plan(id)
    }

    /// Next plan above `current`, if any.
    pub fn next_plan_above(&self, current: PlanId) -> Option<&Plan> {
        PlanId::ALL
            .into_iter()
            .find(|p| p.access_tier() > current.access_tier())
            .map(|id| self.plan(id))
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
