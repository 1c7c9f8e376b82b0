//! Payment configuration (Stripe)

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::subscription::CheckoutUrls;
use crate::domain::subscription::{BillingInterval, PlanCatalog, PlanId, PRO_MONTHLY_PRICE_ID};

/// Stripe credentials, the price ids that sell each plan, and the
/// redirect targets of the hosted checkout page.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Without a key checkout runs against the in-process mock provider.
    pub stripe_api_key: Option<String>,

    pub stripe_webhook_secret: Option<String>,

    /// Reject test-mode webhook events.
    #[serde(default)]
    pub require_livemode: bool,

    #[serde(default = "default_pro_monthly_price")]
    pub pro_monthly_price_id: String,

    pub pro_yearly_price_id: Option<String>,

    pub premium_monthly_price_id: Option<String>,

    pub premium_yearly_price_id: Option<String>,

    /// May contain `{CHECKOUT_SESSION_ID}`.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
}

impl PaymentConfig {
    fn non_blank(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn stripe_api_key(&self) -> Option<&str> {
        Self::non_blank(&self.stripe_api_key)
    }

    pub fn stripe_webhook_secret(&self) -> Option<&str> {
        Self::non_blank(&self.stripe_webhook_secret)
    }

    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key()
            .is_some_and(|k| k.starts_with("sk_test_"))
    }

    /// The standard catalog with the configured price ids bound.
    pub fn plan_catalog(&self) -> Result<PlanCatalog, ValidationError> {
        let bindings = [
            (PlanId::Pro, BillingInterval::Monthly, Some(self.pro_monthly_price_id.as_str())),
            (PlanId::Pro, BillingInterval::Yearly, Self::non_blank(&self.pro_yearly_price_id)),
            (
                PlanId::Premium,
                BillingInterval::Monthly,
                Self::non_blank(&self.premium_monthly_price_id),
            ),
            (
                PlanId::Premium,
                BillingInterval::Yearly,
                Self::non_blank(&self.premium_yearly_price_id),
            ),
        ];

        bindings
            .into_iter()
            .filter_map(|(plan, interval, price)| price.map(|p| (plan, interval, p)))
            .try_fold(PlanCatalog::standard(), |catalog, (plan, interval, price)| {
                catalog
                    .with_price(plan, interval, price)
                    .map_err(|e| ValidationError::InvalidPriceCatalog(e.to_string()))
            })
    }

    pub fn checkout_urls(&self) -> CheckoutUrls {
        CheckoutUrls {
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = self.stripe_api_key() {
            if !key.starts_with("sk_") && !key.starts_with("rk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
            match self.stripe_webhook_secret() {
                None => return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET")),
                Some(secret) if !secret.starts_with("whsec_") => {
                    return Err(ValidationError::InvalidStripeWebhookSecret)
                }
                Some(_) => {}
            }
        }
        if !is_http_url(&self.success_url) {
            return Err(ValidationError::InvalidUrl("success_url"));
        }
        if !is_http_url(&self.cancel_url) {
            return Err(ValidationError::InvalidUrl("cancel_url"));
        }
        self.plan_catalog()?;
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: None,
            stripe_webhook_secret: None,
            require_livemode: false,
            pro_monthly_price_id: default_pro_monthly_price(),
            pro_yearly_price_id: None,
            premium_monthly_price_id: None,
            premium_yearly_price_id: None,
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
        }
    }
}

fn default_pro_monthly_price() -> String {
    PRO_MONTHLY_PRICE_ID.to_string()
}

fn default_success_url() -> String {
    "http://localhost:5173/checkout/success?session_id={CHECKOUT_SESSION_ID}".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:5173/pricing".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_mock_checkout() {
        let config = PaymentConfig::default();
        assert!(config.stripe_api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_catalog_sells_pro_monthly() {
        let catalog = PaymentConfig::default().plan_catalog().unwrap();
        let plan = catalog.resolve_price(PRO_MONTHLY_PRICE_ID).unwrap();
        assert_eq!(plan.id, PlanId::Pro);
    }

    #[test]
    fn test_configured_prices_are_bound() {
        let config = PaymentConfig {
            premium_monthly_price_id: Some("price_premium_m".to_string()),
            pro_yearly_price_id: Some("  ".to_string()),
            ..Default::default()
        };
        let catalog = config.plan_catalog().unwrap();
        assert_eq!(catalog.resolve_price("price_premium_m").unwrap().id, PlanId::Premium);
        assert!(catalog.plan(PlanId::Pro).yearly_price_id.is_none());
    }

    #[test]
    fn test_duplicate_price_is_rejected() {
        let config = PaymentConfig {
            premium_monthly_price_id: Some(PRO_MONTHLY_PRICE_ID.to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPriceCatalog(_))
        ));
    }

    #[test]
    fn test_api_key_requires_webhook_secret() {
        let config = PaymentConfig {
            stripe_api_key: Some("sk_test_abc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"))
        );
        assert!(config.is_test_mode());
    }

    #[test]
    fn test_key_prefixes_are_checked() {
        let config = PaymentConfig {
            stripe_api_key: Some("pk_test_abc".to_string()),
            stripe_webhook_secret: Some("whsec_abc".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStripeKey));

        let config = PaymentConfig {
            stripe_api_key: Some("sk_live_abc".to_string()),
            stripe_webhook_secret: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStripeWebhookSecret));
    }

    #[test]
    fn test_redirect_urls_must_be_http() {
        let config = PaymentConfig {
            cancel_url: "preskriptor://pricing".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("cancel_url")));
    }
}
