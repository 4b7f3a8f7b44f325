//! Runtime configuration for the PUDO gateway.
//!
//! All business constants (consignor identity, default HS code, minimum
//! weight, service/label codes) live here as data so tests can substitute
//! fixtures instead of patching inline literals.

use std::sync::Arc;

/// Top-level application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub xbs: XbsConfig,
    pub shopify: ShopifyConfig,
    pub shipping: ShippingConfig,
    pub port: u16,
}

/// Spring XBS carrier API access.
#[derive(Debug, Clone)]
pub struct XbsConfig {
    pub api_key: String,
    /// Production endpoint; overridden in tests to point at a stub server.
    pub base_url: String,
}

/// Shopify Admin API access. When credentials are absent, order lookup runs
/// in the synthetic-fallback mode and order annotation is skipped.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub access_token: Option<String>,
    /// Scheme + host prefix for Admin API calls. Derived from the shop
    /// domain at startup; tests inject a stub base URL instead.
    pub base_url: Option<String>,
}

/// Fixed business constants for shipment construction.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    pub consignor: ConsignorAddress,
    /// Generic cosmetics HS code applied when a line item carries none.
    pub default_hs_code: String,
    /// Carrier minimum chargeable weight in kg.
    pub min_weight_kg: f64,
    /// CLLCT is the Spring service code for PUDO delivery.
    pub service: String,
    pub label_format: String,
    /// Default parcel dimensions in cm (length, width, height).
    pub dimensions_cm: (u32, u32, u32),
    pub customs_duty: String,
    pub default_currency: String,
}

/// The shipping warehouse the parcels originate from.
#[derive(Debug, Clone)]
pub struct ConsignorAddress {
    pub name: String,
    pub company: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub vat: String,
    pub eori: String,
}

impl AppConfig {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            xbs: XbsConfig {
                api_key: std::env::var("XBS_APIKEY").unwrap_or_default(),
                base_url: std::env::var("XBS_API_URL")
                    .unwrap_or_else(|_| "https://mtapi.net/".to_string()),
            },
            shopify: ShopifyConfig {
                base_url: std::env::var("SHOPIFY_SHOP_DOMAIN")
                    .ok()
                    .map(|domain| format!("https://{}", domain)),
                access_token: std::env::var("SHOPIFY_ACCESS_TOKEN").ok(),
            },
            shipping: ShippingConfig::default(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        }
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl ShopifyConfig {
    /// True when both Admin API credentials are present.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.access_token.is_some()
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            consignor: ConsignorAddress::default(),
            default_hs_code: "3304990000".to_string(),
            min_weight_kg: 0.1,
            service: "CLLCT".to_string(),
            label_format: "ZPL200".to_string(),
            dimensions_cm: (16, 12, 20),
            customs_duty: "DDU".to_string(),
            default_currency: "EUR".to_string(),
        }
    }
}

impl Default for ConsignorAddress {
    fn default() -> Self {
        Self {
            name: "Spring GDS".to_string(),
            company: "Spring GDS".to_string(),
            address1: "Avenida Fuentemar 21".to_string(),
            city: String::new(),
            state: "MADRID".to_string(),
            zip: "28880".to_string(),
            country: "ES".to_string(),
            phone: "971756727".to_string(),
            email: "info@andypola.com".to_string(),
            vat: "ESB57818197".to_string(),
            eori: "ESB57818197".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopify_base_url_is_derived_from_shop_domain() {
        std::env::set_var("SHOPIFY_SHOP_DOMAIN", "demo.myshopify.com");
        std::env::set_var("SHOPIFY_ACCESS_TOKEN", "shpat_demo");

        let config = AppConfig::from_env();
        assert_eq!(
            config.shopify.base_url.as_deref(),
            Some("https://demo.myshopify.com")
        );
        assert!(config.shopify.is_configured());

        std::env::remove_var("SHOPIFY_SHOP_DOMAIN");
        std::env::remove_var("SHOPIFY_ACCESS_TOKEN");
    }

    #[test]
    fn shopify_config_is_unconfigured_without_credentials() {
        let config = ShopifyConfig {
            access_token: None,
            base_url: None,
        };
        assert!(!config.is_configured());
    }
}
