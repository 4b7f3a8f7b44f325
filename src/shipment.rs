//! Order-to-shipment normalization and request building.
//!
//! Everything here is pure: the order projection goes in, a validated
//! `OrderShipment` wire body comes out, and any missing required field is
//! rejected as a validation error before the gateway is ever called.

use chrono::Utc;

use crate::config::ShippingConfig;
use crate::error::ApiError;
use crate::models::{
    ConsigneeAddress, CreateShipmentInput, LineItem, Order, Product, RawShippingAddress,
    ShipmentRequest,
};
use serde::Serialize;

/// Total parcel weight in kg, floored to the carrier minimum.
pub fn total_weight_kg(line_items: &[LineItem], min_kg: f64) -> f64 {
    let total: f64 = line_items
        .iter()
        .map(|item| (item.grams * item.quantity) as f64 / 1000.0)
        .sum();
    total.max(min_kg)
}

/// Normalize a raw shipping address into a complete consignee address.
/// Never fails: a missing name becomes `"Customer"` and every other absent
/// field becomes an empty string. The country is the classifier-resolved
/// destination, not whatever the raw address carried.
pub fn normalize_address(
    raw: Option<&RawShippingAddress>,
    email: &str,
    country: &str,
) -> ConsigneeAddress {
    let raw = raw.cloned().unwrap_or_default();
    let name = format!(
        "{} {}",
        raw.first_name.as_deref().unwrap_or_default(),
        raw.last_name.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string();

    ConsigneeAddress {
        name: if name.is_empty() {
            "Customer".to_string()
        } else {
            name
        },
        company: raw.company.unwrap_or_default(),
        address1: raw.address1.unwrap_or_default(),
        address2: raw.address2.unwrap_or_default(),
        city: raw.city.unwrap_or_default(),
        state: raw.province.unwrap_or_default(),
        zip: raw.zip.unwrap_or_default(),
        country: country.to_string(),
        phone: raw.phone.unwrap_or_default(),
        email: email.to_string(),
    }
}

/// Parse the order's total price into the declared customs value. A price
/// that does not parse is a fatal validation error, not a silent zero.
pub fn parse_total_price(total_price: Option<&str>) -> Result<f64, ApiError> {
    let raw = total_price
        .ok_or_else(|| ApiError::Validation("Order has no total price".to_string()))?;
    raw.trim().parse::<f64>().map_err(|_| {
        ApiError::Validation(format!("Order total price is not a number: {:?}", raw))
    })
}

impl ShipmentRequest {
    /// Assemble a shipment request from an order and a chosen pickup point.
    /// The shipper reference is timestamped, so repeating this for the same
    /// order yields a new reference and a new carrier shipment.
    pub fn from_order(
        order: &Order,
        pudo_location_id: &str,
        country: &str,
        cfg: &ShippingConfig,
    ) -> Result<Self, ApiError> {
        let value = parse_total_price(order.total_price.as_deref())?;
        let email = order.email.as_deref().unwrap_or_default();

        let products = order
            .line_items
            .iter()
            .map(|item| Product {
                description: item.title.clone(),
                sku: item.sku.clone().unwrap_or_default(),
                hs_code: cfg.default_hs_code.clone(),
                quantity: item.quantity,
                value: item
                    .price
                    .as_deref()
                    .and_then(|p| p.trim().parse().ok())
                    .unwrap_or(0.0),
            })
            .collect();

        Ok(Self {
            shipper_reference: format!(
                "SHOP-{}-{}",
                order.display_number(),
                Utc::now().timestamp_millis()
            ),
            weight_kg: total_weight_kg(&order.line_items, cfg.min_weight_kg),
            value,
            currency: order
                .currency
                .clone()
                .unwrap_or_else(|| cfg.default_currency.clone()),
            pudo_location_id: pudo_location_id.to_string(),
            consignee: normalize_address(order.shipping_address.as_ref(), email, country),
            products,
        })
    }

    /// Assemble a shipment request from a caller-supplied payload
    /// (`POST /apps/xbs-shipment`). Missing required fields are rejected
    /// here, before any carrier call.
    pub fn from_input(input: CreateShipmentInput, cfg: &ShippingConfig) -> Result<Self, ApiError> {
        let consignee = input.consignee_address.ok_or_else(|| {
            ApiError::Validation(
                "Missing required fields: consigneeAddress, products, weight".to_string(),
            )
        })?;
        if input.products.is_empty() {
            return Err(ApiError::Validation(
                "Missing required fields: consigneeAddress, products, weight".to_string(),
            ));
        }
        let weight = input.weight.filter(|w| *w > 0.0).ok_or_else(|| {
            ApiError::Validation(
                "Missing required fields: consigneeAddress, products, weight".to_string(),
            )
        })?;
        let pudo_location_id = input
            .pudo_location_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ApiError::Validation("PudoLocationId is required for CLLCT service".to_string())
            })?;

        let products = input
            .products
            .into_iter()
            .map(|p| Product {
                description: p.description.unwrap_or_default(),
                sku: p.sku.unwrap_or_default(),
                hs_code: p.hs_code.unwrap_or_else(|| cfg.default_hs_code.clone()),
                quantity: p.quantity.unwrap_or(1),
                value: p.value.unwrap_or(0.0),
            })
            .collect();

        Ok(Self {
            shipper_reference: input
                .shipper_reference
                .unwrap_or_else(|| format!("SHOP-{}", Utc::now().timestamp_millis())),
            weight_kg: weight,
            value: input.value.unwrap_or(0.0),
            currency: input
                .currency
                .unwrap_or_else(|| cfg.default_currency.clone()),
            pudo_location_id,
            consignee: consignee.into(),
            products,
        })
    }
}

// ============================================================================
// Carrier wire body (OrderShipment command)
// ============================================================================

/// The `Shipment` object of the XBS `OrderShipment` command. Field names and
/// string-typed numbers follow the carrier schema exactly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderShipmentBody {
    pub label_format: String,
    pub shipper_reference: String,
    pub display_id: String,
    pub invoice_number: String,
    pub service: String,
    pub weight: String,
    pub weight_unit: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub dim_unit: String,
    pub value: String,
    pub shipping_value: String,
    pub currency: String,
    pub customs_duty: String,
    pub description: String,
    pub declaration_type: String,
    pub dangerous_goods: String,
    pub export_carrier_name: String,
    pub export_awb: String,
    pub pudo_location_id: String,
    pub consignor_address: WireConsignorAddress,
    pub consignee_address: WireConsigneeAddress,
    pub products: Vec<WireProduct>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireConsignorAddress {
    pub name: String,
    pub company: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub vat: String,
    pub eori: String,
    pub nl_vat: String,
    pub eu_eori: String,
    pub ioss: String,
    pub gb_eori: String,
    pub au_gst: String,
    pub art23: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireConsigneeAddress {
    pub name: String,
    pub company: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub vat: String,
    /// The carrier also expects the pickup point at address level; kept in
    /// lockstep with the shipment-level field by `OrderShipmentBody::build`.
    pub pudo_location_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireProduct {
    pub description: String,
    pub sku: String,
    pub hs_code: String,
    pub origin_country: String,
    pub purchase_url: String,
    pub quantity: String,
    pub value: String,
}

impl OrderShipmentBody {
    /// Build and validate the wire body. This is the single place that
    /// places `PudoLocationId` at both the shipment level and inside the
    /// consignee address; the two always agree.
    pub fn build(req: &ShipmentRequest, cfg: &ShippingConfig) -> Result<Self, ApiError> {
        if req.pudo_location_id.is_empty() {
            return Err(ApiError::Validation(
                "PudoLocationId is required for CLLCT service".to_string(),
            ));
        }
        if req.consignee.address1.is_empty() && req.consignee.city.is_empty() {
            return Err(ApiError::Validation(
                "Missing required fields: consigneeAddress, products, weight".to_string(),
            ));
        }
        if req.products.is_empty() || req.weight_kg <= 0.0 {
            return Err(ApiError::Validation(
                "Missing required fields: consigneeAddress, products, weight".to_string(),
            ));
        }

        let (length, width, height) = cfg.dimensions_cm;
        let consignor = &cfg.consignor;
        let description = req
            .products
            .iter()
            .map(|p| p.description.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            label_format: cfg.label_format.clone(),
            shipper_reference: req.shipper_reference.clone(),
            display_id: String::new(),
            invoice_number: String::new(),
            service: cfg.service.clone(),
            weight: req.weight_kg.to_string(),
            weight_unit: "kg".to_string(),
            length: length.to_string(),
            width: width.to_string(),
            height: height.to_string(),
            dim_unit: "cm".to_string(),
            value: req.value.to_string(),
            shipping_value: String::new(),
            currency: req.currency.clone(),
            customs_duty: cfg.customs_duty.clone(),
            description,
            declaration_type: String::new(),
            dangerous_goods: "N".to_string(),
            export_carrier_name: String::new(),
            export_awb: String::new(),
            pudo_location_id: req.pudo_location_id.clone(),
            consignor_address: WireConsignorAddress {
                name: consignor.name.clone(),
                company: consignor.company.clone(),
                address_line1: consignor.address1.clone(),
                address_line2: String::new(),
                address_line3: String::new(),
                city: consignor.city.clone(),
                state: consignor.state.clone(),
                zip: consignor.zip.clone(),
                country: consignor.country.clone(),
                phone: consignor.phone.clone(),
                email: consignor.email.clone(),
                vat: consignor.vat.clone(),
                eori: consignor.eori.clone(),
                nl_vat: String::new(),
                eu_eori: String::new(),
                ioss: String::new(),
                gb_eori: String::new(),
                au_gst: String::new(),
                art23: String::new(),
            },
            consignee_address: WireConsigneeAddress {
                name: req.consignee.name.clone(),
                company: req.consignee.company.clone(),
                address_line1: req.consignee.address1.clone(),
                address_line2: req.consignee.address2.clone(),
                address_line3: String::new(),
                city: req.consignee.city.clone(),
                state: req.consignee.state.clone(),
                zip: req.consignee.zip.clone(),
                country: req.consignee.country.clone(),
                phone: req.consignee.phone.clone(),
                email: req.consignee.email.clone(),
                vat: String::new(),
                pudo_location_id: req.pudo_location_id.clone(),
            },
            products: req
                .products
                .iter()
                .map(|p| WireProduct {
                    description: p.description.clone(),
                    sku: p.sku.clone(),
                    hs_code: p.hs_code.clone(),
                    origin_country: String::new(),
                    purchase_url: String::new(),
                    quantity: p.quantity.to_string(),
                    value: p.value.to_string(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddressInput;

    fn line_item(grams: i64, quantity: i64) -> LineItem {
        LineItem {
            title: "Item".to_string(),
            quantity,
            price: Some("10.00".to_string()),
            grams,
            sku: Some("SKU-1".to_string()),
        }
    }

    fn sample_request(cfg: &ShippingConfig) -> ShipmentRequest {
        ShipmentRequest {
            shipper_reference: "SHOP-1001-1".to_string(),
            weight_kg: 0.5,
            value: 50.0,
            currency: "EUR".to_string(),
            pudo_location_id: "H4045".to_string(),
            consignee: ConsigneeAddress {
                name: "Jean Dupont".to_string(),
                address1: "123 Rue de la Paix".to_string(),
                city: "Paris".to_string(),
                zip: "75001".to_string(),
                country: "FR".to_string(),
                ..Default::default()
            },
            products: vec![Product {
                description: "Test Product".to_string(),
                sku: "TEST-001".to_string(),
                hs_code: cfg.default_hs_code.clone(),
                quantity: 1,
                value: 45.0,
            }],
        }
    }

    #[test]
    fn weight_sums_grams_times_quantity() {
        let items = vec![line_item(500, 1), line_item(250, 2)];
        assert!((total_weight_kg(&items, 0.1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weight_is_floored_to_carrier_minimum() {
        assert!((total_weight_kg(&[], 0.1) - 0.1).abs() < 1e-9);
        assert!((total_weight_kg(&[line_item(10, 1)], 0.1) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn single_500g_item_weighs_half_a_kilo() {
        assert!((total_weight_kg(&[line_item(500, 1)], 0.1) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn missing_name_falls_back_to_customer() {
        let addr = normalize_address(None, "a@b.c", "FR");
        assert_eq!(addr.name, "Customer");
        assert_eq!(addr.company, "");
        assert_eq!(addr.country, "FR");
        assert_eq!(addr.email, "a@b.c");
    }

    #[test]
    fn partial_name_is_trimmed() {
        let raw = RawShippingAddress {
            first_name: Some("Jean".to_string()),
            ..Default::default()
        };
        let addr = normalize_address(Some(&raw), "", "FR");
        assert_eq!(addr.name, "Jean");
    }

    #[test]
    fn unparseable_total_price_is_fatal() {
        assert!(matches!(
            parse_total_price(Some("fifty euros")),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(parse_total_price(None), Err(ApiError::Validation(_))));
        assert_eq!(parse_total_price(Some("50.00")).unwrap(), 50.0);
    }

    #[test]
    fn build_rejects_missing_pudo_location() {
        let cfg = ShippingConfig::default();
        let mut req = sample_request(&cfg);
        req.pudo_location_id.clear();
        assert!(matches!(
            OrderShipmentBody::build(&req, &cfg),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn build_rejects_empty_products_and_zero_weight() {
        let cfg = ShippingConfig::default();
        let mut req = sample_request(&cfg);
        req.products.clear();
        assert!(matches!(
            OrderShipmentBody::build(&req, &cfg),
            Err(ApiError::Validation(_))
        ));

        let mut req = sample_request(&cfg);
        req.weight_kg = 0.0;
        assert!(matches!(
            OrderShipmentBody::build(&req, &cfg),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn pudo_location_id_appears_at_both_payload_levels() {
        let cfg = ShippingConfig::default();
        let body = OrderShipmentBody::build(&sample_request(&cfg), &cfg).unwrap();
        assert_eq!(body.pudo_location_id, "H4045");
        assert_eq!(body.consignee_address.pudo_location_id, "H4045");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["PudoLocationId"], "H4045");
        assert_eq!(json["ConsigneeAddress"]["PudoLocationId"], "H4045");
    }

    #[test]
    fn wire_body_carries_pudo_service_constants() {
        let cfg = ShippingConfig::default();
        let body = OrderShipmentBody::build(&sample_request(&cfg), &cfg).unwrap();
        assert_eq!(body.service, "CLLCT");
        assert_eq!(body.label_format, "ZPL200");
        assert_eq!(body.weight_unit, "kg");
        assert_eq!(body.customs_duty, "DDU");
        assert_eq!(body.dangerous_goods, "N");
        assert_eq!(body.description, "Test Product");
    }

    #[test]
    fn from_order_applies_defaults_and_weight_floor() {
        let cfg = ShippingConfig::default();
        let order = Order {
            name: Some("#1001".to_string()),
            email: Some("customer@example.com".to_string()),
            total_price: Some("50.00".to_string()),
            currency: Some("EUR".to_string()),
            line_items: vec![LineItem {
                title: "Serum".to_string(),
                quantity: 1,
                price: Some("45.00".to_string()),
                grams: 0,
                sku: None,
            }],
            ..Default::default()
        };
        let req = ShipmentRequest::from_order(&order, "H4045", "FR", &cfg).unwrap();
        assert!(req.shipper_reference.starts_with("SHOP-#1001-"));
        assert!((req.weight_kg - 0.1).abs() < 1e-9);
        assert_eq!(req.products[0].hs_code, "3304990000");
        assert_eq!(req.products[0].sku, "");
        assert_eq!(req.consignee.country, "FR");
    }

    #[test]
    fn from_input_requires_pudo_and_core_fields() {
        let cfg = ShippingConfig::default();
        let input = CreateShipmentInput {
            weight: Some(0.5),
            consignee_address: Some(AddressInput {
                name: Some("Jean".to_string()),
                address1: Some("123 Rue".to_string()),
                city: Some("Paris".to_string()),
                ..Default::default()
            }),
            products: vec![ProductInputFixture::one()],
            ..Default::default()
        };
        // No pudoLocationId: rejected with the CLLCT message.
        let err = ShipmentRequest::from_input(input, &cfg).unwrap_err();
        assert!(err.to_string().contains("PudoLocationId"));

        let err = ShipmentRequest::from_input(CreateShipmentInput::default(), &cfg).unwrap_err();
        assert!(err.to_string().contains("consigneeAddress"));
    }

    struct ProductInputFixture;

    impl ProductInputFixture {
        fn one() -> crate::models::ProductInput {
            crate::models::ProductInput {
                description: Some("Test Product".to_string()),
                quantity: Some(1),
                value: Some(45.0),
                ..Default::default()
            }
        }
    }
}
