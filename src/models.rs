//! Domain models for the PUDO gateway.
//!
//! The order-side structs are read projections of the Shopify order payload
//! (webhook body or Admin API response); this service never owns an order.
//! The shipment-side structs are built fresh per invocation and discarded
//! once the carrier call returns.

use serde::{Deserialize, Serialize};

// ============================================================================
// Order projection (deserialized from Shopify)
// ============================================================================

/// The slice of a Shopify order this service reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Order {
    pub id: Option<i64>,
    /// Display number, e.g. `#1001`.
    pub name: Option<String>,
    pub email: Option<String>,
    pub total_price: Option<String>,
    pub currency: Option<String>,
    pub shipping_address: Option<RawShippingAddress>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
}

impl Order {
    /// Titles of all shipping lines, in order.
    pub fn shipping_titles(&self) -> Vec<&str> {
        self.shipping_lines
            .iter()
            .map(|line| line.title.as_str())
            .collect()
    }

    /// Look up a note attribute by name. Note attributes are the side
    /// channel the storefront uses to record the chosen pickup point.
    pub fn note_attribute(&self, name: &str) -> Option<&str> {
        self.note_attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Human-readable order number for logs and shipper references.
    pub fn display_number(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Shipping address as delivered by Shopify; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShippingAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub title: String,
    pub price: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quantity: i64,
    pub price: Option<String>,
    #[serde(default)]
    pub grams: i64,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Pickup point data carried in order note attributes by the storefront
/// widget (`point_code`, `point_name`, ...).
#[derive(Debug, Clone, Default)]
pub struct PickupPointData {
    pub code: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl PickupPointData {
    pub fn from_note_attributes(order: &Order) -> Option<Self> {
        let code = order.note_attribute("point_code")?;
        let attr = |name: &str| order.note_attribute(name).unwrap_or_default().to_string();
        Some(Self {
            code: code.to_string(),
            name: attr("point_name"),
            address: attr("point_address"),
            city: attr("point_city"),
            postal_code: attr("point_postal_code"),
            country: attr("point_country"),
        })
    }
}

// ============================================================================
// Shipment aggregates (built per invocation)
// ============================================================================

/// Fully normalized consignee address; every field is present, empty-string
/// defaulted where the order had no value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsigneeAddress {
    pub name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

/// A customs product descriptor, one per order line item.
#[derive(Debug, Clone)]
pub struct Product {
    pub description: String,
    pub sku: String,
    pub hs_code: String,
    pub quantity: i64,
    pub value: f64,
}

/// Single-use shipment aggregate handed to the carrier gateway.
#[derive(Debug, Clone)]
pub struct ShipmentRequest {
    /// Unique per invocation: order number + timestamp. Two builds for the
    /// same order produce two distinct carrier shipments.
    pub shipper_reference: String,
    pub weight_kg: f64,
    pub value: f64,
    pub currency: String,
    pub pudo_location_id: String,
    pub consignee: ConsigneeAddress,
    pub products: Vec<Product>,
}

/// Outcome of a successful carrier shipment creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResult {
    pub tracking_number: String,
    pub shipper_reference: Option<String>,
    pub carrier: Option<String>,
    pub label_image: Option<String>,
    pub label_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A pickup location returned by the carrier's location search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupLocation {
    pub id: String,
    pub name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub carrier: String,
    pub service: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub business_hours: String,
}

// ============================================================================
// Request models (deserialized from HTTP input)
// ============================================================================

/// Body of `POST /apps/xbs-shipment`. Nested address/product keys use the
/// carrier's PascalCase convention, matching what the storefront sends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentInput {
    pub shipper_reference: Option<String>,
    pub weight: Option<f64>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub pudo_location_id: Option<String>,
    pub consignee_address: Option<AddressInput>,
    #[serde(default)]
    pub products: Vec<ProductInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressInput {
    pub name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country_code: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
}

impl From<AddressInput> for ConsigneeAddress {
    fn from(input: AddressInput) -> Self {
        Self {
            name: input.name.unwrap_or_default(),
            company: input.company.unwrap_or_default(),
            address1: input.address1.unwrap_or_default(),
            address2: input.address2.unwrap_or_default(),
            city: input.city.unwrap_or_default(),
            state: input.state.unwrap_or_default(),
            zip: input.zip.unwrap_or_default(),
            country: input.country_code.unwrap_or_default(),
            phone: input.mobile.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductInput {
    pub description: Option<String>,
    pub sku: Option<String>,
    pub hs_code: Option<String>,
    pub quantity: Option<i64>,
    pub value: Option<f64>,
}

/// Body of `POST /apps/complete-inpost-order`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOrderInput {
    pub order_id: Option<serde_json::Value>,
    pub order_number: Option<String>,
    pub pudo_location_id: Option<String>,
    pub country: Option<String>,
}

/// Query parameters of `GET /apps/xbs-pudo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    pub country: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
}

// ============================================================================
// Response models
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchResponse {
    pub success: bool,
    pub country: String,
    pub total_found: usize,
    pub filtered: usize,
    pub locations: Vec<PickupLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOrderResponse {
    pub success: bool,
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub country: String,
    pub pudo_location_id: String,
    /// True when the upstream order lookup failed and the documented
    /// placeholder order was used instead of real order data.
    pub synthetic: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub success: bool,
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesResponse {
    pub success: bool,
    pub allowed_services: serde_json::Value,
    pub allowed_spring_clear: serde_json::Value,
    pub all_services: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOrderResponse {
    pub needs_pudo_selection: bool,
    pub order_id: String,
}

/// Webhook acknowledgement. Always delivered with status 200; `error` is
/// populated when an internal failure was logged instead of surfaced.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    pub fn ok(message: &str) -> Self {
        Self {
            message: message.to_string(),
            error: None,
        }
    }
}
