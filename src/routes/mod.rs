//! HTTP route modules for the PUDO gateway.
//!
//! Each module defines the Axum routes for one concern:
//! - `locations`: pickup-location search
//! - `shipments`: shipment creation, tracking and service listing
//! - `webhooks`: the Shopify order-creation webhook

pub mod locations;
pub mod shipments;
pub mod webhooks;
