//! Shopify webhook routes.
//!
//! POST /api/webhooks/orders-create - inbound order-creation event
//!
//! The webhook contract is at-least-once with a mandatory acknowledgement:
//! this handler ALWAYS answers 200, even on internal failure, so Shopify
//! does not redeliver forever. Failures are logged and reported in the ack
//! body instead. Note that a redelivery that does reach the shipment step
//! creates a second shipment: shipper references are timestamped per
//! invocation and no deduplication is performed.

use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::Value;
use tracing::{error, info};

use crate::classifier;
use crate::error::ApiError;
use crate::models::{Order, PickupPointData, ShipmentRequest, WebhookAck};
use crate::shipment::OrderShipmentBody;
use crate::AppState;

/// Build the webhooks router.
pub fn router() -> Router {
    Router::new().route("/api/webhooks/orders-create", post(orders_create))
}

/// Acknowledge an order-creation event, creating a shipment when the order
/// is a PUDO order with a recorded pickup-point choice.
async fn orders_create(
    Extension(state): Extension<AppState>,
    Json(payload): Json<Value>,
) -> Json<WebhookAck> {
    match process_order_created(&state, payload).await {
        Ok(ack) => Json(ack),
        Err(err) => {
            error!(error = %err, "Webhook processing failed");
            Json(WebhookAck {
                message: "OK - Error logged".to_string(),
                error: Some(err.to_string()),
            })
        }
    }
}

async fn process_order_created(state: &AppState, payload: Value) -> Result<WebhookAck, ApiError> {
    let order: Order = serde_json::from_value(payload)
        .map_err(|e| ApiError::Validation(format!("Malformed order payload: {}", e)))?;

    info!(
        order = %order.display_number(),
        order_id = order.id.unwrap_or_default(),
        "Received order-create webhook"
    );

    let titles = order.shipping_titles();
    if !classifier::requires_pudo(&titles) {
        info!(order = %order.display_number(), "Not an InPost order, skipping PUDO processing");
        return Ok(WebhookAck::ok("OK - Not InPost"));
    }

    // The storefront widget records the chosen point in note attributes.
    // Until it does, every redelivery lands here with no side effect.
    let Some(point) = PickupPointData::from_note_attributes(&order) else {
        info!(
            order = %order.display_number(),
            "No pickup point selected yet, order will need manual processing"
        );
        return Ok(WebhookAck::ok("OK - No PUDO yet"));
    };

    let country = if point.country.is_empty() {
        classifier::infer_country(&titles).unwrap_or("PL").to_string()
    } else {
        point.country.clone()
    };

    info!(
        order = %order.display_number(),
        point_code = %point.code,
        country = %country,
        "Creating automatic shipment from webhook"
    );

    let cfg = &state.config.shipping;
    let request = ShipmentRequest::from_order(&order, &point.code, &country, cfg)?;
    let body = OrderShipmentBody::build(&request, cfg)?;
    let result = state.xbs.create_shipment(&body).await?;

    // The shipment exists at this point; annotation failure is logged inside
    // the client and must not turn the ack into an error.
    if let Some(order_id) = order.id {
        state.shopify.annotate_tracking(order_id, &result, &point).await;
    }

    info!(
        order = %order.display_number(),
        tracking_number = %result.tracking_number,
        "Automatic shipment created from webhook"
    );

    Ok(WebhookAck::ok("OK - Shipment created"))
}
