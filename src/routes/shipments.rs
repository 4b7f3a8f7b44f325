//! Shipment routes.
//!
//! POST /apps/xbs-shipment                      - Create a shipment from a caller payload
//! POST /apps/complete-inpost-order             - Create a shipment from an order number + PUDO choice
//! GET  /apps/xbs-track/{trackingNumber}        - Track a shipment
//! GET  /apps/xbs-services                      - List the account's allowed services
//! GET  /apps/check-inpost-order/{orderId}      - Storefront poll: does the order need PUDO selection

use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::classifier;
use crate::error::ApiError;
use crate::models::{
    CheckOrderResponse, CompleteOrderInput, CompleteOrderResponse, CreateShipmentInput,
    ServicesResponse, ShipmentRequest, TrackResponse,
};
use crate::shipment::OrderShipmentBody;
use crate::AppState;

/// Build the shipments router.
pub fn router() -> Router {
    Router::new()
        .route("/apps/xbs-shipment", post(create_shipment))
        .route("/apps/complete-inpost-order", post(complete_order))
        .route("/apps/xbs-track/{tracking_number}", get(track_shipment))
        .route("/apps/xbs-services", get(list_services))
        .route("/apps/check-inpost-order/{order_id}", get(check_order))
}

/// Create a shipment directly from a caller-supplied payload. Required
/// fields are validated before any carrier call.
async fn create_shipment(
    Extension(state): Extension<AppState>,
    Json(input): Json<CreateShipmentInput>,
) -> Result<Json<Value>, ApiError> {
    let cfg = &state.config.shipping;
    let request = ShipmentRequest::from_input(input, cfg)?;
    let body = OrderShipmentBody::build(&request, cfg)?;
    let result = state.xbs.create_shipment(&body).await?;

    let mut response = serde_json::to_value(&result)
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    response["success"] = json!(true);
    Ok(Json(response))
}

/// Complete an order after the customer (or an operator) picked a PUDO
/// location: fetch the order, build the shipment and dispatch it.
///
/// The destination country is the explicit request value, else inferred from
/// the order's shipping-method titles, else FR.
async fn complete_order(
    Extension(state): Extension<AppState>,
    Json(input): Json<CompleteOrderInput>,
) -> Result<Json<CompleteOrderResponse>, ApiError> {
    let order_number = input
        .order_number
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Order number is required".to_string()))?;
    let pudo_location_id = input
        .pudo_location_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("PUDO location must be selected".to_string()))?;

    info!(
        order_number,
        pudo_location_id, "Completing InPost order with PUDO selection"
    );

    let fetched = state.shopify.fetch_order(&order_number).await?;

    let titles = fetched.order.shipping_titles();
    let country = input
        .country
        .filter(|c| !c.is_empty())
        .or_else(|| classifier::infer_country(&titles).map(str::to_string))
        .unwrap_or_else(|| "FR".to_string());

    let cfg = &state.config.shipping;
    let request =
        ShipmentRequest::from_order(&fetched.order, &pudo_location_id, &country, cfg)?;
    let body = OrderShipmentBody::build(&request, cfg)?;
    let result = state.xbs.create_shipment(&body).await?;

    info!(
        order_number,
        tracking_number = %result.tracking_number,
        country = %country,
        synthetic = fetched.synthetic,
        "PUDO shipment created for order"
    );

    Ok(Json(CompleteOrderResponse {
        success: true,
        tracking_number: result.tracking_number,
        carrier: result.carrier,
        country,
        pudo_location_id,
        synthetic: fetched.synthetic,
        message: "Order successfully sent to InPost/Spring with PUDO location".to_string(),
    }))
}

/// Track a shipment by its tracking number.
async fn track_shipment(
    Extension(state): Extension<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackResponse>, ApiError> {
    let info = state.xbs.track_shipment(&tracking_number).await?;
    Ok(Json(TrackResponse {
        success: true,
        tracking_number: info.tracking_number,
        carrier: info.carrier,
        events: info.events,
    }))
}

/// List the services the account is allowed to use.
async fn list_services(
    Extension(state): Extension<AppState>,
) -> Result<Json<ServicesResponse>, ApiError> {
    let services = state.xbs.list_services().await?;
    Ok(Json(ServicesResponse {
        success: true,
        allowed_services: services.allowed_services,
        allowed_spring_clear: services.allowed_spring_clear,
        all_services: services.all_services,
    }))
}

/// Storefront poll hook: whether an order still needs a PUDO selection.
async fn check_order(Path(order_id): Path<String>) -> Json<CheckOrderResponse> {
    Json(CheckOrderResponse {
        needs_pudo_selection: true,
        order_id,
    })
}
