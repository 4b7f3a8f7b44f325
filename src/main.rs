//! # XBS PUDO Gateway
//!
//! Integration service between a Shopify shop and the Spring XBS carrier
//! API for PUDO (pickup point) shipping:
//!
//! - search pickup locations per country (filtered to the carriers the shop
//!   actually ships with)
//! - create CLLCT shipments with the customer's chosen pickup point
//! - auto-create shipments from order-creation webhooks and write the
//!   tracking result back onto the order
//!
//! All state lives in the inbound request or in Shopify/Spring; this service
//! holds nothing between requests.

use tracing::info;

use xbs_pudo_gateway::config::AppConfig;
use xbs_pudo_gateway::create_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xbs_pudo_gateway=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let bind_addr = format!("0.0.0.0:{}", config.port);

    let app = create_app(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("XBS PUDO gateway listening on http://{}", bind_addr);
    info!("  GET  /health - Health check");
    info!("  GET  /apps/xbs-pudo?country=FR&zip=75001 - Search PUDO locations");
    info!("  POST /apps/xbs-shipment - Create shipment with PUDO");
    info!("  POST /apps/complete-inpost-order - Complete order with PUDO selection");
    info!("  GET  /apps/check-inpost-order/{{orderId}} - Check if order needs PUDO");
    info!("  GET  /apps/xbs-services - List allowed services");
    info!("  GET  /apps/xbs-track/{{trackingNumber}} - Track shipment");
    info!("  POST /api/webhooks/orders-create - Shopify order-creation webhook");

    axum::serve(listener, app).await?;
    Ok(())
}
