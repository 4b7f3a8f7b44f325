//! Pickup-location search routes.
//!
//! GET /apps/xbs-pudo?country&zip&city - Search PUDO locations for a country

use axum::extract::Query;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tracing::info;

use crate::error::ApiError;
use crate::models::{LocationQuery, LocationSearchResponse};
use crate::AppState;

/// Build the locations router.
pub fn router() -> Router {
    Router::new().route("/apps/xbs-pudo", get(search_locations))
}

/// Search pickup locations via the carrier's `GetLocations` command. Results
/// are filtered to the carriers this shop ships with in the given country;
/// both the raw and filtered counts are reported.
async fn search_locations(
    Extension(state): Extension<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<LocationSearchResponse>, ApiError> {
    let country = query
        .country
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            ApiError::Validation("Country query param is required, e.g. ?country=FR".to_string())
        })?;

    let search = state
        .xbs
        .search_locations(&country, query.zip.as_deref(), query.city.as_deref())
        .await?;

    info!(
        country = %search.country,
        total_found = search.total_found,
        filtered = search.locations.len(),
        "PUDO location search served"
    );

    Ok(Json(LocationSearchResponse {
        success: true,
        country: search.country,
        total_found: search.total_found,
        filtered: search.locations.len(),
        locations: search.locations,
    }))
}
