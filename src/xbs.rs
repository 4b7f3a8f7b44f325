//! Spring XBS carrier API gateway.
//!
//! Every operation is one stateless POST of `{Apikey, Command, ...}` to the
//! XBS endpoint, with no retry. A non-2xx transport response is terminal for
//! that call, as is a non-zero `ErrorLevel` in the carrier's own envelope.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::XbsConfig;
use crate::error::ApiError;
use crate::models::{PickupLocation, ShipmentResult};
use crate::shipment::OrderShipmentBody;

#[derive(Debug, Clone)]
pub struct XbsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// Location search outcome, with the pre-filter count kept for observability.
#[derive(Debug)]
pub struct LocationSearch {
    pub country: String,
    pub total_found: usize,
    pub locations: Vec<PickupLocation>,
}

#[derive(Debug)]
pub struct TrackingInfo {
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub events: Vec<Value>,
}

#[derive(Debug)]
pub struct ServicesInfo {
    pub allowed_services: Value,
    pub allowed_spring_clear: Value,
    pub all_services: Value,
}

/// Per-country carrier allow-list for pickup points. Countries without a
/// configured carrier pass everything through.
pub fn carrier_allowed(country: &str, carrier: &str) -> bool {
    let carrier = carrier.to_lowercase();
    match country {
        "FR" => carrier.contains("colis prive"),
        "PL" => carrier.contains("inpost"),
        _ => true,
    }
}

impl XbsClient {
    pub fn new(cfg: &XbsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.clone(),
        }
    }

    /// POST one command to the XBS endpoint and return the parsed envelope.
    async fn command(&self, command: &str, payload: Value) -> Result<Value, ApiError> {
        let mut body = json!({
            "Apikey": self.api_key,
            "Command": command,
        });
        if let (Some(body_map), Some(extra)) = (body.as_object_mut(), payload.as_object()) {
            for (key, value) in extra {
                body_map.insert(key.clone(), value.clone());
            }
        }

        debug!(command, "Sending XBS command");
        let response = self.http.post(&self.base_url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Transport(format!(
                "XBS API responded with status {}: {}",
                status, text
            )));
        }

        let data: Value = response.json().await?;
        Ok(data)
    }

    /// `GetLocations`: pickup points for a country, optionally narrowed by
    /// zip. City is only forwarded for Italy, where the carrier requires it.
    pub async fn search_locations(
        &self,
        country: &str,
        zip: Option<&str>,
        city: Option<&str>,
    ) -> Result<LocationSearch, ApiError> {
        let country = country.to_uppercase();
        let mut location = json!({ "Country": country });
        if let Some(zip) = zip {
            location["Zip"] = json!(zip);
        }
        if let Some(city) = city {
            if country == "IT" {
                location["City"] = json!(city);
            }
        }

        let data = self
            .command("GetLocations", json!({ "Location": location }))
            .await?;
        check_error_level(&data)?;

        let points = data["Location"].as_array().cloned().unwrap_or_default();
        let total_found = points.len();

        let locations: Vec<PickupLocation> = points
            .iter()
            .map(parse_location)
            .filter(|loc| carrier_allowed(&country, &loc.carrier))
            .collect();

        info!(
            country = %country,
            total_found,
            filtered = locations.len(),
            "Location search complete"
        );

        Ok(LocationSearch {
            country,
            total_found,
            locations,
        })
    }

    /// `OrderShipment`: create a PUDO shipment and return its label/tracking.
    pub async fn create_shipment(
        &self,
        shipment: &OrderShipmentBody,
    ) -> Result<ShipmentResult, ApiError> {
        let data = self
            .command("OrderShipment", json!({ "Shipment": shipment }))
            .await?;

        // A tracking number means the shipment was created, even when the
        // carrier attached a warning in its Error field.
        if let Some(tracking) = data["Shipment"]["TrackingNumber"].as_str() {
            if !tracking.is_empty() {
                let result = ShipmentResult {
                    tracking_number: tracking.to_string(),
                    shipper_reference: data["Shipment"]["ShipperReference"]
                        .as_str()
                        .map(str::to_string),
                    carrier: data["Shipment"]["Carrier"].as_str().map(str::to_string),
                    label_image: data["Shipment"]["LabelImage"].as_str().map(str::to_string),
                    label_format: data["Shipment"]["LabelFormat"].as_str().map(str::to_string),
                    warning: data["Error"].as_str().filter(|w| !w.is_empty()).map(str::to_string),
                };
                info!(
                    tracking_number = %result.tracking_number,
                    carrier = result.carrier.as_deref().unwrap_or(""),
                    "PUDO shipment created"
                );
                return Ok(result);
            }
        }

        check_error_level(&data)?;
        Err(ApiError::Transport(
            "XBS response is missing Shipment.TrackingNumber".to_string(),
        ))
    }

    /// `TrackShipment`: tracking events plus the assigned carrier.
    pub async fn track_shipment(&self, tracking_number: &str) -> Result<TrackingInfo, ApiError> {
        let data = self
            .command(
                "TrackShipment",
                json!({ "Shipment": { "TrackingNumber": tracking_number } }),
            )
            .await?;
        check_error_level(&data)?;

        Ok(TrackingInfo {
            tracking_number: data["Shipment"]["TrackingNumber"]
                .as_str()
                .unwrap_or(tracking_number)
                .to_string(),
            carrier: data["Shipment"]["Carrier"].as_str().map(str::to_string),
            events: data["Shipment"]["Events"].as_array().cloned().unwrap_or_default(),
        })
    }

    /// `GetServices`: the account's allowed-services metadata, passed through.
    pub async fn list_services(&self) -> Result<ServicesInfo, ApiError> {
        let data = self.command("GetServices", json!({})).await?;
        check_error_level(&data)?;

        Ok(ServicesInfo {
            allowed_services: data["Services"]["AllowedServices"].clone(),
            allowed_spring_clear: data["Services"]["AllowedSpringClear"].clone(),
            all_services: data["Services"]["List"].clone(),
        })
    }
}

/// Non-zero `ErrorLevel` means the carrier rejected the command; the message
/// and level are preserved verbatim.
fn check_error_level(data: &Value) -> Result<(), ApiError> {
    let level = data["ErrorLevel"].as_i64().unwrap_or(0);
    if level != 0 {
        return Err(ApiError::Carrier {
            level,
            message: data["Error"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }
    Ok(())
}

fn parse_location(point: &Value) -> PickupLocation {
    PickupLocation {
        id: string_field(&point["Id"]),
        name: string_field(&point["Name"]),
        address1: string_field(&point["Address1"]),
        address2: string_field(&point["Address2"]),
        city: string_field(&point["City"]),
        zip: string_field(&point["Zip"]),
        country: string_field(&point["CountryCode"]),
        carrier: string_field(&point["Carrier"]),
        service: point["Service"].as_str().map(str::to_string),
        latitude: float_field(&point["Latitude"]),
        longitude: float_field(&point["Longitude"]),
        business_hours: string_field(&point["BusinessHours"]),
    }
}

// Ids and coordinates arrive as strings or numbers depending on the carrier.
fn string_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn float_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_filter_keeps_only_colis_prive() {
        assert!(carrier_allowed("FR", "Colis Prive"));
        assert!(carrier_allowed("FR", "COLIS PRIVE STORE"));
        assert!(!carrier_allowed("FR", "Mondial Relay"));
        assert!(!carrier_allowed("FR", "InPost"));
    }

    #[test]
    fn polish_filter_keeps_only_inpost() {
        assert!(carrier_allowed("PL", "InPost"));
        assert!(carrier_allowed("PL", "INPOST Paczkomaty"));
        assert!(!carrier_allowed("PL", "Colis Prive"));
    }

    #[test]
    fn unconfigured_countries_pass_through() {
        assert!(carrier_allowed("DE", "DHL"));
        assert!(carrier_allowed("IT", "Fermopoint"));
    }

    #[test]
    fn nonzero_error_level_is_a_carrier_error() {
        let data = json!({ "ErrorLevel": 10, "Error": "Invalid Apikey" });
        let err = check_error_level(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "XBS API Error (Level 10): Invalid Apikey"
        );
        assert!(check_error_level(&json!({ "ErrorLevel": 0 })).is_ok());
    }

    #[test]
    fn locations_parse_string_or_numeric_fields() {
        let point = json!({
            "Id": "H4045",
            "Name": "Locker 12",
            "Address1": "1 Rue Test",
            "City": "Paris",
            "Zip": "75001",
            "CountryCode": "FR",
            "Carrier": "Colis Prive",
            "Latitude": "48.85",
            "Longitude": 2.35,
        });
        let loc = parse_location(&point);
        assert_eq!(loc.id, "H4045");
        assert_eq!(loc.latitude, Some(48.85));
        assert_eq!(loc.longitude, Some(2.35));
        assert_eq!(loc.business_hours, "");
    }
}
