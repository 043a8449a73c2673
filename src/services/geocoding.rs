//! Address geocoding providers

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::{GeocodingConfig, GeocodingProvider},
    error::{AppError, AppResult},
    geo::Coordinate,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub formatted_address: String,
}

/// Resolves a one-line postal address to a position
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> AppResult<GeocodeResult>;
}

/// Pick the provider named in the configuration
pub fn build_geocoder(config: &GeocodingConfig) -> AppResult<Arc<dyn Geocoder>> {
    match config.provider {
        GeocodingProvider::Google => Ok(Arc::new(GoogleGeocoder::new(config)?)),
        GeocodingProvider::Fixed => Ok(Arc::new(FixedGeocoder::new(config.default_coordinate()))),
    }
}

/// Google Maps Geocoding API client
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    region: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: String,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            region: config.region.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<GeocodeResult> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Geocoding("Geocoding API key is not configured".to_string()))?;

        tracing::debug!("Geocoding address: {}", address);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("address", address),
                ("key", key),
                ("region", self.region.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Geocoding(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Geocoding(format!(
                "Geocoding service answered HTTP {}",
                response.status()
            )));
        }

        let body: GoogleResponse = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("Invalid geocoding response: {}", e)))?;

        parse_google_response(body)
    }
}

/// Address-level failures come back as `Validation`, provider failures as `Geocoding`
fn parse_google_response(body: GoogleResponse) -> AppResult<GeocodeResult> {
    if body.status != "OK" {
        if let Some(detail) = &body.error_message {
            tracing::warn!("Geocoding status {}: {}", body.status, detail);
        }
        let message = status_message(&body.status).to_string();
        return Err(match body.status.as_str() {
            "ZERO_RESULTS" | "INVALID_REQUEST" => AppError::Validation(message),
            _ => AppError::Geocoding(message),
        });
    }

    let first = body
        .results
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation("Address not found".to_string()))?;

    let coordinate = Coordinate::new(first.geometry.location.lat, first.geometry.location.lng);
    if coordinate.is_null_island() || !coordinate.is_valid() {
        return Err(AppError::Validation("Geocoding returned invalid coordinates".to_string()));
    }

    Ok(GeocodeResult {
        coordinate,
        formatted_address: first.formatted_address,
    })
}

fn status_message(status: &str) -> &'static str {
    match status {
        "ZERO_RESULTS" => "Address not found",
        "INVALID_REQUEST" => "Invalid geocoding request",
        "REQUEST_DENIED" => "Geocoding request denied, check the API key",
        "OVER_QUERY_LIMIT" => "Geocoding quota exceeded",
        "UNKNOWN_ERROR" => "Geocoding service error, try again",
        _ => "Geocoding failed",
    }
}

/// Answers the same position for every address
pub struct FixedGeocoder {
    coordinate: Coordinate,
}

impl FixedGeocoder {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<GeocodeResult> {
        Ok(GeocodeResult {
            coordinate: self.coordinate,
            formatted_address: address.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::SAO_PAULO_CENTER;

    fn parse(json: &str) -> AppResult<GeocodeResult> {
        parse_google_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_parse_ok_response() {
        let result = parse(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "Av. Paulista, 1578 - Bela Vista, São Paulo - SP, 01310-200, Brasil",
                    "geometry": {"location": {"lat": -23.5614, "lng": -46.6560}}
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(result.coordinate, Coordinate::new(-23.5614, -46.6560));
        assert!(result.formatted_address.starts_with("Av. Paulista"));
    }

    #[test]
    fn test_parse_error_statuses() {
        for (status, message) in [
            ("REQUEST_DENIED", "Geocoding request denied, check the API key"),
            ("OVER_QUERY_LIMIT", "Geocoding quota exceeded"),
            ("UNKNOWN_ERROR", "Geocoding service error, try again"),
            ("SOMETHING_NEW", "Geocoding failed"),
        ] {
            let json = format!(r#"{{"status": "{}", "results": []}}"#, status);
            match parse(&json) {
                Err(AppError::Geocoding(m)) => assert_eq!(m, message),
                other => panic!("unexpected result for {}: {:?}", status, other),
            }
        }

        match parse(r#"{"status": "ZERO_RESULTS", "results": []}"#) {
            Err(AppError::Validation(m)) => assert_eq!(m, "Address not found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_empty_and_null_island() {
        assert!(matches!(
            parse(r#"{"status": "OK", "results": []}"#),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse(
                r#"{"status": "OK", "results": [{"formatted_address": "x",
                    "geometry": {"location": {"lat": 0.0, "lng": 0.0}}}]}"#
            ),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = GeocodingConfig {
            provider: GeocodingProvider::Google,
            api_key: Some("  ".to_string()),
            ..GeocodingConfig::default()
        };
        let geocoder = GoogleGeocoder::new(&config).unwrap();
        let result = tokio_test::block_on(geocoder.geocode("Rua Augusta, 100"));
        assert!(matches!(result, Err(AppError::Geocoding(_))));
    }

    #[tokio::test]
    async fn test_fixed_geocoder() {
        let geocoder = FixedGeocoder::new(SAO_PAULO_CENTER);
        let result = geocoder.geocode("Rua Augusta, 100").await.unwrap();
        assert_eq!(result.coordinate, SAO_PAULO_CENTER);
        assert_eq!(result.formatted_address, "Rua Augusta, 100");
    }
}
