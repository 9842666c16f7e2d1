use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::GeoPoint;
use crate::config::GeocoderConfig;

/// One resolved location returned by a geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl GeocodeMatch {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoder responded with status {0}")]
    Status(u16),

    #[error("geocoder not configured: {0}")]
    NotConfigured(String),
}

/// Resolves free-form addresses or postal codes to coordinates.
/// An empty result means "no match", not an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError>;
}

/// Build the geocoder named by configuration
pub fn from_config(config: &GeocoderConfig) -> Result<Arc<dyn Geocoder>, GeocodeError> {
    match config.provider.as_str() {
        "mapquest" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| GeocodeError::NotConfigured("GEOCODER_API_KEY is required for mapquest".to_string()))?;
            Ok(Arc::new(MapQuestGeocoder::new(config.base_url.clone(), api_key)))
        }
        "static" => Ok(Arc::new(StaticGeocoder::default())),
        other => Err(GeocodeError::NotConfigured(format!("unknown provider '{}'", other))),
    }
}

/// MapQuest geocoding API v1 client
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: MapQuestLatLng,
    street: Option<String>,
    admin_area5: Option<String>,
    admin_area3: Option<String>,
    postal_code: Option<String>,
    admin_area1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

impl MapQuestGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn into_matches(response: MapQuestResponse) -> Vec<GeocodeMatch> {
        response
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .map(|loc| {
                let street = non_empty(loc.street);
                let city = non_empty(loc.admin_area5);
                let state = non_empty(loc.admin_area3);
                let zipcode = non_empty(loc.postal_code);
                let country = non_empty(loc.admin_area1);

                let region = [state.as_deref(), zipcode.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                let parts: Vec<&str> = [street.as_deref(), city.as_deref(), Some(region.as_str()), country.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.is_empty())
                    .collect();

                GeocodeMatch {
                    latitude: loc.lat_lng.lat,
                    longitude: loc.lat_lng.lng,
                    formatted_address: (!parts.is_empty()).then(|| parts.join(", ")),
                    street,
                    city,
                    state,
                    zipcode,
                    country,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("location", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body: MapQuestResponse = response.json().await?;
        let matches = Self::into_matches(body);
        tracing::debug!("Geocoded '{}' to {} location(s)", query, matches.len());
        Ok(matches)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Fixed lookup table, keyed case-insensitively. Used for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, GeocodeMatch>,
}

impl StaticGeocoder {
    pub fn with_entry(mut self, query: &str, location: GeocodeMatch) -> Self {
        self.entries.insert(Self::key(query), location);
        self
    }

    fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        Ok(self.entries.get(&Self::key(query)).cloned().into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mapquest_payload() {
        let payload = json!({
            "info": { "statuscode": 0 },
            "results": [{
                "providedLocation": { "location": "233 Bay State Rd Boston MA 02215" },
                "locations": [{
                    "street": "233 Bay State Rd",
                    "adminArea5": "Boston",
                    "adminArea3": "MA",
                    "adminArea1": "US",
                    "postalCode": "02215",
                    "latLng": { "lat": 42.350909, "lng": -71.105343 }
                }]
            }]
        });

        let response: MapQuestResponse = serde_json::from_value(payload).unwrap();
        let matches = MapQuestGeocoder::into_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].city.as_deref(), Some("Boston"));
        assert_eq!(matches[0].zipcode.as_deref(), Some("02215"));
        assert_eq!(
            matches[0].formatted_address.as_deref(),
            Some("233 Bay State Rd, Boston, MA 02215, US")
        );
    }

    #[test]
    fn blank_components_are_dropped() {
        let payload = json!({
            "results": [{ "locations": [{ "street": "", "adminArea5": "", "latLng": { "lat": 1.0, "lng": 2.0 } }] }]
        });
        let response: MapQuestResponse = serde_json::from_value(payload).unwrap();
        let matches = MapQuestGeocoder::into_matches(response);
        assert_eq!(matches[0].street, None);
        assert_eq!(matches[0].formatted_address, None);
    }

    #[tokio::test]
    async fn static_geocoder_is_case_insensitive() {
        let here = GeocodeMatch {
            latitude: 34.09,
            longitude: -118.41,
            formatted_address: None,
            street: None,
            city: Some("Beverly Hills".into()),
            state: Some("CA".into()),
            zipcode: Some("90210".into()),
            country: Some("US".into()),
        };
        let geocoder = StaticGeocoder::default().with_entry(" 90210 ", here.clone());
        assert_eq!(geocoder.geocode("90210").await.unwrap(), vec![here]);
        assert!(geocoder.geocode("00000").await.unwrap().is_empty());
    }

    #[test]
    fn mapquest_requires_key() {
        let config = crate::config::AppConfig::production().geocoder;
        assert!(matches!(from_config(&config), Err(GeocodeError::NotConfigured(_))));
    }
}
