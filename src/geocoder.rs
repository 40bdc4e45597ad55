use crate::config::GeocoderConfig;
use crate::error::GeocodingError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// A location suggested by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    /// State name supplied by the geocoder, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

pub trait Geocoder: Send + Sync + 'static {
    /// Ranked candidates for `query`. Candidates without a coordinate are
    /// already filtered out.
    fn autocomplete(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<GeocodeCandidate>, GeocodingError>> + Send;
}

pub struct GeoapifyClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    country_codes: String,
    limit: u32,
}

impl GeoapifyClient {
    pub fn new(config: &GeocoderConfig, api_key: Option<String>) -> Result<Self, GeocodingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeocodingError::HttpError(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: api_key
                .or_else(|| config.api_key.clone())
                .filter(|key| !key.is_empty()),
            country_codes: config.country_codes.join(","),
            limit: config.limit,
        })
    }
}

impl Geocoder for GeoapifyClient {
    async fn autocomplete(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodingError> {
        let api_key = self.api_key.as_deref().ok_or(GeocodingError::MissingApiKey)?;

        let params = [
            ("text", query.to_string()),
            ("apiKey", api_key.to_string()),
            ("countryCodes", self.country_codes.clone()),
            ("limit", self.limit.to_string()),
        ];

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GeocodingError::HttpError(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GeocodingError::HttpError(e.to_string()))?;

        let candidates = parse_autocomplete(&bytes)?;
        debug!(query, candidates = candidates.len(), "Geocoder responded");
        Ok(candidates)
    }
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Deserialize, Default)]
struct RawProperties {
    lat: Option<f64>,
    lon: Option<f64>,
    address_line1: Option<String>,
    name: Option<String>,
    state: Option<String>,
}

/// Parse a Geoapify FeatureCollection into accepted candidates.
pub fn parse_autocomplete(bytes: &[u8]) -> Result<Vec<GeocodeCandidate>, GeocodingError> {
    let response: AutocompleteResponse =
        serde_json::from_slice(bytes).map_err(|e| GeocodingError::JsonError(e.to_string()))?;

    Ok(response.features.into_iter().filter_map(to_candidate).collect())
}

fn to_candidate(feature: RawFeature) -> Option<GeocodeCandidate> {
    // Point geometry is [lon, lat]; fall back to the lat/lon properties
    let point = feature
        .geometry
        .as_ref()
        .and_then(|g| g.coordinates.as_array())
        .and_then(|c| Some((c.get(1)?.as_f64()?, c.first()?.as_f64()?)));

    let (lat, lng) = match (point, feature.properties.lat, feature.properties.lon) {
        (Some(point), _, _) => point,
        (None, Some(lat), Some(lon)) => (lat, lon),
        _ => return None,
    };

    let props = feature.properties;
    let display_name = props
        .address_line1
        .filter(|s| !s.is_empty())
        .or(props.name.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "Unknown".to_string());

    Some(GeocodeCandidate {
        lat,
        lng,
        display_name,
        state: props.state.filter(|s| !s.trim().is_empty()),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geometry_and_display_name() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [72.8777, 19.076] },
                "properties": { "address_line1": "Mumbai", "name": "Bombay", "state": "Maharashtra" }
            }]
        }"#;

        let candidates = parse_autocomplete(json.as_bytes()).unwrap();
        assert_eq!(
            candidates,
            vec![GeocodeCandidate {
                lat: 19.076,
                lng: 72.8777,
                display_name: "Mumbai".to_string(),
                state: Some("Maharashtra".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_falls_back_to_properties_and_name() {
        let json = r#"{"features": [{
            "properties": { "lat": 12.97, "lon": 77.59, "address_line1": "", "name": "Bengaluru" }
        }]}"#;

        let candidates = parse_autocomplete(json.as_bytes()).unwrap();
        assert_eq!(candidates[0].lat, 12.97);
        assert_eq!(candidates[0].lng, 77.59);
        assert_eq!(candidates[0].display_name, "Bengaluru");
        assert_eq!(candidates[0].state, None);
    }

    #[test]
    fn test_parse_skips_features_without_coordinates() {
        let json = r#"{"features": [
            { "properties": { "name": "Nowhere" } },
            { "geometry": { "type": "Point", "coordinates": [80.27, 13.08] }, "properties": {} }
        ]}"#;

        let candidates = parse_autocomplete(json.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].display_name, "Unknown");
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(parse_autocomplete(br#"{"features": []}"#).unwrap().is_empty());
        assert!(parse_autocomplete(br#"{}"#).unwrap().is_empty());
        assert!(matches!(
            parse_autocomplete(b"<html>").unwrap_err(),
            GeocodingError::JsonError(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = GeoapifyClient::new(&GeocoderConfig::default(), None).unwrap();
        let err = client.autocomplete("Pune").await.unwrap_err();
        assert!(matches!(err, GeocodingError::MissingApiKey));
    }
}
