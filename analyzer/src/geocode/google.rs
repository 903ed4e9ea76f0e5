use super::Geocoder;
use anyhow::Context;
use celltracecore::geodesy::Coordinate;
use serde::Deserialize;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Google Maps geocoding client. One HTTPS round trip per lookup, no
/// retry or backoff; quota and transport failures surface as plain
/// errors for the current operation.
pub struct GoogleGeocoder {
    client: reqwest::blocking::Client,
    key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: WireLocation,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            key: key.into(),
        }
    }
}

fn coordinate_from_response(body: &str) -> anyhow::Result<Option<Coordinate>> {
    let response: GeocodeResponse =
        serde_json::from_str(body).context("decoding geocoding response")?;
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .first()
            .map(|result| Coordinate::new(result.geometry.location.lat, result.geometry.location.lng))),
        "ZERO_RESULTS" => Ok(None),
        other => anyhow::bail!("geocoding service answered {other}"),
    }
}

fn address_from_response(body: &str) -> anyhow::Result<Option<String>> {
    let response: GeocodeResponse =
        serde_json::from_str(body).context("decoding reverse geocoding response")?;
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.formatted_address)),
        "ZERO_RESULTS" => Ok(None),
        other => anyhow::bail!("geocoding service answered {other}"),
    }
}

impl Geocoder for GoogleGeocoder {
    fn resolve(&self, address: &str) -> anyhow::Result<Option<Coordinate>> {
        let body = self
            .client
            .get(GEOCODE_URL)
            .query(&[("address", address), ("key", self.key.as_str())])
            .send()
            .context("calling geocoding service")?
            .text()
            .context("reading geocoding response")?;
        coordinate_from_response(&body)
    }

    fn reverse(&self, coord: Coordinate) -> anyhow::Result<Option<String>> {
        let latlng = coord.to_string();
        let body = self
            .client
            .get(GEOCODE_URL)
            .query(&[("latlng", latlng.as_str()), ("key", self.key.as_str())])
            .send()
            .context("calling reverse geocoding service")?
            .text()
            .context("reading reverse geocoding response")?;
        address_from_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_yields_first_result_location() {
        let body = r#"{
            "status": "OK",
            "results": [
                {"formatted_address": "1600 Amphitheatre Pkwy",
                 "geometry": {"location": {"lat": 37.4223878, "lng": -122.0841877}}},
                {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
            ]
        }"#;
        let coord = coordinate_from_response(body).unwrap().unwrap();
        assert!((coord.latitude - 37.4223878).abs() < 1e-9);
        assert!((coord.longitude - -122.0841877).abs() < 1e-9);

        let address = address_from_response(body).unwrap().unwrap();
        assert_eq!(address, "1600 Amphitheatre Pkwy");
    }

    #[test]
    fn zero_results_is_not_found_rather_than_an_error() {
        let body = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        assert!(coordinate_from_response(body).unwrap().is_none());
        assert!(address_from_response(body).unwrap().is_none());
    }

    #[test]
    fn quota_status_propagates_as_failure() {
        let body = r#"{"status": "OVER_QUERY_LIMIT", "results": []}"#;
        assert!(coordinate_from_response(body).is_err());
    }

    #[test]
    fn garbage_body_is_a_decode_error() {
        assert!(coordinate_from_response("<html>offline</html>").is_err());
    }
}
