use std::time::Duration;

use serde::Deserialize;

const EARTH_RADIUS_KM: f64 = 6371.0;
const USER_AGENT: &str = "asis-watch-alerts/1.0";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

/// Routing and geocoding against OSRM- and Nominatim-compatible
/// endpoints. Every failure degrades: routing falls back to the
/// great-circle distance, geocoding to `None`.
pub struct GeoService {
    client: reqwest::Client,
    routing_base: String,
    geocoding_base: String,
}

impl GeoService {
    pub fn new(routing_base: String, geocoding_base: String) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(10))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            routing_base,
            geocoding_base,
        }
    }

    /// One-way driving distance in km. Falls back to the haversine
    /// approximation when the routing provider is unavailable.
    pub async fn driving_distance_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.routing_base,
            from.lng,
            from.lat,
            to.lng,
            to.lat
        );

        match self.fetch_route_distance_m(&url).await {
            Some(distance_m) => distance_m / 1000.0,
            None => haversine_km(from, to),
        }
    }

    async fn fetch_route_distance_m(&self, url: &str) -> Option<f64> {
        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "routing provider returned error status");
                return None;
            }
            Err(e) => {
                tracing::warn!("routing request failed: {}", e);
                return None;
            }
        };

        let data: OsrmResponse = response.json().await.ok()?;
        data.routes?.first()?.distance.filter(|d| *d > 0.0)
    }

    /// Resolve a free-text address to coordinates, or `None` when the
    /// geocoder has no answer.
    pub async fn geocode_address(&self, address: &str) -> Option<Coordinates> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.geocoding_base,
            urlencoding::encode(address)
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(_) | Err(_) => {
                tracing::warn!(address, "geocoding request failed");
                return None;
            }
        };

        let results: Vec<NominatimResult> = response.json().await.ok()?;
        let first = results.first()?;

        let lat = first.lat.parse::<f64>().ok()?;
        let lng = first.lon.parse::<f64>().ok()?;
        Some(Coordinates { lat, lng })
    }
}

/// Great-circle distance in km.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h =
        (d_lat / 2.0).sin().powi(2) +
        a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = Coordinates { lat: 52.3007, lng: 4.9475 };
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn test_haversine_amsterdam_to_utrecht() {
        // Roughly 35 km as the crow flies.
        let amsterdam = Coordinates { lat: 52.3007, lng: 4.9475 };
        let utrecht = Coordinates { lat: 52.0827, lng: 5.1004 };

        let km = haversine_km(amsterdam, utrecht);
        assert!(km > 25.0 && km < 40.0, "got {} km", km);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Coordinates { lat: 52.3896, lng: 4.6515 };
        let b = Coordinates { lat: 50.9005, lng: 5.9373 };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
