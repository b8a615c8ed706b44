//! Thin client for the TomTom search and routing endpoints.

use serde::Deserialize;

use crate::error::UpstreamError;
use shared::{Coordinate, LocationCandidate, RouteLeg, RoutePlan, RouteQuery, RouteSummary, TravelMode};

pub const DEFAULT_BASE_URL: &str = "https://api.tomtom.com";

/// Searches are restricted to one country.
const COUNTRY_SET: &str = "NZ";
const SUGGESTION_LIMIT: u32 = 5;

/// Fixed probe pair used to validate a key: one short hop that any working
/// key can route.
const VALIDATION_ORIGIN: Coordinate = Coordinate {
    lat: -36.40000,
    lon: 174.36000,
};
const VALIDATION_DESTINATION: Coordinate = Coordinate {
    lat: -36.3967,
    lon: 174.37000,
};

pub struct TomTomClient {
    http: reqwest::Client,
    base_url: String,
}

impl TomTomClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Typeahead address search. An empty query returns no candidates
    /// without touching the network; a non-success status degrades to an
    /// empty list.
    pub async fn suggest(
        &self,
        query: &str,
        key: &str,
    ) -> Result<Vec<LocationCandidate>, UpstreamError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search/2/search/{}.json", self.base_url, query);
        let limit = SUGGESTION_LIMIT.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", key),
                ("countrySet", COUNTRY_SET),
                ("typeahead", "true"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "search endpoint returned non-success");
            return Ok(Vec::new());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .map(|result| LocationCandidate {
                label: result.address.freeform_address,
                position: Coordinate {
                    lat: result.position.lat,
                    lon: result.position.lon,
                },
            })
            .collect())
    }

    /// One traffic-aware routing call. `Ok(None)` means the service could
    /// not produce a route (non-success status or no routes in the payload).
    pub async fn calculate_route(
        &self,
        query: &RouteQuery,
    ) -> Result<Option<RoutePlan>, UpstreamError> {
        let locations = format!(
            "{},{}:{},{}",
            query.origin.lat, query.origin.lon, query.destination.lat, query.destination.lon
        );
        let url = format!("{}/routing/1/calculateRoute/{}/json", self.base_url, locations);

        let mut params = vec![
            ("travelMode".to_string(), query.mode.as_param().to_string()),
            ("traffic".to_string(), "true".to_string()),
            ("key".to_string(), query.key.clone()),
        ];
        if let Some(depart_at) = &query.depart_at {
            params.push(("departAt".to_string(), depart_at.clone()));
        }

        let response = self.http.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "routing endpoint returned non-success");
            return Ok(None);
        }

        let body: RoutingResponse = response.json().await?;
        Ok(body.routes.into_iter().next().map(|route| RoutePlan {
            summary: RouteSummary {
                length_in_meters: route.summary.length_in_meters,
                travel_time_in_seconds: route.summary.travel_time_in_seconds,
            },
            legs: route
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    points: leg
                        .points
                        .into_iter()
                        .map(|point| Coordinate {
                            lat: point.latitude,
                            lon: point.longitude,
                        })
                        .collect(),
                })
                .collect(),
        }))
    }

    /// Probe the routing endpoint with the sentinel pair. Only an HTTP
    /// success status accepts the key; network failures bubble up so the
    /// caller can fail closed with a reason.
    pub async fn validate_key(&self, key: &str) -> Result<bool, UpstreamError> {
        let locations = format!(
            "{},{}:{},{}",
            VALIDATION_ORIGIN.lat,
            VALIDATION_ORIGIN.lon,
            VALIDATION_DESTINATION.lat,
            VALIDATION_DESTINATION.lon
        );
        let url = format!("{}/routing/1/calculateRoute/{}/json", self.base_url, locations);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("travelMode", TravelMode::Car.as_param()),
                ("traffic", "true"),
                ("key", key),
            ])
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    address: SearchAddress,
    position: SearchPosition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchAddress {
    freeform_address: String,
}

#[derive(Debug, Deserialize)]
struct SearchPosition {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RoutingResponse {
    #[serde(default)]
    routes: Vec<TomTomRoute>,
}

#[derive(Debug, Deserialize)]
struct TomTomRoute {
    summary: TomTomSummary,
    #[serde(default)]
    legs: Vec<TomTomLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomTomSummary {
    length_in_meters: u64,
    travel_time_in_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct TomTomLeg {
    points: Vec<TomTomPoint>,
}

#[derive(Debug, Deserialize)]
struct TomTomPoint {
    latitude: f64,
    longitude: f64,
}
