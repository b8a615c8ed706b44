use serde::{Deserialize, Deserializer, Serialize};

pub mod trip;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Transport types understood by the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Car,
    Truck,
    Taxi,
    Bus,
    Van,
    Motorcycle,
    Bicycle,
    Pedestrian,
}

impl TravelMode {
    pub const ALL: [TravelMode; 8] = [
        TravelMode::Car,
        TravelMode::Truck,
        TravelMode::Taxi,
        TravelMode::Bus,
        TravelMode::Van,
        TravelMode::Motorcycle,
        TravelMode::Bicycle,
        TravelMode::Pedestrian,
    ];

    /// Value sent as the `travelMode` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            TravelMode::Car => "car",
            TravelMode::Truck => "truck",
            TravelMode::Taxi => "taxi",
            TravelMode::Bus => "bus",
            TravelMode::Van => "van",
            TravelMode::Motorcycle => "motorcycle",
            TravelMode::Bicycle => "bicycle",
            TravelMode::Pedestrian => "pedestrian",
        }
    }

    /// Display label for the mode selector.
    pub fn label(self) -> &'static str {
        match self {
            TravelMode::Car => "Car",
            TravelMode::Truck => "Truck",
            TravelMode::Taxi => "Taxi",
            TravelMode::Bus => "Bus",
            TravelMode::Van => "Van",
            TravelMode::Motorcycle => "Motorcycle",
            TravelMode::Bicycle => "Bicycle",
            TravelMode::Pedestrian => "Pedestrian",
        }
    }

    /// Case-insensitive parse; anything outside the enumeration falls back
    /// to `Car`, matching the routing service's own default.
    pub fn from_param(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "truck" => TravelMode::Truck,
            "taxi" => TravelMode::Taxi,
            "bus" => TravelMode::Bus,
            "van" => TravelMode::Van,
            "motorcycle" => TravelMode::Motorcycle,
            "bicycle" => TravelMode::Bicycle,
            "pedestrian" => TravelMode::Pedestrian,
            _ => TravelMode::Car,
        }
    }
}

impl<'de> Deserialize<'de> for TravelMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TravelMode::from_param(&raw))
    }
}

/// One address suggestion, in the order returned by the search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub label: String,
    pub position: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub key: String,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteQuery {
    pub key: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub mode: TravelMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depart_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub points: Vec<Coordinate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteSummary {
    pub length_in_meters: u64,
    pub travel_time_in_seconds: u64,
}

/// Decoded route payload: overall summary plus the polyline points of each leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub summary: RouteSummary,
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyCheckRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyCheckResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
