//! Flight and itinerary data types.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{Error, Result};

/// One origin -> destination -> date leg of a multi-city request.
///
/// Airport codes are trimmed and upper-cased on construction and when
/// deserialized, so `" lax"` and `"LAX"` name the same airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegSpec {
    #[serde(deserialize_with = "airport_code")]
    pub departure_id: String,
    #[serde(deserialize_with = "airport_code")]
    pub arrival_id: String,
    pub date: NaiveDate,
}

impl LegSpec {
    pub fn new(departure_id: &str, arrival_id: &str, date: NaiveDate) -> Result<Self> {
        Ok(Self {
            departure_id: normalize_code(departure_id)?,
            arrival_id: normalize_code(arrival_id)?,
            date,
        })
    }

    /// Parse an ordered leg list from a JSON array.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>> {
        let legs: Vec<Self> = serde_json::from_value(value)
            .map_err(|e| Error::MalformedInput(format!("invalid flights list: {e}")))?;
        if legs.is_empty() {
            return Err(Error::MalformedInput("flights list is empty".into()));
        }
        Ok(legs)
    }

    /// Parse an ordered leg list from a JSON string.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::MalformedInput(format!("flights is not valid JSON: {e}")))?;
        Self::list_from_value(value)
    }

    /// Render as `LAX -> JFK on 2025-11-10`.
    pub fn route(&self) -> String {
        format!("{} -> {} on {}", self.departure_id, self.arrival_id, self.date)
    }
}

fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::MalformedInput("airport code is empty".into()));
    }
    Ok(code)
}

fn airport_code<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize_code(&raw).map_err(serde::de::Error::custom)
}

/// Opaque provider cursor that narrows the next leg's search to itineraries
/// consistent with a previously selected leg.
///
/// Only meaningful within the itinerary search that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An airport endpoint of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub name: String,
    pub code: String,
    pub local_time: String,
}

impl Airport {
    /// `Name (CODE)`.
    pub fn summary(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

/// A single flown segment within an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub airline: String,
    pub departure_airport: Airport,
    pub arrival_airport: Airport,
    pub travel_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_logo: Option<String>,
}

/// One candidate the provider returned for a leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightOption {
    /// `None` when the provider did not quote a usable price.
    pub price: Option<u64>,
    pub total_duration_minutes: Option<u32>,
    /// Never empty.
    pub segments: Vec<Segment>,
    pub continuation_token: Option<ContinuationToken>,
}

impl FlightOption {
    pub fn stops(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }
}

/// The option chosen for one position in the itinerary, reduced to a
/// display record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLeg {
    pub leg_number: usize,
    pub departure: String,
    pub departure_time: String,
    pub arrival: String,
    pub arrival_time: String,
    pub airline: String,
    pub price: Option<u64>,
    pub duration_minutes: Option<u32>,
    pub stops: usize,
    pub travel_class: String,
    pub segment_count: usize,
}

impl SelectedLeg {
    pub fn from_option(leg_number: usize, option: &FlightOption) -> Self {
        let first = option.first_segment();
        let last = option.last_segment();

        Self {
            leg_number,
            departure: first
                .map(|s| s.departure_airport.summary())
                .unwrap_or_else(|| "Unknown".to_string()),
            departure_time: first
                .map(|s| s.departure_airport.local_time.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            arrival: last
                .map(|s| s.arrival_airport.summary())
                .unwrap_or_else(|| "Unknown".to_string()),
            arrival_time: last
                .map(|s| s.arrival_airport.local_time.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            airline: first
                .map(|s| s.airline.clone())
                .unwrap_or_else(|| "Unknown Airline".to_string()),
            price: option.price,
            duration_minutes: option.total_duration_minutes,
            stops: option.stops(),
            travel_class: first
                .map(|s| s.travel_class.clone())
                .unwrap_or_else(|| "Economy".to_string()),
            segment_count: option.segments.len(),
        }
    }
}

/// Aggregate itinerary price.
///
/// Serializes as a number, or as the string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPrice {
    Known(u64),
    Unknown,
}

impl Serialize for TotalPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Known(amount) => serializer.serialize_u64(*amount),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl std::fmt::Display for TotalPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(amount) => write!(f, "{amount}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A complete multi-city itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    /// One entry per requested leg, in request order.
    pub legs: Vec<SelectedLeg>,
    pub total_price: TotalPrice,
    pub total_duration_minutes: u64,
    pub api_calls_used: usize,
    #[serde(rename = "selection_strategy")]
    pub strategy_used: String,
}

/// Display record for a single-leg search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightSummary {
    pub airline: String,
    pub price: String,
    pub duration: String,
    pub stops: String,
    pub departure: String,
    pub arrival: String,
    pub travel_class: String,
    pub airline_logo: String,
}

impl FlightSummary {
    /// Summarize an option by its first segment.
    pub fn from_option(option: &FlightOption) -> Option<Self> {
        let first = option.first_segment()?;

        let stops = match option.stops() {
            0 => "Nonstop".to_string(),
            n => format!("{n} stop(s)"),
        };

        Some(Self {
            airline: first.airline.clone(),
            price: option
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            duration: match option.total_duration_minutes {
                Some(minutes) => format!("{minutes} min"),
                None => "N/A min".to_string(),
            },
            stops,
            departure: format!(
                "{} at {}",
                first.departure_airport.summary(),
                first.departure_airport.local_time
            ),
            arrival: format!(
                "{} at {}",
                first.arrival_airport.summary(),
                first.arrival_airport.local_time
            ),
            travel_class: first.travel_class.clone(),
            airline_logo: first.airline_logo.clone().unwrap_or_default(),
        })
    }
}
