//! Google Flights response wire types.

use itinerary::{Airport, ContinuationToken, FlightOption, LegResults, ProviderError, Segment};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Error text the engine uses when a search simply matched nothing.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    best_flights: Vec<ApiFlight>,
    #[serde(default)]
    other_flights: Vec<ApiFlight>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiFlight {
    #[serde(default)]
    flights: Vec<ApiSegment>,
    #[serde(default)]
    total_duration: Option<u32>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    departure_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSegment {
    #[serde(default)]
    airline: Option<String>,
    #[serde(default)]
    departure_airport: Option<ApiAirport>,
    #[serde(default)]
    arrival_airport: Option<ApiAirport>,
    #[serde(default)]
    travel_class: Option<String>,
    #[serde(default)]
    flight_number: Option<String>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    airline_logo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiAirport {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

impl ApiResponse {
    /// Split into primary (`best_flights`) and secondary (`other_flights`)
    /// buckets. An engine-reported "no results" is an empty result set, any
    /// other engine error is a failure.
    pub(crate) fn into_results(self) -> Result<LegResults, ProviderError> {
        if let Some(error) = self.error {
            if error.contains(NO_RESULTS_MARKER) {
                debug!(%error, "search matched no flights");
                return Ok(LegResults::default());
            }
            return Err(ProviderError::Api(error));
        }

        let results = LegResults {
            primary: convert_all(self.best_flights),
            secondary: convert_all(self.other_flights),
        };
        debug!(
            primary = results.primary.len(),
            secondary = results.secondary.len(),
            "decoded flight options"
        );
        Ok(results)
    }
}

fn convert_all(flights: Vec<ApiFlight>) -> Vec<FlightOption> {
    flights
        .into_iter()
        .enumerate()
        .filter_map(|(i, flight)| {
            let option = flight.into_option();
            if option.is_none() {
                debug!(index = i + 1, "skipping flight with no segments");
            }
            option
        })
        .collect()
}

impl ApiFlight {
    fn into_option(self) -> Option<FlightOption> {
        if self.flights.is_empty() {
            return None;
        }

        Some(FlightOption {
            price: self.price.as_ref().and_then(price_amount),
            total_duration_minutes: self.total_duration,
            segments: self.flights.into_iter().map(ApiSegment::into_segment).collect(),
            continuation_token: self.departure_token.map(ContinuationToken::new),
        })
    }
}

/// Prices come back as numbers, but "N/A"-style strings show up for
/// unquoted fares.
fn price_amount(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    }
}

impl ApiSegment {
    fn into_segment(self) -> Segment {
        Segment {
            airline: self.airline.unwrap_or_else(|| "Unknown Airline".to_string()),
            departure_airport: self.departure_airport.unwrap_or_default().into_airport(),
            arrival_airport: self.arrival_airport.unwrap_or_default().into_airport(),
            travel_class: self.travel_class.unwrap_or_else(|| "Economy".to_string()),
            flight_number: self.flight_number,
            duration_minutes: self.duration,
            airline_logo: self.airline_logo,
        }
    }
}

impl ApiAirport {
    fn into_airport(self) -> Airport {
        Airport {
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            code: self.id.unwrap_or_else(|| "???".to_string()),
            local_time: self.time.unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Result<LegResults, ProviderError> {
        serde_json::from_value::<ApiResponse>(value).unwrap().into_results()
    }

    #[test]
    fn decode_multi_segment_flight() {
        let results = decode(json!({
            "best_flights": [{
                "flights": [
                    {
                        "departure_airport": {"name": "Sydney Airport", "id": "SYD", "time": "2025-12-01 09:00"},
                        "arrival_airport": {"name": "Changi Airport", "id": "SIN", "time": "2025-12-01 15:10"},
                        "duration": 490,
                        "airline": "Qantas",
                        "travel_class": "Economy",
                        "flight_number": "QF 1"
                    },
                    {
                        "departure_airport": {"name": "Changi Airport", "id": "SIN", "time": "2025-12-01 17:00"},
                        "arrival_airport": {"name": "Heathrow Airport", "id": "LHR", "time": "2025-12-02 05:00"},
                        "duration": 840,
                        "airline": "Qantas",
                        "travel_class": "Economy"
                    }
                ],
                "total_duration": 1440,
                "price": 1325,
                "type": "Multi-city",
                "departure_token": "WyJDalJJ"
            }],
            "other_flights": []
        }))
        .unwrap();

        assert_eq!(results.primary.len(), 1);
        let option = &results.primary[0];
        assert_eq!(option.price, Some(1325));
        assert_eq!(option.total_duration_minutes, Some(1440));
        assert_eq!(option.stops(), 1);
        assert_eq!(option.continuation_token.as_ref().unwrap().as_str(), "WyJDalJJ");
        assert_eq!(option.segments[1].arrival_airport.code, "LHR");
        assert_eq!(option.segments[0].flight_number.as_deref(), Some("QF 1"));
    }

    #[test]
    fn unusable_prices_become_unknown() {
        assert_eq!(price_amount(&json!(250)), Some(250));
        assert_eq!(price_amount(&json!(249.6)), Some(250));
        assert_eq!(price_amount(&json!("$1,204")), Some(1204));
        assert_eq!(price_amount(&json!("N/A")), None);
        assert_eq!(price_amount(&json!(-5)), None);
        assert_eq!(price_amount(&Value::Null), None);
    }

    #[test]
    fn flights_without_segments_are_dropped() {
        let results = decode(json!({
            "other_flights": [
                {"flights": [], "price": 100},
                {"flights": [{"airline": "Spirit"}], "price": 80}
            ]
        }))
        .unwrap();

        assert!(results.primary.is_empty());
        assert_eq!(results.secondary.len(), 1);
        let segment = &results.secondary[0].segments[0];
        assert_eq!(segment.departure_airport.code, "???");
        assert_eq!(segment.departure_airport.local_time, "N/A");
    }

    #[test]
    fn engine_errors() {
        let empty = decode(json!({
            "error": "Google Flights hasn't returned any results for this query."
        }))
        .unwrap();
        assert!(empty.primary.is_empty() && empty.secondary.is_empty());

        let err = decode(json!({"error": "Invalid API key."})).unwrap_err();
        assert!(matches!(err, ProviderError::Api(msg) if msg == "Invalid API key."));
    }
}
