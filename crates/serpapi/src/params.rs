//! Google Flights request parameters.

use itinerary::{FlightQuery, LegQuery, ProviderError, TravelClass};
use tracing::debug;

const ENGINE: &str = "google_flights";

/// `type` values understood by the engine.
const TRIP_ROUND: &str = "1";
const TRIP_ONE_WAY: &str = "2";
const TRIP_MULTI_CITY: &str = "3";

/// `sort_by=2` orders results by price.
const SORT_BY_PRICE: &str = "2";

/// Locale and currency sent with every search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub currency: String,
    pub language: String,
    pub country: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
        }
    }
}

/// Ordered query-string pairs, excluding the API key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(&'static str, String)>);

impl Params {
    fn base(settings: &SearchSettings, trip_type: &str, travel_class: TravelClass) -> Self {
        let mut params = Self::default();
        params.push("engine", ENGINE);
        params.push("hl", &settings.language);
        params.push("gl", &settings.country);
        params.push("currency", &settings.currency);
        params.push("type", trip_type);
        params.push("travel_class", travel_class.code().to_string());
        params
    }

    fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.push((key, value.into()));
    }

    fn push_opt(&mut self, key: &'static str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    /// Parameters for one step of a chained multi-city search.
    pub fn multi_city(query: &LegQuery<'_>, settings: &SearchSettings) -> Result<Self, ProviderError> {
        let filters = query.filters;
        let mut params = Self::base(settings, TRIP_MULTI_CITY, filters.travel_class);

        let legs = serde_json::to_string(query.legs)
            .map_err(|e| ProviderError::InvalidResponse(format!("encode multi_city_json: {e}")))?;
        params.push("multi_city_json", legs);
        params.push("sort_by", SORT_BY_PRICE);

        if let Some(token) = query.continuation {
            debug!("using departure_token for chained search");
            params.push("departure_token", token.as_str());
        }
        params.push_opt("stops", filters.stops.map(|s| s.code().to_string()));
        params.push_opt(
            "layover_duration",
            filters.layover_duration.map(|r| r.to_string()),
        );
        params.push_opt("exclude_airlines", filters.excluded_airlines_param());
        params.push_opt(
            "outbound_times",
            filters.outbound_time_window.map(|w| w.to_string()),
        );

        debug!(segments = query.legs.len(), "multi-city search parameters prepared");
        Ok(params)
    }

    /// Parameters for a one-way or round-trip search.
    pub fn flights(query: &FlightQuery, settings: &SearchSettings) -> Self {
        let trip_type = if query.return_date.is_some() {
            TRIP_ROUND
        } else {
            TRIP_ONE_WAY
        };
        let mut params = Self::base(settings, trip_type, query.travel_class);

        params.push("departure_id", &query.origin);
        params.push("arrival_id", &query.destination);
        params.push("outbound_date", query.outbound_date.to_string());
        params.push_opt("return_date", query.return_date.map(|d| d.to_string()));
        params.push_opt("stops", query.stops.map(|s| s.code().to_string()));
        params.push_opt(
            "layover_duration",
            query.layover_duration.map(|r| r.to_string()),
        );

        debug!(trip_type, "flight search parameters prepared");
        params
    }
}
