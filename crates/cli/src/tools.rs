//! Flight search tools exposed over MCP.

use chrono::NaiveDate;
use itinerary::{
    FilterSet, FlightQuery, FlightSearchProvider, FlightSummary, ItineraryBuilder, LegSearchProvider,
    LegSpec, Stops, Strategy, TravelClass,
};
use mcp::{CallToolResult, Tool, ToolHandler, tool_definition};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

pub const SEARCH_FLIGHTS: &str = "search_flights_tool";
pub const SEARCH_MULTI_CITY: &str = "search_multi_city_flights";
pub const SERVER_STATUS: &str = "server_status";

/// The flight search tool set, backed by one provider.
pub struct FlightTools<P> {
    builder: ItineraryBuilder<P>,
    default_strategy: Strategy,
}

impl<P> FlightTools<P>
where
    P: LegSearchProvider + FlightSearchProvider + 'static,
{
    pub fn new(builder: ItineraryBuilder<P>, default_strategy: Strategy) -> Self {
        Self {
            builder,
            default_strategy,
        }
    }

    async fn search_flights(&self, arguments: Value) -> itinerary::Result<Vec<FlightSummary>> {
        let args: SearchFlightsArgs = parse_args(arguments)?;

        let mut query = FlightQuery::one_way(
            &args.origin,
            &args.destination,
            parse_date("outbound_date", &args.outbound_date)?,
        )
        .class(TravelClass::from_code(args.travel_class)?);
        if let Some(date) = non_empty(&args.return_date) {
            query = query.returning(parse_date("return_date", date)?);
        }
        if let Some(stops) = args.stops {
            query.stops = Some(Stops::from_code(stops)?);
        }
        if let Some(range) = non_empty(&args.layover_duration) {
            query.layover_duration = Some(range.parse()?);
        }

        info!(
            origin = %query.origin,
            destination = %query.destination,
            outbound = %query.outbound_date,
            return_date = ?query.return_date,
            class = query.travel_class.code(),
            "searching flights"
        );

        let results = self
            .builder
            .provider()
            .search_flights(&query)
            .await
            .map_err(|e| itinerary::Error::LegSearchFailed {
                leg_index: 0,
                reason: e.to_string(),
            })?;

        let flights: Vec<FlightSummary> = results
            .primary
            .iter()
            .filter_map(FlightSummary::from_option)
            .collect();
        info!(count = flights.len(), "returning formatted flights");
        Ok(flights)
    }

    async fn search_multi_city(&self, arguments: Value) -> itinerary::Result<Value> {
        let args: MultiCityArgs = parse_args(arguments)?;

        let filters = args.filters()?;
        let strategy = args
            .selection_strategy
            .as_deref()
            .map(Strategy::from_name_lenient)
            .unwrap_or(self.default_strategy);
        let legs = match args.flights {
            Value::String(json) => LegSpec::list_from_json(&json)?,
            other => LegSpec::list_from_value(other)?,
        };

        let itinerary = self.builder.build(&legs, &filters, &strategy).await?;
        serde_json::to_value(&itinerary)
            .map_err(|e| itinerary::Error::MalformedInput(format!("encode itinerary: {e}")))
    }
}

impl<P> ToolHandler for FlightTools<P>
where
    P: LegSearchProvider + FlightSearchProvider + 'static,
{
    fn tools(&self) -> Vec<Tool> {
        vec![
            tool_definition(
                SEARCH_FLIGHTS,
                "Search for one-way or round-trip flights between two airports. \
                 Returns a list of flights with airline, price, duration, stops, \
                 departure and arrival details.",
                json!({
                    "type": "object",
                    "properties": {
                        "origin": {"type": "string", "description": "Departure airport code (e.g. ATL, JFK)"},
                        "destination": {"type": "string", "description": "Arrival airport code (e.g. LAX, ORD)"},
                        "outbound_date": {"type": "string", "description": "Departure date (YYYY-MM-DD)"},
                        "return_date": {"type": "string", "description": "Return date for round trips (YYYY-MM-DD)"},
                        "travel_class": {"type": "integer", "minimum": 1, "maximum": 4, "default": 1,
                            "description": "1=Economy, 2=Premium Economy, 3=Business, 4=First"},
                        "stops": {"type": "integer", "minimum": 0, "maximum": 3,
                            "description": "0=Any, 1=Nonstop only, 2=1 stop or fewer, 3=2 stops or fewer"},
                        "layover_duration": {"type": "string", "description": "Layover range in minutes as \"min,max\""}
                    },
                    "required": ["origin", "destination", "outbound_date"]
                }),
            ),
            tool_definition(
                SEARCH_MULTI_CITY,
                "Build a multi-city itinerary by searching each leg in order, \
                 chaining each search to the flight selected for the previous leg. \
                 Returns the selected legs with total price, total duration and the \
                 number of API calls used.",
                json!({
                    "type": "object",
                    "properties": {
                        "flights": {
                            "description": "Ordered legs, as a JSON string or array of {departure_id, arrival_id, date}",
                            "type": ["string", "array"],
                            "items": {
                                "type": "object",
                                "properties": {
                                    "departure_id": {"type": "string"},
                                    "arrival_id": {"type": "string"},
                                    "date": {"type": "string"}
                                },
                                "required": ["departure_id", "arrival_id", "date"]
                            }
                        },
                        "travel_class": {"type": "integer", "minimum": 1, "maximum": 4, "default": 1},
                        "stops": {"type": "integer", "minimum": 0, "maximum": 3},
                        "layover_duration": {"type": "string", "description": "\"min,max\" in minutes"},
                        "exclude_airlines": {"type": "string", "description": "Comma-separated airline codes (e.g. \"NK,F9\")"},
                        "outbound_times": {"type": "string", "description": "Departure hour range \"start,end\" (e.g. \"09,23\")"},
                        "selection_strategy": {"type": "string", "enum": ["cheapest", "fastest", "balanced"]}
                    },
                    "required": ["flights"]
                }),
            ),
            tool_definition(
                SERVER_STATUS,
                "Check if the flight search server is running.",
                json!({"type": "object", "properties": {}}),
            ),
        ]
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> mcp::Result<CallToolResult> {
        debug!(tool = name, "tool invoked");

        let outcome = match name {
            SEARCH_FLIGHTS => self.search_flights(arguments).await.and_then(|flights| {
                serde_json::to_value(flights).map_err(|e| {
                    itinerary::Error::MalformedInput(format!("encode flights: {e}"))
                })
            }),
            SEARCH_MULTI_CITY => self.search_multi_city(arguments).await,
            SERVER_STATUS => Ok(json!({
                "status": "online",
                "message": "MCP Flight Search server is running"
            })),
            other => return Err(mcp::Error::ToolNotFound(other.to_string())),
        };

        Ok(match outcome {
            Ok(value) => mcp::json_result(&value),
            Err(e) => {
                error!(tool = name, leg = ?e.leg_index(), error = %e, "tool call failed");
                mcp::json_error(&json!({"error": e.to_string()}))
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchFlightsArgs {
    origin: String,
    destination: String,
    outbound_date: String,
    #[serde(default)]
    return_date: Option<String>,
    #[serde(default = "economy")]
    travel_class: i64,
    #[serde(default)]
    stops: Option<i64>,
    #[serde(default)]
    layover_duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MultiCityArgs {
    flights: Value,
    #[serde(default = "economy")]
    travel_class: i64,
    #[serde(default)]
    stops: Option<i64>,
    #[serde(default)]
    layover_duration: Option<String>,
    #[serde(default)]
    exclude_airlines: Option<String>,
    #[serde(default)]
    outbound_times: Option<String>,
    #[serde(default)]
    selection_strategy: Option<String>,
}

impl MultiCityArgs {
    fn filters(&self) -> itinerary::Result<FilterSet> {
        let mut filters = FilterSet::new(TravelClass::from_code(self.travel_class)?);
        if let Some(stops) = self.stops {
            filters = filters.with_stops(Stops::from_code(stops)?);
        }
        if let Some(range) = non_empty(&self.layover_duration) {
            filters = filters.with_layover(range.parse()?);
        }
        if let Some(window) = non_empty(&self.outbound_times) {
            filters = filters.with_outbound_window(window.parse()?);
        }
        if let Some(airlines) = non_empty(&self.exclude_airlines) {
            filters = filters.excluding(airlines);
        }
        Ok(filters)
    }
}

fn economy() -> i64 {
    i64::from(TravelClass::Economy.code())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> itinerary::Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| itinerary::Error::MalformedInput(format!("invalid arguments: {e}")))
}

fn parse_date(field: &str, value: &str) -> itinerary::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        itinerary::Error::MalformedInput(format!("{field} must be YYYY-MM-DD, got {value:?}"))
    })
}
