//! Multi-city flight itinerary search.
//!
//! This crate holds the provider-independent core of the flight search
//! service: the flight data model, search filters, per-leg selection
//! policies, and the builder that chains leg searches into one itinerary.
//!
//! # Overview
//!
//! - **[`LegSearchProvider`]**: the single capability the core needs from a
//!   flight-data backend. Given the full leg list, filters and an optional
//!   [`ContinuationToken`], it returns the options for the next leg.
//! - **[`SelectionPolicy`]**: picks one option per leg. [`Strategy`]
//!   implements the built-in `cheapest`, `fastest` and `balanced` policies.
//! - **[`ItineraryBuilder`]**: runs the leg-by-leg loop and returns either a
//!   complete [`Itinerary`] or an [`Error`] tagged with the failing leg.
//!
//! # Example
//!
//! ```ignore
//! use itinerary::{FilterSet, ItineraryBuilder, LegSpec, Strategy, TravelClass};
//!
//! # async fn example(provider: impl itinerary::LegSearchProvider) -> itinerary::Result<()> {
//! let legs = LegSpec::list_from_json(r#"[
//!     {"departure_id": "LAX", "arrival_id": "JFK", "date": "2025-11-10"},
//!     {"departure_id": "JFK", "arrival_id": "BOS", "date": "2025-11-12"}
//! ]"#)?;
//!
//! let builder = ItineraryBuilder::new(provider);
//! let itinerary = builder
//!     .build(&legs, &FilterSet::new(TravelClass::Economy), &Strategy::Cheapest)
//!     .await?;
//! println!("{} legs, total {}", itinerary.legs.len(), itinerary.total_price);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod filters;
mod provider;
mod selection;
mod types;

pub use builder::{BuilderConfig, ItineraryBuilder, MAX_API_CALLS};
pub use error::{Error, ProviderError, Result};
pub use filters::{FilterSet, LayoverRange, Stops, TimeWindow, TravelClass};
pub use provider::{FlightQuery, FlightSearchProvider, LegQuery, LegResults, LegSearchProvider};
pub use selection::{SelectionPolicy, Strategy};
pub use types::{
    Airport, ContinuationToken, FlightOption, FlightSummary, Itinerary, LegSpec, Segment,
    SelectedLeg, TotalPrice,
};
