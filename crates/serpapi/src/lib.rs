//! SerpAPI Google Flights provider.
//!
//! Implements [`itinerary::LegSearchProvider`] for chained multi-city
//! searches (`type=3` with `departure_token`) and
//! [`itinerary::FlightSearchProvider`] for one-way and round-trip searches.
//!
//! # Example
//!
//! ```no_run
//! use serpapi::SerpApiClient;
//!
//! # fn example() -> Result<(), itinerary::ProviderError> {
//! let client = SerpApiClient::builder("your-serpapi-key").build()?;
//! println!("using {client}");
//! # Ok(())
//! # }
//! ```

mod client;
mod params;
mod wire;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, SerpApiClient, SerpApiClientBuilder};
pub use params::{Params, SearchSettings};
