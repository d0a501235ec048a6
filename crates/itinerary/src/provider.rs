//! Flight-data provider boundary.

use std::future::Future;

use chrono::NaiveDate;

use crate::error::ProviderError;
use crate::filters::{FilterSet, LayoverRange, Stops, TravelClass};
use crate::types::{ContinuationToken, FlightOption, LegSpec};

/// One leg search round-trip.
///
/// `legs` is always the full itinerary shape; the provider uses
/// `continuation` to decide which leg the returned options belong to.
#[derive(Debug, Clone, Copy)]
pub struct LegQuery<'a> {
    pub legs: &'a [LegSpec],
    pub filters: &'a FilterSet,
    pub continuation: Option<&'a ContinuationToken>,
}

/// Options returned for one leg, split the way the provider buckets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegResults {
    pub primary: Vec<FlightOption>,
    pub secondary: Vec<FlightOption>,
}

impl LegResults {
    /// The authoritative candidate list.
    ///
    /// Provider-side filtering can push every match into the secondary
    /// bucket, so it is used when the primary bucket is empty.
    pub fn into_candidates(self) -> Vec<FlightOption> {
        if self.primary.is_empty() {
            self.secondary
        } else {
            self.primary
        }
    }
}

/// Searches one leg of a multi-city itinerary.
///
/// Implementations may retry internally; the builder never does.
pub trait LegSearchProvider: Send + Sync {
    fn search_leg(
        &self,
        query: LegQuery<'_>,
    ) -> impl Future<Output = Result<LegResults, ProviderError>> + Send;
}

/// A standalone one-way or round-trip search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub outbound_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub travel_class: TravelClass,
    pub stops: Option<Stops>,
    pub layover_duration: Option<LayoverRange>,
}

impl FlightQuery {
    pub fn one_way(origin: &str, destination: &str, outbound_date: NaiveDate) -> Self {
        Self {
            origin: origin.trim().to_uppercase(),
            destination: destination.trim().to_uppercase(),
            outbound_date,
            return_date: None,
            travel_class: TravelClass::Economy,
            stops: None,
            layover_duration: None,
        }
    }

    pub fn returning(mut self, date: NaiveDate) -> Self {
        self.return_date = Some(date);
        self
    }

    pub fn class(mut self, travel_class: TravelClass) -> Self {
        self.travel_class = travel_class;
        self
    }
}

/// Runs standalone (unchained) flight searches.
pub trait FlightSearchProvider: Send + Sync {
    fn search_flights(
        &self,
        query: &FlightQuery,
    ) -> impl Future<Output = Result<LegResults, ProviderError>> + Send;
}
