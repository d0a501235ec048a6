//! Itinerary error types.

use thiserror::Error;

/// Errors from building an itinerary.
///
/// Every variant raised by the builder loop carries the 0-based index of the
/// leg that failed. This enum is marked `#[non_exhaustive]` to allow adding
/// new variants in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Caller input could not be parsed (leg list, filter values, strategy).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The provider failed while searching a leg.
    #[error("search failed for leg {}: {reason}", leg_index + 1)]
    LegSearchFailed { leg_index: usize, reason: String },

    /// The provider returned no options for a leg.
    #[error("no flights found for leg {} ({departure} -> {arrival})", leg_index + 1)]
    NoOptionsForLeg {
        leg_index: usize,
        departure: String,
        arrival: String,
    },

    /// The per-itinerary provider call ceiling was reached.
    #[error("safety limit of {limit} API calls reached before leg {}", leg_index + 1)]
    SafetyLimitExceeded { limit: usize, leg_index: usize },
}

impl Error {
    /// The 0-based leg index this error is tagged with, if any.
    pub fn leg_index(&self) -> Option<usize> {
        match self {
            Self::MalformedInput(_) => None,
            Self::LegSearchFailed { leg_index, .. }
            | Self::NoOptionsForLeg { leg_index, .. }
            | Self::SafetyLimitExceeded { leg_index, .. } => Some(*leg_index),
        }
    }
}

/// Errors from a flight-data provider round-trip.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// A network error occurred during the request.
    #[error("network: {0}")]
    Network(String),

    /// The provider returned an error response.
    #[error("provider api: {0}")]
    Api(String),

    /// The provider response could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_one_based_leg_numbers() {
        let err = Error::NoOptionsForLeg {
            leg_index: 1,
            departure: "ORD".into(),
            arrival: "ATL".into(),
        };
        assert_eq!(err.to_string(), "no flights found for leg 2 (ORD -> ATL)");
        assert_eq!(err.leg_index(), Some(1));
    }

    #[test]
    fn malformed_input_has_no_leg() {
        assert_eq!(Error::MalformedInput("x".into()).leg_index(), None);
    }
}
