//! Search filters applied to every leg of a request.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Cabin class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    /// Provider code: 1=Economy, 2=Premium Economy, 3=Business, 4=First.
    pub fn code(self) -> u8 {
        match self {
            Self::Economy => 1,
            Self::PremiumEconomy => 2,
            Self::Business => 3,
            Self::First => 4,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::Economy),
            2 => Ok(Self::PremiumEconomy),
            3 => Ok(Self::Business),
            4 => Ok(Self::First),
            other => Err(Error::MalformedInput(format!(
                "travel_class must be 1-4, got {other}"
            ))),
        }
    }
}

/// Maximum number of stops per leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stops {
    Any,
    Nonstop,
    OneOrFewer,
    TwoOrFewer,
}

impl Stops {
    /// Provider code: 0=Any, 1=Nonstop, 2=1 stop or fewer, 3=2 stops or fewer.
    pub fn code(self) -> u8 {
        match self {
            Self::Any => 0,
            Self::Nonstop => 1,
            Self::OneOrFewer => 2,
            Self::TwoOrFewer => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Any),
            1 => Ok(Self::Nonstop),
            2 => Ok(Self::OneOrFewer),
            3 => Ok(Self::TwoOrFewer),
            other => Err(Error::MalformedInput(format!(
                "stops must be 0-3, got {other}"
            ))),
        }
    }
}

/// Layover duration bounds in minutes, written `"min,max"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoverRange {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl std::fmt::Display for LayoverRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.min_minutes, self.max_minutes)
    }
}

impl FromStr for LayoverRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (min_minutes, max_minutes) = parse_pair::<u32>(s, "layover_duration")?;
        if min_minutes > max_minutes {
            return Err(Error::MalformedInput(format!(
                "layover_duration min {min_minutes} exceeds max {max_minutes}"
            )));
        }
        Ok(Self {
            min_minutes,
            max_minutes,
        })
    }
}

/// Departure window in local 24h hours, written `"start,end"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02},{:02}", self.start_hour, self.end_hour)
    }
}

impl FromStr for TimeWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start_hour, end_hour) = parse_pair::<u8>(s, "outbound_times")?;
        if start_hour > 23 || end_hour > 23 {
            return Err(Error::MalformedInput(format!(
                "outbound_times hours must be 0-23, got {s}"
            )));
        }
        if start_hour > end_hour {
            return Err(Error::MalformedInput(format!(
                "outbound_times start {start_hour} is after end {end_hour}"
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }
}

fn parse_pair<T: FromStr>(s: &str, field: &str) -> Result<(T, T)> {
    let malformed = || Error::MalformedInput(format!("{field} must be \"a,b\", got {s:?}"));

    let (a, b) = s.split_once(',').ok_or_else(malformed)?;
    let a = a.trim().parse().map_err(|_| malformed())?;
    let b = b.trim().parse().map_err(|_| malformed())?;
    Ok((a, b))
}

/// Filters applied identically to every leg of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub travel_class: TravelClass,
    pub stops: Option<Stops>,
    pub layover_duration: Option<LayoverRange>,
    pub excluded_airlines: BTreeSet<String>,
    pub outbound_time_window: Option<TimeWindow>,
}

impl FilterSet {
    pub fn new(travel_class: TravelClass) -> Self {
        Self {
            travel_class,
            ..Default::default()
        }
    }

    pub fn with_stops(mut self, stops: Stops) -> Self {
        self.stops = Some(stops);
        self
    }

    pub fn with_layover(mut self, range: LayoverRange) -> Self {
        self.layover_duration = Some(range);
        self
    }

    pub fn with_outbound_window(mut self, window: TimeWindow) -> Self {
        self.outbound_time_window = Some(window);
        self
    }

    /// Exclude airlines from a comma-separated list such as `"NK, f9"`.
    pub fn excluding(mut self, airlines: &str) -> Self {
        self.excluded_airlines.extend(
            airlines
                .split(',')
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty()),
        );
        self
    }

    /// Comma-joined excluded airline codes, or `None` when there are none.
    pub fn excluded_airlines_param(&self) -> Option<String> {
        if self.excluded_airlines.is_empty() {
            return None;
        }
        Some(
            self.excluded_airlines
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_the_provider_numbering() {
        assert_eq!(TravelClass::from_code(3).unwrap(), TravelClass::Business);
        assert_eq!(TravelClass::First.code(), 4);
        assert_eq!(Stops::from_code(0).unwrap(), Stops::Any);
        assert!(TravelClass::from_code(5).is_err());
        assert!(Stops::from_code(-1).is_err());
    }

    #[test]
    fn parse_layover_range() {
        let range: LayoverRange = "90, 330".parse().unwrap();
        assert_eq!(range.min_minutes, 90);
        assert_eq!(range.max_minutes, 330);
        assert_eq!(range.to_string(), "90,330");

        assert!("330,90".parse::<LayoverRange>().is_err());
        assert!("90".parse::<LayoverRange>().is_err());
        assert!("a,b".parse::<LayoverRange>().is_err());
    }

    #[test]
    fn parse_time_window() {
        let window: TimeWindow = "9,23".parse().unwrap();
        assert_eq!(window.to_string(), "09,23");

        assert!("09,24".parse::<TimeWindow>().is_err());
        assert!("20,08".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn excluded_airlines_are_normalized_and_deduplicated() {
        let filters = FilterSet::new(TravelClass::Economy).excluding(" nk,F9,,NK ");
        assert_eq!(filters.excluded_airlines.len(), 2);
        assert_eq!(filters.excluded_airlines_param().as_deref(), Some("F9,NK"));
        assert_eq!(FilterSet::default().excluded_airlines_param(), None);
    }
}
