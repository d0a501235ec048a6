//! Per-leg selection policies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Error;
use crate::types::FlightOption;

/// Picks one option out of a leg's candidates.
///
/// The builder only depends on this trait, so a policy that looks at more
/// than one leg at a time can be dropped in without touching the loop.
pub trait SelectionPolicy: Send + Sync {
    /// Name reported back in the itinerary.
    fn name(&self) -> &str;

    /// Choose an option. Returns `None` only for an empty slice.
    fn select<'a>(&self, options: &'a [FlightOption]) -> Option<&'a FlightOption>;
}

/// Built-in greedy strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Cheapest,
    Fastest,
    Balanced,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::Fastest => "fastest",
            Self::Balanced => "balanced",
        }
    }

    /// Parse a strategy name, treating anything unrecognized as `Cheapest`.
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(strategy = name, "unknown selection strategy, using cheapest");
            Self::Cheapest
        })
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cheapest" => Ok(Self::Cheapest),
            "fastest" => Ok(Self::Fastest),
            "balanced" => Ok(Self::Balanced),
            other => Err(Error::MalformedInput(format!(
                "unknown selection strategy: {other}"
            ))),
        }
    }
}

impl SelectionPolicy for Strategy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn select<'a>(&self, options: &'a [FlightOption]) -> Option<&'a FlightOption> {
        let priced: Vec<(&FlightOption, u64)> = options
            .iter()
            .filter_map(|o| o.price.map(|p| (o, p)))
            .collect();

        if priced.is_empty() {
            return options.first();
        }

        let chosen = match self {
            Self::Cheapest => stable_min_by_key(&priced, |(_, price)| *price),
            Self::Fastest => stable_min_by_key(&priced, |(o, _)| duration_rank(o)),
            Self::Balanced => balanced(&priced),
        };

        chosen.or_else(|| priced.first().map(|(o, _)| *o))
    }
}

/// Missing durations sort after every known duration.
fn duration_rank(option: &FlightOption) -> (bool, u32) {
    match option.total_duration_minutes {
        Some(minutes) => (false, minutes),
        None => (true, 0),
    }
}

/// First element with the smallest key.
fn stable_min_by_key<'a, K: Ord>(
    priced: &[(&'a FlightOption, u64)],
    key: impl Fn(&(&'a FlightOption, u64)) -> K,
) -> Option<&'a FlightOption> {
    let mut best: Option<(&'a FlightOption, K)> = None;
    for entry in priced {
        let k = key(entry);
        if best.as_ref().is_none_or(|(_, best_key)| k < *best_key) {
            best = Some((entry.0, k));
        }
    }
    best.map(|(option, _)| option)
}

fn balanced<'a>(priced: &[(&'a FlightOption, u64)]) -> Option<&'a FlightOption> {
    let prices: Vec<f64> = priced.iter().map(|(_, p)| *p as f64).collect();
    let durations: Vec<f64> = priced
        .iter()
        .filter_map(|(o, _)| o.total_duration_minutes.map(f64::from))
        .collect();

    let (Some(price_range), Some(duration_range)) = (min_max(&prices), min_max(&durations))
    else {
        return priced.first().map(|(o, _)| *o);
    };

    let mut best: Option<(&'a FlightOption, f64)> = None;
    for (option, price) in priced {
        let price_score = normalize(*price as f64, price_range);
        let duration_score = option
            .total_duration_minutes
            .map(|d| normalize(f64::from(d), duration_range))
            .unwrap_or(1.0);
        let score = price_score + duration_score;

        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((*option, score));
        }
    }
    best.map(|(option, _)| option)
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
    )
}

/// Min-max scale into [0, 1]; a flat range contributes 0.
fn normalize(value: f64, (min, max): (f64, f64)) -> f64 {
    if max == min {
        0.0
    } else {
        (value - min) / (max - min)
    }
}
