//! Greedy multi-city itinerary builder.
//!
//! Each leg is one provider round-trip. The option chosen for leg *i*
//! carries the continuation token that scopes the search for leg *i + 1*,
//! so legs are searched strictly in order. Selection is greedy: an earlier
//! choice is never revisited, even if a pricier first leg would have
//! unlocked a cheaper second one.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::filters::FilterSet;
use crate::provider::{LegQuery, LegSearchProvider};
use crate::selection::SelectionPolicy;
use crate::types::{ContinuationToken, Itinerary, LegSpec, SelectedLeg, TotalPrice};

/// Default ceiling on provider round-trips for one itinerary.
pub const MAX_API_CALLS: usize = 10;

/// Builder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Provider calls allowed per itinerary before giving up.
    pub max_api_calls: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_api_calls: MAX_API_CALLS,
        }
    }
}

/// Chains per-leg searches into a complete itinerary.
pub struct ItineraryBuilder<P> {
    provider: P,
    config: BuilderConfig,
}

impl<P: LegSearchProvider> ItineraryBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Search every leg in order and return the assembled itinerary.
    ///
    /// Either every leg is filled or an error tagged with the failing leg is
    /// returned; no partial itinerary is ever produced.
    pub async fn build(
        &self,
        legs: &[LegSpec],
        filters: &FilterSet,
        policy: &impl SelectionPolicy,
    ) -> Result<Itinerary> {
        if legs.is_empty() {
            return Err(Error::MalformedInput("at least one leg is required".into()));
        }

        info!(
            legs = legs.len(),
            strategy = policy.name(),
            "building multi-city itinerary"
        );

        let mut token: Option<ContinuationToken> = None;
        let mut api_calls = 0usize;
        let mut selected = Vec::with_capacity(legs.len());
        let mut total_price = 0u64;
        let mut all_priced = true;
        let mut total_duration = 0u64;

        for (leg_index, leg) in legs.iter().enumerate() {
            if api_calls >= self.config.max_api_calls {
                warn!(
                    limit = self.config.max_api_calls,
                    leg = leg_index + 1,
                    "api call limit reached"
                );
                return Err(Error::SafetyLimitExceeded {
                    limit: self.config.max_api_calls,
                    leg_index,
                });
            }

            debug!(
                leg = leg_index + 1,
                route = %leg.route(),
                chained = token.is_some(),
                "searching leg"
            );

            let query = LegQuery {
                legs,
                filters,
                continuation: token.as_ref(),
            };
            api_calls += 1;
            let results = self
                .provider
                .search_leg(query)
                .await
                .map_err(|e| Error::LegSearchFailed {
                    leg_index,
                    reason: e.to_string(),
                })?;

            let options = results.into_candidates();
            let Some(chosen) = policy.select(&options) else {
                return Err(Error::NoOptionsForLeg {
                    leg_index,
                    departure: leg.departure_id.clone(),
                    arrival: leg.arrival_id.clone(),
                });
            };

            let record = SelectedLeg::from_option(leg_index + 1, chosen);
            debug!(
                leg = leg_index + 1,
                candidates = options.len(),
                airline = %record.airline,
                price = ?record.price,
                "selected option"
            );

            match chosen.price {
                Some(price) => total_price = total_price.saturating_add(price),
                None => all_priced = false,
            }
            total_duration += u64::from(chosen.total_duration_minutes.unwrap_or(0));

            if leg_index + 1 < legs.len() {
                token = chosen.continuation_token.clone();
                if token.is_none() {
                    warn!(
                        leg = leg_index + 1,
                        "selected option has no continuation token, next leg is searched unchained"
                    );
                }
            }

            selected.push(record);
        }

        let total_price = if all_priced && total_price > 0 {
            TotalPrice::Known(total_price)
        } else {
            TotalPrice::Unknown
        };

        info!(
            legs = selected.len(),
            api_calls,
            %total_price,
            total_duration,
            "itinerary complete"
        );

        Ok(Itinerary {
            legs: selected,
            total_price,
            total_duration_minutes: total_duration,
            api_calls_used: api_calls,
            strategy_used: policy.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;
    use crate::error::ProviderError;
    use crate::filters::TravelClass;
    use crate::provider::LegResults;
    use crate::selection::Strategy;
    use crate::types::FlightOption;
    use crate::types::fixtures::segment;

    /// Scripted provider: pops one response per call and records the token
    /// each call was made with.
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<std::result::Result<LegResults, ProviderError>>>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<std::result::Result<LegResults, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen_tokens: Mutex::default(),
            }
        }

        fn calls(&self) -> usize {
            self.seen_tokens.lock().unwrap().len()
        }

        fn tokens(&self) -> Vec<Option<String>> {
            self.seen_tokens.lock().unwrap().clone()
        }
    }

    impl LegSearchProvider for ScriptedProvider {
        async fn search_leg(
            &self,
            query: LegQuery<'_>,
        ) -> std::result::Result<LegResults, ProviderError> {
            self.seen_tokens
                .lock()
                .unwrap()
                .push(query.continuation.map(|t| t.as_str().to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(LegResults::default()))
        }
    }

    /// Filters options by excluded airline before answering, the way the
    /// real provider applies `exclude_airlines`.
    struct FilteringProvider {
        per_leg: Vec<Vec<FlightOption>>,
        calls: Mutex<usize>,
    }

    impl LegSearchProvider for FilteringProvider {
        async fn search_leg(
            &self,
            query: LegQuery<'_>,
        ) -> std::result::Result<LegResults, ProviderError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls - 1
            };
            let excluded: &BTreeSet<String> = &query.filters.excluded_airlines;
            let primary = self.per_leg[index]
                .iter()
                .filter(|o| !o.segments.iter().any(|s| excluded.contains(&s.airline)))
                .cloned()
                .collect();
            Ok(LegResults {
                primary,
                secondary: vec![],
            })
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn leg(from: &str, to: &str, day: u32) -> LegSpec {
        LegSpec::new(from, to, date(day)).unwrap()
    }

    fn offer(airline: &str, from: &str, to: &str, price: u64, minutes: u32) -> FlightOption {
        FlightOption {
            price: Some(price),
            total_duration_minutes: Some(minutes),
            segments: vec![segment(airline, from, to)],
            continuation_token: None,
        }
    }

    fn with_token(mut option: FlightOption, token: &str) -> FlightOption {
        option.continuation_token = Some(ContinuationToken::new(token));
        option
    }

    fn primary(options: Vec<FlightOption>) -> std::result::Result<LegResults, ProviderError> {
        Ok(LegResults {
            primary: options,
            secondary: vec![],
        })
    }

    #[tokio::test]
    async fn two_leg_cheapest_itinerary() {
        let provider = ScriptedProvider::new(vec![
            primary(vec![
                with_token(offer("Delta", "LAX", "JFK", 320, 330), "tok-expensive"),
                with_token(offer("JetBlue", "LAX", "JFK", 210, 345), "tok-cheap"),
            ]),
            primary(vec![
                offer("JetBlue", "JFK", "BOS", 140, 80),
                offer("Delta", "JFK", "BOS", 90, 75),
            ]),
        ]);
        let builder = ItineraryBuilder::new(provider);
        let legs = [leg("LAX", "JFK", 10), leg("JFK", "BOS", 12)];

        let itinerary = builder
            .build(&legs, &FilterSet::new(TravelClass::Economy), &Strategy::Cheapest)
            .await
            .unwrap();

        assert_eq!(itinerary.legs.len(), 2);
        assert_eq!(itinerary.legs[0].leg_number, 1);
        assert_eq!(itinerary.legs[1].leg_number, 2);
        assert_eq!(itinerary.api_calls_used, 2);
        assert_eq!(itinerary.total_duration_minutes, 345 + 75);
        assert_eq!(itinerary.total_price, TotalPrice::Known(210 + 90));
        assert_eq!(itinerary.strategy_used, "cheapest");
        assert_eq!(
            builder.provider().tokens(),
            vec![None, Some("tok-cheap".to_string())]
        );
    }

    #[tokio::test]
    async fn falls_back_to_secondary_bucket() {
        let provider = ScriptedProvider::new(vec![Ok(LegResults {
            primary: vec![],
            secondary: vec![offer("United", "SFO", "SEA", 99, 120)],
        })]);
        let builder = ItineraryBuilder::new(provider);

        let itinerary = builder
            .build(&[leg("SFO", "SEA", 3)], &FilterSet::default(), &Strategy::Fastest)
            .await
            .unwrap();

        assert_eq!(itinerary.legs[0].airline, "United");
    }

    #[tokio::test]
    async fn excluded_airlines_empty_middle_leg() {
        let provider = FilteringProvider {
            per_leg: vec![
                vec![with_token(offer("American", "LAX", "ORD", 180, 250), "t1")],
                vec![offer("NK", "ORD", "ATL", 60, 120), offer("F9", "ORD", "ATL", 70, 115)],
                vec![offer("Delta", "ATL", "MIA", 110, 110)],
            ],
            calls: Mutex::new(0),
        };
        let builder = ItineraryBuilder::new(provider);
        let legs = [leg("LAX", "ORD", 10), leg("ORD", "ATL", 12), leg("ATL", "MIA", 14)];
        let filters = FilterSet::new(TravelClass::Economy).excluding("NK,F9");

        let err = builder
            .build(&legs, &filters, &Strategy::Cheapest)
            .await
            .unwrap_err();

        match err {
            Error::NoOptionsForLeg {
                leg_index,
                departure,
                arrival,
            } => {
                assert_eq!(leg_index, 1);
                assert_eq!(departure, "ORD");
                assert_eq!(arrival, "ATL");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*builder.provider().calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn eleven_legs_hit_the_safety_limit() {
        let responses = (0..11)
            .map(|i| {
                primary(vec![with_token(
                    offer("Delta", "AAA", "BBB", 100, 60),
                    &format!("t{i}"),
                )])
            })
            .collect();
        let builder = ItineraryBuilder::new(ScriptedProvider::new(responses));
        let legs: Vec<LegSpec> = (1..=11).map(|day| leg("AAA", "BBB", day)).collect();

        let err = builder
            .build(&legs, &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::SafetyLimitExceeded {
                limit: 10,
                leg_index: 10
            }
        ));
        assert_eq!(builder.provider().calls(), 10);
    }

    #[tokio::test]
    async fn configured_limit_is_respected() {
        let responses = vec![
            primary(vec![offer("Delta", "AAA", "BBB", 100, 60)]),
            primary(vec![offer("Delta", "BBB", "CCC", 100, 60)]),
        ];
        let builder = ItineraryBuilder::new(ScriptedProvider::new(responses))
            .with_config(BuilderConfig { max_api_calls: 1 });
        let legs = [leg("AAA", "BBB", 1), leg("BBB", "CCC", 2)];

        let err = builder
            .build(&legs, &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap_err();

        assert_eq!(err.leg_index(), Some(1));
        assert_eq!(builder.provider().calls(), 1);
    }

    #[tokio::test]
    async fn ten_legs_fit_exactly() {
        let responses = (0..10)
            .map(|_| primary(vec![offer("Delta", "AAA", "BBB", 100, 60)]))
            .collect();
        let builder = ItineraryBuilder::new(ScriptedProvider::new(responses));
        let legs: Vec<LegSpec> = (1..=10).map(|day| leg("AAA", "BBB", day)).collect();

        let itinerary = builder
            .build(&legs, &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap();

        assert_eq!(itinerary.api_calls_used, 10);
        assert_eq!(itinerary.legs.len(), 10);
        for (i, leg) in itinerary.legs.iter().enumerate() {
            assert_eq!(leg.leg_number, i + 1);
        }
    }

    #[tokio::test]
    async fn missing_token_continues_unchained() {
        let provider = ScriptedProvider::new(vec![
            primary(vec![offer("Delta", "JFK", "LAX", 300, 360)]),
            primary(vec![offer("Alaska", "LAX", "SFO", 80, 85)]),
        ]);
        let builder = ItineraryBuilder::new(provider);
        let legs = [leg("JFK", "LAX", 15), leg("LAX", "SFO", 16)];

        let itinerary = builder
            .build(&legs, &FilterSet::default(), &Strategy::Fastest)
            .await
            .unwrap();

        assert_eq!(itinerary.legs.len(), 2);
        assert_eq!(builder.provider().tokens(), vec![None, None]);
    }

    #[tokio::test]
    async fn provider_failure_is_tagged_with_leg() {
        let provider = ScriptedProvider::new(vec![
            primary(vec![with_token(offer("Delta", "JFK", "LAX", 300, 360), "t")]),
            Err(ProviderError::Api("429 Too Many Requests".into())),
        ]);
        let builder = ItineraryBuilder::new(provider);
        let legs = [leg("JFK", "LAX", 15), leg("LAX", "SFO", 16)];

        let err = builder
            .build(&legs, &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap_err();

        match err {
            Error::LegSearchFailed { leg_index, reason } => {
                assert_eq!(leg_index, 1);
                assert!(reason.contains("429"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn first_leg_without_options_fails() {
        let builder = ItineraryBuilder::new(ScriptedProvider::new(vec![primary(vec![])]));

        let err = builder
            .build(&[leg("JFK", "LAX", 15)], &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap_err();

        assert_eq!(err.leg_index(), Some(0));
    }

    #[tokio::test]
    async fn unpriced_leg_makes_total_unknown() {
        let mut unpriced = offer("Delta", "JFK", "LAX", 0, 360);
        unpriced.price = None;
        let provider = ScriptedProvider::new(vec![
            primary(vec![unpriced]),
            primary(vec![offer("Alaska", "LAX", "SFO", 80, 85)]),
        ]);
        let builder = ItineraryBuilder::new(provider);
        let legs = [leg("JFK", "LAX", 15), leg("LAX", "SFO", 16)];

        let itinerary = builder
            .build(&legs, &FilterSet::default(), &Strategy::Balanced)
            .await
            .unwrap();

        assert_eq!(itinerary.total_price, TotalPrice::Unknown);
        assert_eq!(itinerary.total_duration_minutes, 445);
        assert_eq!(itinerary.legs[0].price, None);
    }

    #[tokio::test]
    async fn oversized_prices_saturate() {
        let provider = ScriptedProvider::new(vec![
            primary(vec![offer("Delta", "JFK", "LAX", u64::MAX - 1, 360)]),
            primary(vec![offer("Alaska", "LAX", "SFO", 80, 85)]),
        ]);
        let builder = ItineraryBuilder::new(provider);
        let legs = [leg("JFK", "LAX", 15), leg("LAX", "SFO", 16)];

        let itinerary = builder
            .build(&legs, &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap();

        assert_eq!(itinerary.total_price, TotalPrice::Known(u64::MAX));
    }

    #[tokio::test]
    async fn empty_leg_list_is_malformed() {
        let builder = ItineraryBuilder::new(ScriptedProvider::default());

        let err = builder
            .build(&[], &FilterSet::default(), &Strategy::Cheapest)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedInput(_)));
        assert_eq!(builder.provider().calls(), 0);
    }
}
