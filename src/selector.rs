// Winner selection for a single leg: currency filter, stop-count preference
// with graceful degradation, then cheapest candidate.

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::offer::Offer;

#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    pub currency: String,
    pub prefer_nonstop: bool,
    pub max_stops_preferred: u32,
    pub max_stops_fallback: u32,
}

impl SelectionPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            prefer_nonstop: config.prefer_nonstop,
            max_stops_preferred: config.max_stops_preferred,
            max_stops_fallback: config.max_stops_fallback,
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            prefer_nonstop: true,
            max_stops_preferred: 0,
            max_stops_fallback: 1,
        }
    }
}

// The winning offer for one leg. Keeps the full raw offer so the reporter
// can render carriers, times and flight numbers later.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LegQuote {
    pub amount: f64,
    pub offer_id: String,
    pub stops: u32,
    pub offer: Offer,
}

// Pick the cheapest eligible offer, or None when nothing matches the
// configured currency. Candidate tiers when nonstop is preferred:
// stops <= preferred, then stops <= fallback, then every priced offer.
// Ties keep the first offer in upstream order.
pub fn select_cheapest(offers: &[Offer], policy: &SelectionPolicy) -> Option<LegQuote> {
    let priced: Vec<(&Offer, f64)> = offers
        .iter()
        .filter(|o| o.total_currency == policy.currency)
        .filter_map(|o| match o.total_amount.parse::<f64>() {
            Ok(amount) => Some((o, amount)),
            Err(_) => {
                tracing::warn!(
                    offer_id = %o.id,
                    amount = %o.total_amount,
                    "skipping offer with unparseable amount"
                );
                None
            }
        })
        .collect();
    if priced.is_empty() {
        return None;
    }

    let candidates: Vec<(&Offer, f64)> = if policy.prefer_nonstop {
        let preferred: Vec<(&Offer, f64)> = priced
            .iter()
            .copied()
            .filter(|(o, _)| o.stops() <= policy.max_stops_preferred)
            .collect();
        if !preferred.is_empty() {
            preferred
        } else {
            let fallback: Vec<(&Offer, f64)> = priced
                .iter()
                .copied()
                .filter(|(o, _)| o.stops() <= policy.max_stops_fallback)
                .collect();
            if !fallback.is_empty() {
                fallback
            } else {
                priced
            }
        }
    } else {
        priced
    };

    let mut best: Option<(&Offer, f64)> = None;
    for (offer, amount) in candidates {
        if best.map_or(true, |(_, b)| amount < b) {
            best = Some((offer, amount));
        }
    }

    best.map(|(offer, amount)| LegQuote {
        amount,
        offer_id: offer.id.clone(),
        stops: offer.stops(),
        offer: offer.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::{Segment, Slice};
    use test_case::test_case;

    fn offer(id: &str, amount: &str, currency: &str, stops: usize) -> Offer {
        Offer {
            id: id.to_string(),
            total_amount: amount.to_string(),
            total_currency: currency.to_string(),
            slices: vec![Slice {
                duration: None,
                segments: vec![Segment::default(); stops + 1],
            }],
        }
    }

    #[test]
    fn picks_cheapest_matching_currency() {
        let offers = vec![
            offer("off_1", "500.00", "USD", 0),
            offer("off_2", "450.00", "USD", 0),
            offer("off_3", "100.00", "EUR", 0),
        ];
        let quote = select_cheapest(&offers, &SelectionPolicy::default()).unwrap();
        assert_eq!(quote.offer_id, "off_2");
        assert_eq!(quote.amount, 450.0);
        assert_eq!(quote.stops, 0);
    }

    #[test]
    fn no_currency_match_yields_none() {
        let offers = vec![
            offer("off_1", "500.00", "EUR", 0),
            offer("off_2", "450.00", "GBP", 1),
        ];
        assert!(select_cheapest(&offers, &SelectionPolicy::default()).is_none());
    }

    #[test]
    fn empty_offer_list_yields_none() {
        assert!(select_cheapest(&[], &SelectionPolicy::default()).is_none());
    }

    // Tier selection: stop counts of the inputs, cheapest-first amounts, and
    // the expected winner under the default policy (preferred 0, fallback 1).
    #[test_case(&[0, 1, 2], &["300", "200", "100"], "off_0"; "nonstop wins over cheaper connections")]
    #[test_case(&[2, 2, 1], &["100", "110", "300"], "off_2"; "fallback tier excludes two stop offers")]
    #[test_case(&[2, 3], &["100", "90"], "off_1"; "degrades to full set when fallback empty")]
    fn stop_preference_tiers(stops: &[u32], amounts: &[&str], expected: &str) {
        let offers: Vec<Offer> = stops
            .iter()
            .zip(amounts)
            .enumerate()
            .map(|(i, (s, amt))| offer(&format!("off_{i}"), amt, "USD", *s as usize))
            .collect();
        let quote = select_cheapest(&offers, &SelectionPolicy::default()).unwrap();
        assert_eq!(quote.offer_id, expected);
    }

    #[test]
    fn fallback_candidates_are_one_stop_only() {
        // Stop counts {2, 2, 1}: no nonstop exists, so candidates must be
        // the one-stop subset, never the two-stop offers.
        let offers = vec![
            offer("off_a", "100.00", "USD", 2),
            offer("off_b", "110.00", "USD", 2),
            offer("off_c", "900.00", "USD", 1),
        ];
        let quote = select_cheapest(&offers, &SelectionPolicy::default()).unwrap();
        assert_eq!(quote.offer_id, "off_c");
        assert_eq!(quote.stops, 1);
    }

    #[test]
    fn no_preference_picks_global_cheapest() {
        let policy = SelectionPolicy {
            prefer_nonstop: false,
            ..SelectionPolicy::default()
        };
        let offers = vec![
            offer("off_1", "400.00", "USD", 0),
            offer("off_2", "250.00", "USD", 2),
        ];
        let quote = select_cheapest(&offers, &policy).unwrap();
        assert_eq!(quote.offer_id, "off_2");
        assert_eq!(quote.stops, 2);
    }

    #[test]
    fn ties_keep_upstream_order() {
        let offers = vec![
            offer("off_first", "300.00", "USD", 0),
            offer("off_second", "300.00", "USD", 0),
        ];
        let quote = select_cheapest(&offers, &SelectionPolicy::default()).unwrap();
        assert_eq!(quote.offer_id, "off_first");
    }

    #[test]
    fn unparseable_amounts_are_excluded() {
        let offers = vec![
            offer("off_bad", "N/A", "USD", 0),
            offer("off_good", "700.00", "USD", 0),
        ];
        let quote = select_cheapest(&offers, &SelectionPolicy::default()).unwrap();
        assert_eq!(quote.offer_id, "off_good");

        let all_bad = vec![offer("off_bad", "??", "USD", 0)];
        assert!(select_cheapest(&all_bad, &SelectionPolicy::default()).is_none());
    }

    #[test]
    fn quote_carries_the_source_offer() {
        let offers = vec![offer("off_1", "820.50", "USD", 1)];
        let quote = select_cheapest(&offers, &SelectionPolicy::default()).unwrap();
        assert_eq!(quote.offer, offers[0]);
        assert_eq!(quote.stops, 1);
    }
}
