// The date-grid search: enumerate valid outbound/return date pairs, quote
// both legs through the cache, and collect combined-price rows.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::cache::{CacheStats, LegQuoteKey, QuoteCache};
use crate::config::ScanConfig;
use crate::duffel::{ApiError, OfferSource};
use crate::offer::CabinClass;
use crate::selector::{select_cheapest, LegQuote, SelectionPolicy};

// Calendar range of outbound dates, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SearchWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days_out(today: NaiveDate, start_days_out: i64, end_days_out: i64) -> Self {
        Self {
            start: today + Duration::days(start_days_out),
            end: today + Duration::days(end_days_out),
        }
    }
}

// Allowed distance between outbound and return date, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripLengthBounds {
    pub min_days: i64,
    pub max_days: i64,
}

// One priced round trip. Total is rounded to two decimals; rows order by
// total ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub out_date: NaiveDate,
    pub ret_date: NaiveDate,
    pub out: LegQuote,
    pub ret: LegQuote,
    pub total: f64,
}

#[derive(Debug, Default)]
pub struct ScanResults {
    pub rows: Vec<CombinedRow>,
    // Rows strictly below the threshold, in grid order.
    pub alerts: Vec<CombinedRow>,
}

// Owns all search state for one run: the offer source, the selection policy
// and the quote cache. Dropped when the run ends.
pub struct GridSearch<S> {
    source: S,
    policy: SelectionPolicy,
    cache: QuoteCache,
    origin: String,
    destination: String,
    outbound_cabin: CabinClass,
    return_cabin: CabinClass,
    threshold: f64,
}

impl<S: OfferSource> GridSearch<S> {
    pub fn new(config: &ScanConfig, source: S) -> Self {
        Self {
            source,
            policy: SelectionPolicy::from_config(config),
            cache: QuoteCache::new(),
            origin: config.origin.clone(),
            destination: config.destination.clone(),
            outbound_cabin: config.outbound_cabin,
            return_cabin: config.return_cabin,
            threshold: config.threshold,
        }
    }

    // Enumerate the grid. For each outbound date the return range is
    // [outbound + min_days, min(outbound + max_days, window.end)]; an empty
    // range skips the outbound date without error, which naturally narrows
    // the search near the window's end. Pairs where either leg has no
    // eligible quote are skipped silently.
    pub async fn run(
        &mut self,
        window: SearchWindow,
        bounds: TripLengthBounds,
    ) -> Result<ScanResults, ApiError> {
        let origin = self.origin.clone();
        let destination = self.destination.clone();
        let mut results = ScanResults::default();

        let mut out_date = window.start;
        while out_date <= window.end {
            let ret_min = out_date + Duration::days(bounds.min_days);
            let ret_max = (out_date + Duration::days(bounds.max_days)).min(window.end);
            tracing::debug!(%out_date, %ret_min, %ret_max, "scanning outbound date");

            let mut ret_date = ret_min;
            while ret_date <= ret_max {
                let out_quote = self
                    .best_one_way(&origin, &destination, out_date, self.outbound_cabin)
                    .await?;
                let ret_quote = self
                    .best_one_way(&destination, &origin, ret_date, self.return_cabin)
                    .await?;

                if let (Some(out), Some(ret)) = (out_quote, ret_quote) {
                    let total = round2(out.amount + ret.amount);
                    let row = CombinedRow {
                        out_date,
                        ret_date,
                        out,
                        ret,
                        total,
                    };
                    if row.total < self.threshold {
                        results.alerts.push(row.clone());
                    }
                    results.rows.push(row);
                }

                ret_date += Duration::days(1);
            }

            out_date += Duration::days(1);
        }

        Ok(results)
    }

    async fn best_one_way(
        &mut self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        cabin: CabinClass,
    ) -> Result<Option<LegQuote>, ApiError> {
        let key = LegQuoteKey::new(origin, destination, date, cabin);
        let source = &self.source;
        let policy = &self.policy;
        self.cache
            .get_or_fetch(key, || async move {
                let offers = source.quote_one_way(origin, destination, date, cabin).await?;
                Ok(select_cheapest(&offers, policy))
            })
            .await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn distinct_legs(&self) -> usize {
        self.cache.len()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
