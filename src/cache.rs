// Per-run memoization of one-way quotes. Return-leg dates recur across many
// outbound iterations, so caching collapses the grid's upstream call count
// to one fetch per distinct leg.

use std::collections::HashMap;
use std::future::Future;

use chrono::NaiveDate;

use crate::offer::CabinClass;
use crate::selector::LegQuote;

// Uniquely identifies a one-way search. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegQuoteKey {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub cabin: CabinClass,
}

impl LegQuoteKey {
    pub fn new(origin: &str, destination: &str, date: NaiveDate, cabin: CabinClass) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
            cabin,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

// Lives for exactly one run. No expiry and no size bound: the grid is small,
// bounded by window length and trip-length bounds.
#[derive(Debug, Default)]
pub struct QuoteCache {
    entries: HashMap<LegQuoteKey, Option<LegQuote>>,
    stats: CacheStats,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Return the stored result for the key, fetching it on first request.
    // An absent quote (no eligible offer) is cached like any other result;
    // a fetch error is not cached and propagates to the caller.
    pub async fn get_or_fetch<F, Fut, E>(
        &mut self,
        key: LegQuoteKey,
        fetch: F,
    ) -> Result<Option<LegQuote>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<LegQuote>, E>>,
    {
        if let Some(cached) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(cached.clone());
        }

        self.stats.misses += 1;
        let fetched = fetch().await?;
        self.entries.insert(key, fetched.clone());
        Ok(fetched)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
