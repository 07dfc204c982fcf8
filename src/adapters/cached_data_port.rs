//! Time-bounded memoisation in front of any [`DataPort`].
//!
//! Only `fetch_ohlcv` results are cached, keyed by (code, market, start,
//! end). Errors pass through uncached. Symbol listings and data ranges always
//! go to the inner source.

use crate::domain::error::TickerscopeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::{DataPort, DataRange};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

type CacheKey = (String, String, NaiveDate, NaiveDate);

struct Entry {
    stored_at: Instant,
    bars: Vec<OhlcvBar>,
}

pub struct CachedDataPort<D> {
    inner: D,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl<D: DataPort> CachedDataPort<D> {
    pub fn new(inner: D, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Number of entries held, expired ones included until the next miss.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.lock().retain(|_, e| e.stored_at.elapsed() < ttl);
    }
}

impl<D: DataPort> DataPort for CachedDataPort<D> {
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        let key = (code.to_string(), market.to_string(), start_date, end_date);

        if let Some(entry) = self.entries.lock().get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                debug!(code, market, "cache hit");
                return Ok(entry.bars.clone());
            }
        }

        debug!(code, market, "cache miss");
        let bars = self.inner.fetch_ohlcv(code, market, start_date, end_date)?;
        self.purge_expired();
        self.entries.lock().insert(
            key,
            Entry {
                stored_at: Instant::now(),
                bars: bars.clone(),
            },
        );
        Ok(bars)
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, TickerscopeError> {
        self.inner.list_symbols(market)
    }

    fn get_data_range(
        &self,
        code: &str,
        market: &str,
    ) -> Result<Option<DataRange>, TickerscopeError> {
        self.inner.get_data_range(code, market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct CountingPort {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPort {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataPort for CountingPort {
        fn fetch_ohlcv(
            &self,
            code: &str,
            market: &str,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TickerscopeError::DataSource {
                    reason: "offline".into(),
                });
            }
            Ok(vec![OhlcvBar {
                code: code.into(),
                market: market.into(),
                date: start_date,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1,
            }])
        }

        fn list_symbols(&self, _market: &str) -> Result<Vec<String>, TickerscopeError> {
            Ok(vec!["AAPL".into()])
        }

        fn get_data_range(
            &self,
            _code: &str,
            _market: &str,
        ) -> Result<Option<DataRange>, TickerscopeError> {
            Ok(None)
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn repeated_fetch_hits_cache() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(60));

        let first = cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();
        let second = cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner().calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_includes_every_argument() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(60));

        cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();
        cache.fetch_ohlcv("AAPL", "HK", day(1), day(5)).unwrap();
        cache.fetch_ohlcv("AAPL", "US", day(2), day(5)).unwrap();
        cache.fetch_ohlcv("AAPL", "US", day(1), day(6)).unwrap();
        cache.fetch_ohlcv("MSFT", "US", day(1), day(5)).unwrap();

        assert_eq!(cache.inner().calls(), 5);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_millis(5));

        cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();
        thread::sleep(Duration::from_millis(20));
        cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();

        assert_eq!(cache.inner().calls(), 2);
    }

    #[test]
    fn purge_drops_expired() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_millis(5));
        cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();
        thread::sleep(Duration::from_millis(20));
        cache.purge_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = CachedDataPort::new(CountingPort::new(true), Duration::from_secs(60));

        assert!(cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).is_err());
        assert!(cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).is_err());

        assert_eq!(cache.inner().calls(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn miss_evicts_expired_entries() {
        let cache = CachedDataPort::new(CountingPort::new(false), Duration::from_millis(5));
        cache.fetch_ohlcv("AAPL", "US", day(1), day(5)).unwrap();
        cache.fetch_ohlcv("MSFT", "US", day(1), day(5)).unwrap();
        thread::sleep(Duration::from_millis(20));

        cache.fetch_ohlcv("NVDA", "US", day(1), day(5)).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.inner().calls(), 3);
    }

    #[test]
    fn cache_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CachedDataPort<CountingPort>>();
    }
}
