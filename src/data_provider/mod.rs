use crate::config::{self, Config};
use crate::errors::{FundsError, Result};
use crate::models::fund::{Fund, ScrapeResult};
use crate::services::pipeline::Pipeline;
use crate::util::normalize_url;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct CachedScrape {
    result: Arc<ScrapeResult>,
    fetched_at: Instant,
}

// 每个 URL 一个槽位；刷新期间持有槽位锁，同一 URL 同时只有一次抓取
type Slot = Arc<tokio::sync::Mutex<Option<CachedScrape>>>;

/// Substring filters applied to fund names, ignoring case
#[derive(Debug, Clone, Default)]
pub struct FundFilter {
    pub company: Option<String>,
    pub product_type: Option<String>,
}

impl FundFilter {
    pub fn matches(&self, fund: &Fund) -> bool {
        let name = fund.name.to_lowercase();
        [&self.company, &self.product_type]
            .into_iter()
            .flatten()
            .all(|needle| name.contains(&needle.trim().to_lowercase()))
    }
}

/// Fund data provider for a serving layer.
///
/// Scrapes on demand and keeps each result for at most `ttl`. Nothing is
/// fetched until the first request. Expired entries are evicted whenever
/// a new URL is cached, so the cache only holds URLs requested within the
/// last `ttl`.
pub struct FundDataProvider {
    pipeline: Pipeline,
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl FundDataProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let pipeline = Pipeline::from_config(config)?;
        Ok(Self::with_pipeline(pipeline, config.cache_ttl))
    }

    pub fn with_pipeline(pipeline: Pipeline, ttl: Duration) -> Self {
        Self {
            pipeline,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Funds for a product type; unknown or missing types use the default page
    pub async fn funds(&self, product_type: Option<&str>) -> Result<Arc<ScrapeResult>> {
        self.funds_from_url(&config::source_url_for(product_type)).await
    }

    pub async fn funds_from_url(&self, url: &str) -> Result<Arc<ScrapeResult>> {
        if self.ttl.is_zero() {
            return Ok(Arc::new(self.pipeline.run(url).await?));
        }

        let slot = self.slot(url);
        let mut cached = slot.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!("Serving cached funds for {}", url);
                return Ok(Arc::clone(&entry.result));
            }
            info!("Cached funds for {} expired, refreshing", url);
        }

        let result = Arc::new(self.pipeline.run(url).await?);
        *cached = Some(CachedScrape {
            result: Arc::clone(&result),
            fetched_at: Instant::now(),
        });

        Ok(result)
    }

    /// Fund at a 0-based position in the list
    pub async fn fund_by_index(&self, product_type: Option<&str>, index: usize) -> Result<Fund> {
        let result = self.funds(product_type).await?;
        result
            .get(index)
            .cloned()
            .ok_or(FundsError::FundNotFound {
                index,
                total: result.len(),
            })
    }

    /// Funds of the default page whose names match `filter`
    pub async fn filter(&self, filter: &FundFilter) -> Result<Vec<Fund>> {
        let result = self.funds(None).await?;
        Ok(result
            .funds
            .iter()
            .filter(|fund| filter.matches(fund))
            .cloned()
            .collect())
    }

    /// Forget the cached result for a product type
    pub async fn invalidate(&self, product_type: Option<&str>) {
        let slot = self.slot(&config::source_url_for(product_type));
        slot.lock().await.take();
    }

    fn slot(&self, url: &str) -> Slot {
        let key = normalize_url(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());

        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if !slots.contains_key(&key) {
            Self::prune(&mut slots, self.ttl);
        }
        Arc::clone(slots.entry(key).or_default())
    }

    // 清理过期槽位：只移除没有其他持有者、未被锁定且已过期或为空的槽位
    fn prune(slots: &mut HashMap<String, Slot>, ttl: Duration) {
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry
                    .as_ref()
                    .map_or(false, |cached| cached.fetched_at.elapsed() < ttl),
                Err(_) => true,
            }
        });
        if slots.len() < before {
            debug!("Evicted {} expired cache entries", before - slots.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TableSchema, DEFAULT_SOURCE_URL};
    use crate::errors::FetchError;
    use crate::period::{FixedClock, MonthTable, PeriodLabeler};
    use crate::scrapers::base::PageFetcher;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PAGE: &str = r#"<table>
        <tr><th>קרן</th><th>חודש</th><th>שנה</th><th>3 שנים</th><th>5 שנים</th></tr>
        <tr><td>אלטשולר שחם השתלמות כללי</td><td>1.1%</td><td>12%</td><td>25%</td><td>48%</td></tr>
        <tr><td>Meitav Hishtalmut Equity</td><td>0.8%</td><td>14%</td><td>28%</td><td>51%</td></tr>
        <tr><td>MORE Hishtalmut General</td><td>0.5%</td><td>9%</td><td>20%</td><td>39%</td></tr>
    </table>"#;

    struct CountingFetcher {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(PAGE.to_string())
        }
    }

    fn provider(ttl: Duration, delay: Duration) -> (Arc<CountingFetcher>, FundDataProvider) {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            delay,
        });
        let labeler = PeriodLabeler::new(
            Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 10, 17).unwrap())),
            MonthTable::hebrew(),
            60,
        );
        let pipeline = Pipeline::new(fetcher.clone(), labeler, TableSchema::default());
        (fetcher, FundDataProvider::with_pipeline(pipeline, ttl))
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        let (fetcher, provider) = provider(Duration::from_secs(60), Duration::from_millis(50));

        let (a, b, c) = tokio::join!(
            provider.funds(None),
            provider.funds(Some("קרנות השתלמות")),
            provider.funds_from_url(DEFAULT_SOURCE_URL),
        );

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap().len(), 3);
        assert_eq!(b.unwrap().len(), 3);
        assert_eq!(c.unwrap().period_label, "אוגוסט");
    }

    #[tokio::test]
    async fn expired_entries_are_refreshed() {
        let (fetcher, provider) = provider(Duration::from_millis(30), Duration::ZERO);

        provider.funds(None).await.unwrap();
        provider.funds(None).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        provider.funds(None).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_ttl_always_scrapes() {
        let (fetcher, provider) = provider(Duration::ZERO, Duration::ZERO);

        provider.funds(None).await.unwrap();
        provider.funds(None).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn different_products_are_cached_separately() {
        let (fetcher, provider) = provider(Duration::from_secs(60), Duration::ZERO);

        provider.funds(Some("קרנות פנסיה")).await.unwrap();
        provider.funds(Some("קופות גמל")).await.unwrap();
        provider.funds(Some("unknown")).await.unwrap();
        provider.funds(None).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);

        provider.invalidate(Some("קרנות פנסיה")).await;
        provider.funds(Some("קרנות פנסיה")).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn expired_urls_are_evicted_when_new_ones_arrive() {
        let (_, provider) = provider(Duration::from_millis(10), Duration::ZERO);

        for i in 0..200 {
            provider
                .funds_from_url(&format!("https://www.mygemel.net/page-{}", i))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(40)).await;

        provider.funds_from_url("https://www.mygemel.net/fresh").await.unwrap();

        let slots = provider.slots.lock().unwrap();
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key("https://www.mygemel.net/fresh"));
    }

    #[tokio::test]
    async fn fresh_entries_survive_eviction() {
        let (fetcher, provider) = provider(Duration::from_secs(60), Duration::ZERO);

        provider.funds(None).await.unwrap();
        provider.funds(Some("קרנות פנסיה")).await.unwrap();
        provider.funds(None).await.unwrap();

        assert_eq!(provider.slots.lock().unwrap().len(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fund_by_index_is_zero_based() {
        let (_, provider) = provider(Duration::from_secs(60), Duration::ZERO);

        let first = provider.fund_by_index(None, 0).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "אלטשולר שחם השתלמות כללי");

        match provider.fund_by_index(None, 3).await {
            Err(FundsError::FundNotFound { index, total }) => {
                assert_eq!(index, 3);
                assert_eq!(total, 3);
            }
            other => panic!("expected FundNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn filter_matches_names_ignoring_case() {
        let (_, provider) = provider(Duration::from_secs(60), Duration::ZERO);

        let hishtalmut = provider
            .filter(&FundFilter {
                company: None,
                product_type: Some("HISHTALMUT".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(hishtalmut.len(), 2);

        let meitav = provider
            .filter(&FundFilter {
                company: Some("meitav".to_string()),
                product_type: Some("hishtalmut".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(meitav.len(), 1);
        assert_eq!(meitav[0].id, 2);

        let all = provider.filter(&FundFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let hebrew = provider
            .filter(&FundFilter {
                company: Some("אלטשולר".to_string()),
                product_type: None,
            })
            .await
            .unwrap();
        assert_eq!(hebrew.len(), 1);
    }
}
