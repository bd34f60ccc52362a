use crate::config::{Config, TableSchema};
use crate::errors::{PipelineError, Result};
use crate::models::fund::ScrapeResult;
use crate::period::{MonthTable, PeriodLabeler, SystemClock};
use crate::scrapers::base::PageFetcher;
use crate::scrapers::http::HttpFetcher;
use crate::scrapers::normalize::normalize_rows;
use crate::scrapers::table;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

/// 抓取流水线：获取页面 -> 定位表格 -> 规范化行
///
/// Holds no mutable state, so one instance can serve concurrent runs.
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    labeler: PeriodLabeler,
    schema: TableSchema,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, labeler: PeriodLabeler, schema: TableSchema) -> Self {
        Self {
            fetcher,
            labeler,
            schema,
        }
    }

    /// HTTP fetcher and wall clock, Hebrew month names
    pub fn from_config(config: &Config) -> Result<Self> {
        config.schema.validate()?;

        let fetcher = HttpFetcher::new(config)?;
        let labeler = PeriodLabeler::new(
            Arc::new(SystemClock::default()),
            MonthTable::hebrew(),
            config.offset_days,
        );

        Ok(Self::new(Arc::new(fetcher), labeler, config.schema.clone()))
    }

    /// Scrape `url` into a fresh result.
    ///
    /// Fetch and parse failures end the run before any row is normalized.
    pub async fn run(&self, url: &str) -> std::result::Result<ScrapeResult, PipelineError> {
        info!("Scraping funds from {}", url);

        let markup = self.fetcher
            .fetch(url)
            .await
            .map_err(|source| PipelineError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let rows = table::locate(&markup, &self.schema).map_err(|source| PipelineError::Parse {
            url: url.to_string(),
            source,
        })?;
        drop(markup);

        let period_label = self.labeler.current_label();
        let (funds, dropped) = normalize_rows(&rows, &period_label, &self.schema);

        if dropped > 0 {
            debug!(
                "Dropped {} of {} rows with fewer than {} columns",
                dropped,
                rows.len(),
                self.schema.min_columns
            );
        }
        info!("Scraped {} funds from {} (period {})", funds.len(), url, period_label);

        Ok(ScrapeResult {
            source_url: url.to_string(),
            period_label,
            scraped_at: Utc::now(),
            funds,
        })
    }
}
