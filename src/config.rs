use std::time::Duration;
use scraper::Selector;
use crate::errors::{FundsError, Result};
use crate::period::DEFAULT_OFFSET_DAYS;

pub const SOURCE_BASE_URL: &str = "https://www.mygemel.net/";

/// קרנות השתלמות, kept pre-encoded the way the site links it
pub const DEFAULT_SOURCE_URL: &str =
    "https://www.mygemel.net/%D7%A7%D7%A8%D7%A0%D7%95%D7%AA-%D7%94%D7%A9%D7%AA%D7%9C%D7%9E%D7%95%D7%AA";

/// Product types the site publishes a comparison table for
pub const PRODUCT_TYPES: [&str; 5] = [
    "קרנות השתלמות",
    "קופות גמל",
    "קופות גמל להשקעה",
    "פוליסות חיסכון",
    "קרנות פנסיה",
];

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Source URL for a product type; unknown or missing types use the default page
pub fn source_url_for(product_type: Option<&str>) -> String {
    match product_type.map(str::trim) {
        Some(name) if name == PRODUCT_TYPES[0] => DEFAULT_SOURCE_URL.to_string(),
        Some(name) if PRODUCT_TYPES.contains(&name) => {
            format!("{}{}", SOURCE_BASE_URL, name.replace(' ', "-"))
        }
        _ => DEFAULT_SOURCE_URL.to_string(),
    }
}

/// Which cell feeds which fund field.
///
/// Layouts that do not publish a horizon leave it as `None`; the fund then
/// carries an empty string for that return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub current_period: usize,
    pub last_year: Option<usize>,
    pub last_3_years: Option<usize>,
    pub last_5_years: Option<usize>,
}

impl ColumnMap {
    pub fn highest(&self) -> usize {
        [self.last_year, self.last_3_years, self.last_5_years]
            .into_iter()
            .flatten()
            .chain([self.name, self.current_period])
            .max()
            .unwrap_or(0)
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: 0,
            current_period: 1,
            last_year: Some(2),
            last_3_years: Some(3),
            last_5_years: Some(4),
        }
    }
}

/// Shape of the source table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub row_selector: String,
    pub cell_selector: String,
    pub min_columns: usize,
    pub columns: ColumnMap,
}

impl TableSchema {
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_selectors(mut self, row: &str, cell: &str) -> Self {
        self.row_selector = row.to_string();
        self.cell_selector = cell.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        for selector in [&self.row_selector, &self.cell_selector] {
            Selector::parse(selector).map_err(|e| {
                FundsError::ConfigError(format!("Invalid selector '{}': {:?}", selector, e))
            })?;
        }

        if self.columns.highest() >= self.min_columns {
            return Err(FundsError::ConfigError(format!(
                "Column {} is mapped but rows only need {} columns",
                self.columns.highest(),
                self.min_columns
            )));
        }

        Ok(())
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            row_selector: "tr".to_string(),
            cell_selector: "td".to_string(),
            min_columns: 5,
            columns: ColumnMap::default(),
        }
    }
}

pub struct Config {
    pub request_timeout: Duration,
    pub user_agent: String,
    pub cache_ttl: Duration,
    pub offset_days: u32,
    pub schema: TableSchema,
}

impl Config {
    pub fn new() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: Duration::from_secs(600),
            offset_days: DEFAULT_OFFSET_DAYS,
            schema: TableSchema::default(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Zero disables caching
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_offset_days(mut self, days: u32) -> Self {
        self.offset_days = days;
        self
    }

    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = schema;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
