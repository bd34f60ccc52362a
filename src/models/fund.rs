use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cell texts of one table row, in document order
pub type RawRow = Vec<String>;

/// One fund as shown in the source table.
///
/// Returns are kept as the site renders them; the localized percentage
/// strings are not consistent enough to parse into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// 1-based position among the retained rows of one scrape
    pub id: u32,
    pub name: String,
    /// Most recent period, prefixed with its label, e.g. `"אוגוסט: 1.2%"`
    pub month_performance: String,
    pub last_year: String,
    pub last_3_years: String,
    pub last_5_years: String,
}

/// Output of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub source_url: String,
    pub period_label: String,
    pub scraped_at: DateTime<Utc>,
    pub funds: Vec<Fund>,
}

impl ScrapeResult {
    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    /// Fund at a 0-based position
    pub fn get(&self, index: usize) -> Option<&Fund> {
        self.funds.get(index)
    }
}
