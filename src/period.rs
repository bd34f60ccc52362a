use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;

/// Default distance back from today to the most recent published month
pub const DEFAULT_OFFSET_DAYS: u32 = 60;

// 英文月份名 -> 希伯来文月份名
const HEBREW_MONTHS: [(&str, &str); 12] = [
    ("January", "ינואר"),
    ("February", "פברואר"),
    ("March", "מרץ"),
    ("April", "אפריל"),
    ("May", "מאי"),
    ("June", "יוני"),
    ("July", "יולי"),
    ("August", "אוגוסט"),
    ("September", "ספטמבר"),
    ("October", "אוקטובר"),
    ("November", "נובמבר"),
    ("December", "דצמבר"),
];

/// Maps English month names to display names.
///
/// Names missing from the table are returned unchanged, so a partial
/// table degrades to English instead of failing.
#[derive(Debug, Clone, Default)]
pub struct MonthTable {
    names: HashMap<String, String>,
}

impl MonthTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn hebrew() -> Self {
        Self::new(HEBREW_MONTHS)
    }

    /// Empty table: every month passes through in English
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translate<'a>(&'a self, english: &'a str) -> &'a str {
        self.names.get(english).map(String::as_str).unwrap_or(english)
    }
}

/// Label for the month `offset_days` before `reference_date`, in Hebrew
pub fn label_for(reference_date: NaiveDate, offset_days: u32) -> String {
    label_with(reference_date, offset_days, &MonthTable::hebrew())
}

pub fn label_with(reference_date: NaiveDate, offset_days: u32, months: &MonthTable) -> String {
    // 超出 chrono 可表示范围时饱和到 NaiveDate::MIN（一月）
    let target = reference_date
        .checked_sub_days(Days::new(u64::from(offset_days)))
        .unwrap_or(NaiveDate::MIN);
    let english = target.format("%B").to_string();
    months.translate(&english).to_string()
}

/// Source of "today"
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, read in the time zone of the source site
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Jerusalem)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Computes the current period label from an injected clock
#[derive(Clone)]
pub struct PeriodLabeler {
    clock: Arc<dyn Clock>,
    months: MonthTable,
    offset_days: u32,
}

impl PeriodLabeler {
    pub fn new(clock: Arc<dyn Clock>, months: MonthTable, offset_days: u32) -> Self {
        Self {
            clock,
            months,
            offset_days,
        }
    }

    pub fn current_label(&self) -> String {
        label_with(self.clock.today(), self.offset_days, &self.months)
    }
}

impl Default for PeriodLabeler {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemClock::default()),
            MonthTable::hebrew(),
            DEFAULT_OFFSET_DAYS,
        )
    }
}
