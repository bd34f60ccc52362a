// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod period;
pub mod config;
pub mod services;

// 页面抓取和解析的内部实现，测试和命令行工具也会直接使用
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::fund::{Fund, RawRow, ScrapeResult};
pub use data_provider::{FundDataProvider, FundFilter};
pub use services::pipeline::Pipeline;
pub use period::{label_for, DEFAULT_OFFSET_DAYS};
pub use config::Config;
pub use errors::{FetchError, FundsError, ParseError, PipelineError, Result};
