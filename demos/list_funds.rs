use gemel_funds::config::{Config, PRODUCT_TYPES};
use gemel_funds::data_provider::FundDataProvider;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // 创建数据提供者
    let provider = FundDataProvider::new(&Config::new())?;

    for product in PRODUCT_TYPES {
        let result = provider
            .funds(Some(product))
            .await
            .with_context(|| format!("failed to scrape {}", product))?;

        println!("\n{} ({} funds, period {})", product, result.len(), result.period_label);
        println!("{:-<80}", "");
        println!("{:<4} {:<40} {:<16} {:<8} {:<8} {:<8}", "#", "Name", "Month", "1Y", "3Y", "5Y");

        for fund in result.funds.iter().take(5) {
            println!(
                "{:<4} {:<40} {:<16} {:<8} {:<8} {:<8}",
                fund.id, fund.name, fund.month_performance, fund.last_year, fund.last_3_years, fund.last_5_years
            );
        }

        if result.len() > 5 {
            println!("... and {} more", result.len() - 5);
        }
    }

    Ok(())
}
