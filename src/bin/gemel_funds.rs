use gemel_funds::config::{Config, PRODUCT_TYPES};
use gemel_funds::data_provider::{FundDataProvider, FundFilter};
use gemel_funds::period::{label_for, SystemClock, Clock, DEFAULT_OFFSET_DAYS};

use anyhow::Context;
use clap::{App, Arg, SubCommand};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::time::Duration;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>, name: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value.with_context(|| format!("missing --{}", name))?;
    raw.parse::<T>()
        .with_context(|| format!("--{} expects a number, got '{}'", name, raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let product_help = format!("Product type, one of: {}", PRODUCT_TYPES.join(", "));
    let default_offset = DEFAULT_OFFSET_DAYS.to_string();

    let app = App::new("GemelFunds")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scrape fund returns from mygemel.net")
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("HTTP request timeout")
                .takes_value(true)
                .global(true)
                .default_value("30"),
        )
        .arg(
            Arg::with_name("cache-ttl")
                .long("cache-ttl")
                .value_name("SECONDS")
                .help("How long a scrape is reused within this process (0 disables)")
                .takes_value(true)
                .global(true)
                .default_value("600"),
        );

    let app = app.subcommand(
        SubCommand::with_name("scrape")
            .about("Scrape the fund table of a product page")
            .arg(
                Arg::with_name("product")
                    .short('p')
                    .long("product")
                    .value_name("PRODUCT")
                    .help(product_help.as_str())
                    .takes_value(true)
                    .conflicts_with("url"),
            )
            .arg(
                Arg::with_name("url")
                    .short('u')
                    .long("url")
                    .value_name("URL")
                    .help("Scrape an arbitrary page instead of a known product")
                    .takes_value(true),
            ),
    ).subcommand(
        SubCommand::with_name("show")
            .about("Show one fund by its position in the list")
            .arg(
                Arg::with_name("index")
                    .short('i')
                    .long("index")
                    .value_name("INDEX")
                    .help("0-based position")
                    .required(true)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("product")
                    .short('p')
                    .long("product")
                    .value_name("PRODUCT")
                    .help(product_help.as_str())
                    .takes_value(true),
            ),
    ).subcommand(
        SubCommand::with_name("filter")
            .about("Filter funds by name, ignoring case")
            .arg(
                Arg::with_name("company")
                    .short('c')
                    .long("company")
                    .value_name("COMPANY")
                    .help("Substring of the fund name")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("product-type")
                    .short('t')
                    .long("product-type")
                    .value_name("TEXT")
                    .help("Another substring of the fund name")
                    .takes_value(true),
            ),
    ).subcommand(
        SubCommand::with_name("label")
            .about("Print the period label without scraping")
            .arg(
                Arg::with_name("date")
                    .short('d')
                    .long("date")
                    .value_name("DATE")
                    .help("Reference date (YYYY-MM-DD), defaults to today")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("offset-days")
                    .long("offset-days")
                    .value_name("DAYS")
                    .help("Days to go back from the reference date")
                    .takes_value(true)
                    .default_value(&default_offset),
            ),
    );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("label") {
        let date = match matches.value_of("date") {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid --date '{}'", s))?,
            None => SystemClock::default().today(),
        };
        let offset = parse_number::<u32>(matches.value_of("offset-days"), "offset-days")?;

        println!("{}", label_for(date, offset));
        return Ok(());
    }

    let timeout = parse_number::<u64>(matches.value_of("timeout"), "timeout")?;
    let cache_ttl = parse_number::<u64>(matches.value_of("cache-ttl"), "cache-ttl")?;

    let config = Config::new()
        .with_request_timeout(Duration::from_secs(timeout))
        .with_cache_ttl(Duration::from_secs(cache_ttl));
    let provider = FundDataProvider::new(&config).context("failed to set up the scraper")?;

    if let Some(matches) = matches.subcommand_matches("scrape") {
        let result = match matches.value_of("url") {
            Some(url) => provider.funds_from_url(url).await?,
            None => provider.funds(matches.value_of("product")).await?,
        };
        info!("Found {} funds at {}", result.len(), result.source_url);
        print_json(result.as_ref())?;
    } else if let Some(matches) = matches.subcommand_matches("show") {
        let index = parse_number::<usize>(matches.value_of("index"), "index")?;
        let fund = provider.fund_by_index(matches.value_of("product"), index).await?;
        print_json(&fund)?;
    } else if let Some(matches) = matches.subcommand_matches("filter") {
        let filter = FundFilter {
            company: matches.value_of("company").map(str::to_string),
            product_type: matches.value_of("product-type").map(str::to_string),
        };
        let funds = provider.filter(&filter).await?;
        info!("Filtered to {} funds", funds.len());
        print_json(&funds)?;
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
