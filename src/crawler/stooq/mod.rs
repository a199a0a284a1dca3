use anyhow::{anyhow, Result};
use concat_string::concat_string;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    calculation,
    declare::{Commodity, RawQuote, SourceUrl, Unit},
    logging,
    util::{self, text},
};

/// Stooq 歷史日線 CSV
const BASE_URL: &str = "https://stooq.com";

/// 日線
const INTERVAL: &str = "d";

#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Close")]
    close: String,
}

pub fn url(symbol: &str) -> String {
    url_on(BASE_URL, symbol)
}

fn url_on(base_url: &str, symbol: &str) -> String {
    concat_string!(base_url, "/q/d/l/?s=", symbol, "&i=", INTERVAL)
}

/// 取得芝加哥期貨價格並換算成 USD/t
///
/// 每個代號各自處理錯誤，其中一個失敗不影響其他品項。
pub async fn visit() -> Vec<RawQuote> {
    visit_from(BASE_URL).await
}

async fn visit_from(base_url: &str) -> Vec<RawQuote> {
    let mut quotes = Vec::with_capacity(Commodity::FUTURES.len());

    for commodity in Commodity::FUTURES {
        let (Some(symbol), Some(bushels_per_ton)) =
            (commodity.futures_symbol(), commodity.bushels_per_ton())
        else {
            continue;
        };

        let url = url_on(base_url, symbol);
        let quote = match fetch_usd_per_ton(&url, bushels_per_ton).await {
            Ok(value) => RawQuote {
                commodity,
                value: Some(value),
                unit: Unit::UsdPerTon,
                source_url: SourceUrl::ok(url),
            },
            Err(why) => {
                logging::warn_file_async(format!(
                    "Failed to fetch stooq {} because {:?}",
                    symbol, why
                ));
                RawQuote {
                    commodity,
                    value: None,
                    unit: Unit::UsdPerTon,
                    source_url: SourceUrl::failed(url),
                }
            }
        };

        quotes.push(quote);
    }

    quotes
}

async fn fetch_usd_per_ton(url: &str, bushels_per_ton: Decimal) -> Result<Decimal> {
    let body = util::http::get(url, None).await?;
    let close = parse_last_close(&body)?;

    calculation::cents_per_bushel_to_usd_per_ton(close, bushels_per_ton)
        .ok_or_else(|| anyhow!("Failed to convert close {} to USD/t", close))
}

/// Returns the `Close` of the last row of a daily series (cents per bushel).
///
/// The series is ordered oldest first, so the last row is the latest session.
pub fn parse_last_close(body: &str) -> Result<Decimal> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut last: Option<DailyRow> = None;
    for row in reader.deserialize::<DailyRow>() {
        last = Some(row.map_err(|why| anyhow!("Failed to read stooq row because {:?}", why))?);
    }

    let row = last.ok_or_else(|| anyhow!("The stooq series is empty"))?;
    text::parse_decimal(&row.close, None)
        .map_err(|why| anyhow!("Bad close on {}: {:?}", row.date, why))
}
