use anyhow::{anyhow, Result};
use concat_string::concat_string;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    declare::{ExchangeRate, SourceUrl},
    logging,
    util::{self, text},
};

/// DolarApi 阿根廷匯率
const BASE_URL: &str = "https://dolarapi.com";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    /// 買價
    #[serde(default)]
    compra: Option<Decimal>,
    /// 賣價
    #[serde(default)]
    venta: Option<Decimal>,
}

impl ApiResponse {
    /// 優先用賣價，沒有才用買價
    fn price(&self) -> Option<Decimal> {
        let positive = |v: &Decimal| v > &Decimal::ZERO;
        self.venta
            .filter(positive)
            .or_else(|| self.compra.filter(positive))
    }
}

pub fn url(kind: &str) -> String {
    url_on(BASE_URL, kind)
}

fn url_on(base_url: &str, kind: &str) -> String {
    concat_string!(base_url, "/v1/dolares/", kind)
}

/// 取得指定種類的匯率，失敗時數值為缺值但仍回傳嘗試過的網址
pub async fn visit(kind: &str) -> ExchangeRate {
    visit_from(BASE_URL, kind).await
}

async fn visit_from(base_url: &str, kind: &str) -> ExchangeRate {
    let url = url_on(base_url, kind);

    match fetch(&url).await {
        Ok(value) => ExchangeRate {
            kind: kind.to_string(),
            value: Some(value),
            source_url: SourceUrl::ok(url),
        },
        Err(why) => {
            logging::warn_file_async(format!(
                "Failed to fetch dolar {} because {:?}",
                kind, why
            ));
            ExchangeRate {
                kind: kind.to_string(),
                value: None,
                source_url: SourceUrl::failed(url),
            }
        }
    }
}

async fn fetch(url: &str) -> Result<Decimal> {
    let body = util::http::get(url, None).await?;
    parse_price(&body)
}

pub fn parse_price(body: &str) -> Result<Decimal> {
    let res = serde_json::from_str::<ApiResponse>(body)
        .map_err(|why| anyhow!("Error parsing response JSON({}): {:?}", body, why))?;

    res.price()
        .ok_or_else(|| anyhow!("Neither venta nor compra in {}", body))
}

/// 匯率在訊息中的顯示名稱
pub fn label(kind: &str) -> String {
    match kind {
        "oficial" => "Oficial".to_string(),
        "mep" | "bolsa" => "MEP".to_string(),
        "blue" => "Blue".to_string(),
        "contadoconliqui" | "ccl" => "CCL".to_string(),
        "mayorista" => "Mayorista".to_string(),
        "cripto" => "Cripto".to_string(),
        "tarjeta" => "Tarjeta".to_string(),
        other => text::capitalize(other),
    }
}
