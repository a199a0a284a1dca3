use std::collections::HashMap;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use scraper::Html;

use crate::{
    declare::{Commodity, DomesticBoard, RawQuote, SourceUrl, Unit},
    logging,
    util::{self, http::element, text},
};

/// 羅薩里奧證券交易所 Bolsa de Comercio de Rosario
pub const HOST: &str = "www.bcr.com.ar";
const BASE_URL: &str = "https://www.bcr.com.ar";

const PATH: &str = "/es/mercados/mercado-de-granos/cotizaciones/cotizaciones-locales-0";

pub fn url() -> String {
    url_on(BASE_URL)
}

fn url_on(base_url: &str) -> String {
    format!("{}{}", base_url, PATH)
}

/// 取得國內穀物價格（ARS/t）
///
/// 任何錯誤只記 warn，四個品項都回傳缺值，不中斷整個流程。
pub async fn visit() -> DomesticBoard {
    visit_from(BASE_URL).await
}

async fn visit_from(base_url: &str) -> DomesticBoard {
    let url = url_on(base_url);

    match fetch(&url).await {
        Ok(prices) => board_from(prices, &url),
        Err(why) => {
            logging::warn_file_async(format!("Failed to fetch bcr prices because {:?}", why));
            DomesticBoard::absent(&url)
        }
    }
}

async fn fetch(url: &str) -> Result<HashMap<Commodity, Decimal>> {
    let text = util::http::get(url, None).await?;
    parse_prices(&text)
}

fn board_from(prices: HashMap<Commodity, Decimal>, url: &str) -> DomesticBoard {
    let source = SourceUrl::ok(url);
    DomesticBoard {
        quotes: Commodity::DOMESTIC_ORDER
            .iter()
            .map(|commodity| RawQuote {
                commodity: *commodity,
                value: prices.get(commodity).copied(),
                unit: Unit::ArsPerTon,
                source_url: source.clone(),
            })
            .collect(),
        source,
    }
}

/// Extracts commodity prices from the quotes page.
///
/// Each `<tr>` with at least two `<td>` cells is read as (label, price).
/// Rows whose label names no known commodity, or whose price does not parse
/// or is not positive, are skipped. When several rows name the same
/// commodity the first one wins.
///
/// Fails only when the document holds no data rows at all.
pub fn parse_prices(html: &str) -> Result<HashMap<Commodity, Decimal>> {
    let document = Html::parse_document(html);
    let row_selector = element::selector("tr")?;
    let cell_selector = element::selector("td")?;

    let mut prices = HashMap::with_capacity(4);
    let mut data_rows = 0;

    for row in document.select(&row_selector) {
        let cells = element::cells_text(&row, &cell_selector);
        if cells.len() < 2 {
            continue;
        }
        data_rows += 1;

        let Some(commodity) = Commodity::from_row_label(&cells[0]) else {
            continue;
        };

        if prices.contains_key(&commodity) {
            continue;
        }

        match text::parse_latin_decimal(&cells[1]) {
            Ok(price) if price > Decimal::ZERO => {
                prices.insert(commodity, price);
            }
            Ok(_) => {}
            Err(why) => {
                logging::debug_file_async(format!("skip bcr row {:?} because {:?}", cells, why));
            }
        }
    }

    if data_rows == 0 {
        return Err(anyhow!("No price table rows found on {}", HOST));
    }

    Ok(prices)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="cotizaciones">
          <thead><tr><th>Producto</th><th>Precio</th></tr></thead>
          <tbody>
            <tr><td>Trigo</td><td>$ 198.500,00</td></tr>
            <tr><td>Maíz</td><td>$&nbsp;185.000,00</td></tr>
            <tr><td>Girasol</td><td>S/C</td></tr>
            <tr><td>Soja</td><td>$ 281.300,00</td></tr>
            <tr><td>Sorgo</td><td>$ 170.000,00</td></tr>
            <tr><td>Soja</td><td>$ 290.000,00</td></tr>
            <tr><td>Girasol</td><td>$ 0,00</td></tr>
            <tr><td>solo una celda</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_prices() {
        let prices = parse_prices(PAGE).unwrap();

        assert_eq!(prices.get(&Commodity::Soy), Some(&dec!(281300)));
        assert_eq!(prices.get(&Commodity::Corn), Some(&dec!(185000)));
        assert_eq!(prices.get(&Commodity::Wheat), Some(&dec!(198500)));
        assert_eq!(prices.get(&Commodity::Sunflower), None);
    }

    #[test]
    fn test_parse_prices_first_row_wins() {
        let html = "<table><tr><td>Maiz</td><td>100.000</td></tr>\
                    <tr><td>MAÍZ (Cámara)</td><td>120.000</td></tr></table>";
        let prices = parse_prices(html).unwrap();
        assert_eq!(prices.get(&Commodity::Corn), Some(&dec!(100000)));
    }

    #[test]
    fn test_parse_prices_without_table() {
        assert!(parse_prices("<html><body><p>En mantenimiento</p></body></html>").is_err());
        assert!(parse_prices("").is_err());
    }

    #[test]
    fn test_board_from_keeps_display_order() {
        let prices = parse_prices(PAGE).unwrap();
        let board = board_from(prices, &url());

        let order: Vec<Commodity> = board.quotes.iter().map(|q| q.commodity).collect();
        assert_eq!(order, Commodity::DOMESTIC_ORDER.to_vec());
        assert!(!board.source.failed);
        assert_eq!(board.value(Commodity::Sunflower), None);
        assert!(board.quotes.iter().all(|q| q.unit == Unit::ArsPerTon));
    }

    #[tokio::test]
    async fn test_visit_unreachable_host() {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let board = visit_from("http://127.0.0.1:1").await;

        assert_eq!(board, DomesticBoard::absent(&url_on("http://127.0.0.1:1")));
        assert!(board.source.failed);
        assert_eq!(board.quotes.len(), 4);
        for quote in &board.quotes {
            assert_eq!(quote.value, None);
            assert!(quote.source_url.failed);
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_visit() {
        dotenv::dotenv().ok();
        let _ = rustls::crypto::ring::default_provider().install_default();
        logging::debug_file_async("開始 bcr::visit");

        let board = visit().await;
        dbg!(&board);
        logging::debug_file_async(format!("bcr board: {:?}", board));

        logging::debug_file_async("結束 bcr::visit");
    }
}
