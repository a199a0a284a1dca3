use anyhow::{anyhow, Result};
use scraper::{ElementRef, Selector};

/// Parses a CSS selector, turning the selector error into an `anyhow::Error`.
pub fn selector(css_selector: &str) -> Result<Selector> {
    Selector::parse(css_selector)
        .map_err(|why| anyhow!("Failed to Selector::parse({}) because: {:?}", css_selector, why))
}

/// Collects the trimmed text of every cell matched by `cell_selector` inside a row.
///
/// # Example
///
/// ```ignore
/// let html = Html::parse_fragment("<table><tr><td> Soja </td><td>$ 1,00</td></tr></table>");
/// let row = html.select(&selector("tr")?).next().unwrap();
/// assert_eq!(cells_text(&row, &selector("td")?), vec!["Soja", "$ 1,00"]);
/// ```
pub fn cells_text(row: &ElementRef, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}
