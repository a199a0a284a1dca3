use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::{
    crawler::{dolarapi, MarketSnapshot},
    declare::{find_value, Commodity, DerivedQuote, SourceUrl},
    util::datetime,
};

pub mod number;

/// 推文上限（Unicode code points）
pub const MAX_CHARS: usize = 280;
const ELLIPSIS: char = '…';

const HEADER: &str = "📊 Precios 🇦🇷 y Chicago";
const SEPARATOR: &str = "—";
const HASHTAGS: &str = "#Agro #Granos";
/// 所有匯率都抓不到時顯示 sin datos
const NO_DATA: &str = "S/D";

/// 要發佈的訊息與其資料來源
#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    pub text: String,
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sources {
    /// BCR
    pub domestic: SourceUrl,
    /// CBOT，每個品項一個網址
    pub futures: Vec<(Commodity, SourceUrl)>,
    /// TC，每種匯率一個網址
    pub dollars: Vec<(String, SourceUrl)>,
}

impl Sources {
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        Sources {
            domestic: snapshot.domestic.source.clone(),
            futures: snapshot
                .futures
                .iter()
                .map(|quote| (quote.commodity, quote.source_url.clone()))
                .collect(),
            dollars: snapshot
                .dollars
                .iter()
                .map(|rate| (rate.kind.clone(), rate.source_url.clone()))
                .collect(),
        }
    }

    /// 每個來源一行，供 console 稽核
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.futures.len() + self.dollars.len());
        lines.push(format!("BCR : {}", self.domestic));
        for (commodity, url) in &self.futures {
            lines.push(format!("CBOT {} : {}", commodity.as_ref(), url));
        }
        for (kind, url) in &self.dollars {
            lines.push(format!("TC {} : {}", kind, url));
        }
        lines
    }
}

/// Builds the tweet for one run.
///
/// The date is passed in so the same inputs always produce the same text.
pub fn compose(snapshot: &MarketSnapshot, derived: &[DerivedQuote], date: NaiveDate) -> Tweet {
    let body = body(snapshot, derived, date);

    Tweet {
        text: fit_to_budget(&body, HASHTAGS),
        sources: Sources::from_snapshot(snapshot),
    }
}

/// Everything except the trailing hashtags.
fn body(snapshot: &MarketSnapshot, derived: &[DerivedQuote], date: NaiveDate) -> String {
    let mut msg = String::with_capacity(MAX_CHARS * 2);

    let _ = writeln!(msg, "{}", HEADER);
    let _ = writeln!(msg, "• {}", domestic_line(snapshot, derived));
    let _ = writeln!(msg, "{}", SEPARATOR);
    let _ = writeln!(msg, "CBOT (USD/t): {}", futures_line(snapshot));
    let _ = writeln!(msg, "TC: {}", dollar_line(snapshot));
    let _ = write!(msg, "({})", datetime::day_month_year(date));

    msg
}

fn domestic_line(snapshot: &MarketSnapshot, derived: &[DerivedQuote]) -> String {
    Commodity::DOMESTIC_ORDER
        .iter()
        .map(|commodity| {
            let gross = derived
                .iter()
                .find(|d| d.commodity == *commodity)
                .and_then(|d| d.gross_value);
            format!(
                "{}: {} (sin ret {})",
                commodity.label(),
                number::format_peso(snapshot.domestic.value(*commodity)),
                number::format_peso(gross)
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn futures_line(snapshot: &MarketSnapshot) -> String {
    Commodity::FUTURES
        .iter()
        .map(|commodity| {
            format!(
                "{}: {}",
                commodity.label(),
                number::format_usd(find_value(&snapshot.futures, *commodity))
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// 抓不到的匯率不顯示；全部都抓不到就只顯示 S/D
fn dollar_line(snapshot: &MarketSnapshot) -> String {
    let rates: Vec<String> = snapshot
        .dollars
        .iter()
        .filter_map(|rate| {
            rate.value.map(|value| {
                format!(
                    "{}: {}",
                    dolarapi::label(&rate.kind),
                    number::format_rate(Some(value))
                )
            })
        })
        .collect();

    if rates.is_empty() {
        NO_DATA.to_string()
    } else {
        rates.join(" | ")
    }
}

/// Enforces the [`MAX_CHARS`] budget in two deterministic steps.
///
/// 1. `body + " " + suffix` when it fits;
/// 2. otherwise `body` alone when it fits;
/// 3. otherwise the first `MAX_CHARS - 1` code points of `body` followed by `…`.
pub fn fit_to_budget(body: &str, suffix: &str) -> String {
    let body_chars = body.chars().count();

    if !suffix.is_empty() && body_chars + 1 + suffix.chars().count() <= MAX_CHARS {
        return format!("{} {}", body, suffix);
    }

    if body_chars <= MAX_CHARS {
        return body.to_string();
    }

    let mut truncated: String = body.chars().take(MAX_CHARS - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}
