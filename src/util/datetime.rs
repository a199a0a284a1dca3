use chrono::{Local, NaiveDate};

/// 以程式所在時區取得今天的日期
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a date as day/month/year, e.g. `18/10/2026`.
pub fn day_month_year(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
