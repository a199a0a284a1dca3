/// 每日價格推文
pub mod price_report;
