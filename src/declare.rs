use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};

/// 穀物
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, AsRefStr)]
pub enum Commodity {
    /// 黃豆 soja
    #[strum(serialize = "soja")]
    Soy,
    /// 玉米 maíz
    #[strum(serialize = "maiz")]
    Corn,
    /// 小麥 trigo
    #[strum(serialize = "trigo")]
    Wheat,
    /// 葵花籽 girasol
    #[strum(serialize = "girasol")]
    Sunflower,
}

impl Commodity {
    /// 國內報價行的顯示順序
    pub const DOMESTIC_ORDER: [Commodity; 4] = [
        Commodity::Soy,
        Commodity::Corn,
        Commodity::Sunflower,
        Commodity::Wheat,
    ];

    /// 有芝加哥期貨的品項
    pub const FUTURES: [Commodity; 3] = [Commodity::Soy, Commodity::Corn, Commodity::Wheat];

    pub fn label(&self) -> &'static str {
        match self {
            Commodity::Soy => "Soja",
            Commodity::Corn => "Maíz",
            Commodity::Wheat => "Trigo",
            Commodity::Sunflower => "Girasol",
        }
    }

    /// Lower-case names a price-table row label may contain.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Commodity::Soy => &["soja"],
            Commodity::Corn => &["maíz", "maiz"],
            Commodity::Wheat => &["trigo"],
            Commodity::Sunflower => &["girasol"],
        }
    }

    /// Maps a table row label to a commodity by case-insensitive substring match.
    ///
    /// Commodities are tried in the order soy, corn, wheat, sunflower, so a label
    /// mentioning two of them resolves to the first one in that order.
    pub fn from_row_label(label: &str) -> Option<Commodity> {
        let label = label.to_lowercase();
        Commodity::iter()
            .find(|commodity| commodity.aliases().iter().any(|alias| label.contains(alias)))
    }

    /// Stooq 的連續期貨代號
    pub fn futures_symbol(&self) -> Option<&'static str> {
        match self {
            Commodity::Soy => Some("zs.f"),
            Commodity::Corn => Some("zc.f"),
            Commodity::Wheat => Some("zw.f"),
            Commodity::Sunflower => None,
        }
    }

    /// Bushels per metric ton, the domain convention for each CBOT contract.
    pub fn bushels_per_ton(&self) -> Option<Decimal> {
        match self {
            Commodity::Soy => Some(dec!(36.74)),
            Commodity::Corn => Some(dec!(39.37)),
            Commodity::Wheat => Some(dec!(36.74)),
            Commodity::Sunflower => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Unit {
    /// 阿根廷披索 / 公噸
    ArsPerTon,
    /// 美元 / 公噸
    UsdPerTon,
}

/// 資料來源網址，抓取失敗時仍保留網址以便追查
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    pub url: String,
    pub failed: bool,
}

impl SourceUrl {
    pub fn ok(url: impl Into<String>) -> Self {
        SourceUrl {
            url: url.into(),
            failed: false,
        }
    }

    pub fn failed(url: impl Into<String>) -> Self {
        SourceUrl {
            url: url.into(),
            failed: true,
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed {
            write!(f, "{} (error)", self.url)
        } else {
            f.write_str(&self.url)
        }
    }
}

/// 單一品項的原始報價，`value` 為 `None` 代表這次抓不到（不是零）
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub commodity: Commodity,
    pub value: Option<Decimal>,
    pub unit: Unit,
    pub source_url: SourceUrl,
}

/// 國內價格表的抓取結果
#[derive(Debug, Clone, PartialEq)]
pub struct DomesticBoard {
    pub quotes: Vec<RawQuote>,
    pub source: SourceUrl,
}

impl DomesticBoard {
    /// 整個來源失敗時，四個品項都是缺值
    pub fn absent(url: &str) -> Self {
        let source = SourceUrl::failed(url);
        DomesticBoard {
            quotes: Commodity::DOMESTIC_ORDER
                .iter()
                .map(|commodity| RawQuote {
                    commodity: *commodity,
                    value: None,
                    unit: Unit::ArsPerTon,
                    source_url: source.clone(),
                })
                .collect(),
            source,
        }
    }

    pub fn value(&self, commodity: Commodity) -> Option<Decimal> {
        find_value(&self.quotes, commodity)
    }
}

pub fn find_value(quotes: &[RawQuote], commodity: Commodity) -> Option<Decimal> {
    quotes
        .iter()
        .find(|quote| quote.commodity == commodity)
        .and_then(|quote| quote.value)
}

/// 匯率
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    /// 例如 "oficial"、"mep"
    pub kind: String,
    pub value: Option<Decimal>,
    pub source_url: SourceUrl,
}

/// 還原出口稅（retenciones）後的價格
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DerivedQuote {
    pub commodity: Commodity,
    pub gross_value: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row_label() {
        assert_eq!(Commodity::from_row_label("Soja"), Some(Commodity::Soy));
        assert_eq!(Commodity::from_row_label("MAÍZ"), Some(Commodity::Corn));
        assert_eq!(Commodity::from_row_label("Maiz duro"), Some(Commodity::Corn));
        assert_eq!(Commodity::from_row_label("Trigo pan"), Some(Commodity::Wheat));
        assert_eq!(Commodity::from_row_label("Girasol"), Some(Commodity::Sunflower));
        assert_eq!(Commodity::from_row_label("Sorgo"), None);
        assert_eq!(Commodity::from_row_label("Soja / Trigo"), Some(Commodity::Soy));
    }

    #[test]
    fn test_futures_metadata() {
        for commodity in Commodity::iter() {
            assert_eq!(
                commodity.futures_symbol().is_some(),
                commodity.bushels_per_ton().is_some(),
                "{:?}",
                commodity
            );
        }
        assert_eq!(Commodity::Corn.bushels_per_ton(), Some(dec!(39.37)));
        assert_eq!(Commodity::Corn.as_ref(), "maiz");
    }

    #[test]
    fn test_source_url_display() {
        assert_eq!(SourceUrl::ok("https://a").to_string(), "https://a");
        assert_eq!(SourceUrl::failed("https://a").to_string(), "https://a (error)");
    }

    #[test]
    fn test_absent_board() {
        let board = DomesticBoard::absent("https://bcr");
        assert_eq!(board.quotes.len(), 4);
        assert!(board.source.failed);
        assert!(Commodity::iter().all(|c| board.value(c).is_none()));
    }
}
