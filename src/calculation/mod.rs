use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::{
    config::Retention,
    declare::{DerivedQuote, RawQuote},
};

/// 全部金額共用同一種進位方式：四捨五入（.5 遠離零）
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// 披索取到整數
pub const PESO_DECIMALS: u32 = 0;
/// 美元取到小數第二位
pub const DOLLAR_DECIMALS: u32 = 2;

/// Recovers the pre-tax price from a price net of withholding tax:
/// `round(value / (1 - tax_rate))` to whole pesos.
///
/// Returns `None` instead of failing when the value is missing or not
/// positive, when the rate is outside `[0, 1)`, or when the arithmetic
/// overflows.
pub fn gross_up(value: Option<Decimal>, tax_rate: Decimal) -> Option<Decimal> {
    let value = value.filter(|v| v.is_sign_positive() && !v.is_zero())?;

    if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
        return None;
    }

    let net_share = Decimal::ONE.checked_sub(tax_rate)?;
    value
        .checked_div(net_share)
        .map(|gross| gross.round_dp_with_strategy(PESO_DECIMALS, ROUNDING))
}

/// Converts a CBOT close in US cents per bushel to US dollars per metric ton,
/// rounded to cents.
pub fn cents_per_bushel_to_usd_per_ton(
    cents_per_bushel: Decimal,
    bushels_per_ton: Decimal,
) -> Option<Decimal> {
    if !cents_per_bushel.is_sign_positive() || cents_per_bushel.is_zero() {
        return None;
    }

    cents_per_bushel
        .checked_div(dec!(100))?
        .checked_mul(bushels_per_ton)
        .map(|usd| usd.round_dp_with_strategy(DOLLAR_DECIMALS, ROUNDING))
}

/// 每個國內報價都算出還原出口稅後的價格
pub fn derive_all(quotes: &[RawQuote], retention: &Retention) -> Vec<DerivedQuote> {
    quotes
        .iter()
        .map(|quote| DerivedQuote {
            commodity: quote.commodity,
            gross_value: gross_up(quote.value, retention.rate(quote.commodity)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::declare::{Commodity, DomesticBoard, SourceUrl, Unit};

    use super::*;

    #[test]
    fn test_gross_up() {
        assert_eq!(gross_up(Some(dec!(281300)), dec!(0.33)), Some(dec!(419851)));
        assert_eq!(gross_up(Some(dec!(100)), dec!(0)), Some(dec!(100)));
        assert_eq!(gross_up(Some(dec!(88)), dec!(0.12)), Some(dec!(100)));
    }

    #[test]
    fn test_gross_up_rounds_half_away_from_zero() {
        // 150 / 0.6 = 250；5 / 0.4 = 12.5 → 13
        assert_eq!(gross_up(Some(dec!(150)), dec!(0.4)), Some(dec!(250)));
        assert_eq!(gross_up(Some(dec!(5)), dec!(0.6)), Some(dec!(13)));
    }

    #[test]
    fn test_gross_up_degrades_to_absent() {
        assert_eq!(gross_up(None, dec!(0.33)), None);
        assert_eq!(gross_up(Some(dec!(1000)), dec!(1)), None);
        assert_eq!(gross_up(Some(dec!(1000)), dec!(1.2)), None);
        assert_eq!(gross_up(Some(dec!(1000)), dec!(-0.1)), None);
        assert_eq!(gross_up(Some(dec!(-1000)), dec!(0.1)), None);
        assert_eq!(gross_up(Some(dec!(0)), dec!(0.1)), None);
        assert_eq!(gross_up(Some(Decimal::MAX), dec!(0.5)), None);
    }

    #[test]
    fn test_gross_up_matches_formula_for_rates() {
        let value = dec!(123457);
        for step in 0..100 {
            let rate = Decimal::new(step, 2);
            let expected = (value / (Decimal::ONE - rate)).round_dp_with_strategy(0, ROUNDING);
            assert_eq!(gross_up(Some(value), rate), Some(expected), "rate {}", rate);
        }
    }

    #[test]
    fn test_cents_per_bushel_to_usd_per_ton() {
        // 1098.25 ¢/bu → 10.9825 USD/bu × 36.74 = 403.49705
        assert_eq!(
            cents_per_bushel_to_usd_per_ton(dec!(1098.25), dec!(36.74)),
            Some(dec!(403.50))
        );
        assert_eq!(
            cents_per_bushel_to_usd_per_ton(dec!(450), dec!(39.37)),
            Some(dec!(177.17))
        );
        assert_eq!(cents_per_bushel_to_usd_per_ton(dec!(0), dec!(39.37)), None);
        assert_eq!(cents_per_bushel_to_usd_per_ton(dec!(-5), dec!(39.37)), None);
    }

    #[test]
    fn test_derive_all() {
        let mut board = DomesticBoard::absent("https://bcr");
        board.quotes[0] = RawQuote {
            commodity: Commodity::Soy,
            value: Some(dec!(281300)),
            unit: Unit::ArsPerTon,
            source_url: SourceUrl::ok("https://bcr"),
        };

        let derived = derive_all(&board.quotes, &Retention::default());
        assert_eq!(derived.len(), 4);
        assert_eq!(derived[0].commodity, Commodity::Soy);
        assert_eq!(derived[0].gross_value, Some(dec!(419851)));
        assert!(derived[1..].iter().all(|d| d.gross_value.is_none()));
    }
}
