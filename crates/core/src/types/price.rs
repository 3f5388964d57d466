//! Money helpers using decimal arithmetic.
//!
//! All amounts are Brazilian reais held as [`Decimal`]. Derived amounts are
//! rounded to centavos with [`round_money`] and displayed with [`format_brl`].

use rust_decimal::{Decimal, RoundingStrategy};

/// ISO 4217 code of the only currency the marketplace sells in.
pub const CURRENCY_CODE: &str = "BRL";

/// Round an amount to two decimal places, half away from zero, keeping a
/// scale of exactly two so it serializes as e.g. `"15.00"`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Format an amount in the pt-BR convention: `R$ 1.234,56`.
///
/// Negative amounts get a leading minus (`-R$ 10,00`).
///
/// ```
/// use rust_decimal::Decimal;
/// use artesania_core::format_brl;
///
/// assert_eq!(format_brl(Decimal::new(123_456, 2)), "R$ 1.234,56");
/// assert_eq!(format_brl(Decimal::new(-5, 0)), "-R$ 5,00");
/// ```
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let plain = round_money(rounded.abs()).to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    format!("{sign}R$ {},{fraction}", group_thousands(integer))
}

/// Insert `.` between groups of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_small_amounts() {
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
        assert_eq!(format_brl(Decimal::new(5, 1)), "R$ 0,50");
        assert_eq!(format_brl(Decimal::new(999, 0)), "R$ 999,00");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_brl(Decimal::new(1_000, 0)), "R$ 1.000,00");
        assert_eq!(format_brl(Decimal::new(123_456_789, 2)), "R$ 1.234.567,89");
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format_brl(Decimal::new(10_005, 3)), "R$ 10,01");
        assert_eq!(format_brl(Decimal::new(-10_005, 3)), "-R$ 10,01");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_brl(Decimal::new(-1, 3)), "R$ 0,00");
    }

    #[test]
    fn test_round_money_keeps_two_places() {
        assert_eq!(round_money(Decimal::new(15, 0)).to_string(), "15.00");
        assert_eq!(round_money(Decimal::new(1_995, 3)).to_string(), "2.00");
    }
}
