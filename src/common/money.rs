// src/common/money.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Arredonda para 2 casas decimais, meio-para-cima (padrão monetário do sistema).
pub fn quantize2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formata um valor como moeda brasileira: "R$ 1.234,56".
pub fn format_brl(value: Decimal) -> String {
    let v = quantize2(value);
    let negative = v.is_sign_negative() && !v.is_zero();
    let abs = v.abs();

    let int_part = abs.trunc();
    let cents = ((abs - int_part) * Decimal::from(100)).to_i64().unwrap_or(0);

    // Separador de milhar com ponto
    let digits = int_part.to_i64().unwrap_or(0).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let prefix = if negative { "-R$ " } else { "R$ " };
    format!("{}{},{:02}", prefix, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn quantize2_rounds_half_up() {
        assert_eq!(quantize2(dec("2.345")), dec("2.35"));
        assert_eq!(quantize2(dec("2.344")), dec("2.34"));
        assert_eq!(quantize2(dec("-2.345")), dec("-2.35"));
        assert_eq!(quantize2(dec("10")), dec("10"));
    }

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(dec("1234.5")), "R$ 1.234,50");
        assert_eq!(format_brl(dec("1234567.89")), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec("0")), "R$ 0,00");
        assert_eq!(format_brl(dec("7.05")), "R$ 7,05");
    }

    #[test]
    fn format_brl_handles_negatives_and_rounding() {
        assert_eq!(format_brl(dec("-7.05")), "-R$ 7,05");
        assert_eq!(format_brl(dec("0.999")), "R$ 1,00");
        assert_eq!(format_brl(dec("-0.001")), "R$ 0,00");
    }
}
