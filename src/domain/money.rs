//! Money is carried as integer cents (`i64`) end to end: database columns,
//! API payloads and every calculation. Only messages format it as reais.

/// Cents in one currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

/// `percent`% of `amount`, rounded half away from zero to the nearest cent.
pub fn percent_of(amount: i64, percent: i64) -> i64 {
    let raw = amount * percent;
    let half = 50 * raw.signum();
    (raw + half) / 100
}

/// Whole currency units in `cents`, truncated toward zero.
pub fn whole_units(cents: i64) -> i64 {
    cents / CENTS_PER_UNIT
}

/// Renders cents the way the storefront prints prices: `R$ 57,80`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}R$ {},{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_nearest_cent() {
        assert_eq!(percent_of(10_000, 10), 1_000);
        assert_eq!(percent_of(5_780, 15), 867);
        assert_eq!(percent_of(999, 50), 500);
        assert_eq!(percent_of(0, 25), 0);
    }

    #[test]
    fn whole_units_truncates() {
        assert_eq!(whole_units(5_780), 57);
        assert_eq!(whole_units(99), 0);
    }

    #[test]
    fn formats_reais() {
        assert_eq!(format_brl(5_780), "R$ 57,80");
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(-1_050), "-R$ 10,50");
    }
}
