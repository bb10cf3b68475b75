// ---------------------------------------------------------------------------
// Number formatting for metric cards
// ---------------------------------------------------------------------------

/// Round to an integer and group thousands with commas: `1234567.8` → `1,234,568`.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Abbreviate large numbers: `1234` → `1.23K`, `5_600_000` → `5.6M`.
///
/// Two decimals at most, trailing zeros dropped.
pub fn abbreviate(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let (scaled, suffix) = UNITS
        .iter()
        .find(|(scale, _)| value.abs() >= *scale)
        .map(|(scale, suffix)| (value / scale, *suffix))
        .unwrap_or((value, ""));

    let text = format!("{scaled:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(1_234_567.8), "1,234,568");
        assert_eq!(thousands(-45_000.0), "-45,000");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate(12.0), "12");
        assert_eq!(abbreviate(1234.0), "1.23K");
        assert_eq!(abbreviate(5_600_000.0), "5.6M");
        assert_eq!(abbreviate(3_000_000_000.0), "3B");
        assert_eq!(abbreviate(-2500.0), "-2.5K");
        assert_eq!(abbreviate(7.8e12), "7.8T");
    }
}
