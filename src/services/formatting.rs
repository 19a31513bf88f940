use crate::models::{ChangeType, OwnershipChange, Quarter};

/// Group digits in threes with `.` (de-DE style).
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn sign_prefix(value: f64) -> &'static str {
    if value < 0.0 { "-" } else { "" }
}

/// Whole-dollar amount in de-DE notation, e.g. `1.234.567 $`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    if !rounded.is_finite() {
        return "0\u{a0}$".to_string();
    }
    format!("{}{}\u{a0}$", sign_prefix(rounded), group_thousands(rounded.abs() as u64))
}

/// Short amount for headlines: `$1.2B`, `$350M`, `$12K`, `$950`.
pub fn format_currency_compact(value: f64) -> String {
    let abs = value.abs();
    let sign = sign_prefix(value);
    if abs >= 1_000_000_000.0 {
        format!("{}${:.1}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}${:.0}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.0}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs)
    }
}

pub fn format_shares(value: u64) -> String {
    group_thousands(value)
}

pub fn format_signed_shares(value: i64) -> String {
    let sign = if value > 0 { "+" } else if value < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(value.unsigned_abs()))
}

/// `2024-Q3` -> `Q3 2024`; anything unparseable is returned unchanged.
pub fn format_quarter_label(quarter: &str) -> String {
    Quarter::parse(quarter)
        .map(|q| q.label())
        .unwrap_or_else(|_| quarter.to_string())
}

/// Annotation for a single-period change, e.g. `+1.500 shares (new)`.
pub fn format_change(change: &OwnershipChange) -> String {
    match change.change_type() {
        ChangeType::New => format!("{} shares (new)", format_signed_shares(change.shares_change)),
        ChangeType::Sold => format!("{} shares (sold)", format_signed_shares(change.shares_change)),
        ChangeType::Increased | ChangeType::Decreased => {
            format!("{} shares", format_signed_shares(change.shares_change))
        }
        ChangeType::Unchanged => "unchanged".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(27_000.0), "27.000\u{a0}$");
        assert_eq!(format_currency(1_234_567.4), "1.234.567\u{a0}$");
        assert_eq!(format_currency(-950.0), "-950\u{a0}$");
        assert_eq!(format_currency(0.0), "0\u{a0}$");
    }

    #[test]
    fn test_format_currency_compact() {
        assert_eq!(format_currency_compact(1_240_000_000.0), "$1.2B");
        assert_eq!(format_currency_compact(350_000_000.0), "$350M");
        assert_eq!(format_currency_compact(-12_000.0), "-$12K");
        assert_eq!(format_currency_compact(950.0), "$950");
    }

    #[test]
    fn test_format_shares() {
        assert_eq!(format_shares(0), "0");
        assert_eq!(format_shares(999), "999");
        assert_eq!(format_shares(1_000), "1.000");
        assert_eq!(format_shares(400_000_000), "400.000.000");
        assert_eq!(format_signed_shares(-1_500), "-1.500");
    }

    #[test]
    fn test_format_quarter_label() {
        assert_eq!(format_quarter_label("2024-Q3"), "Q3 2024");
        assert_eq!(format_quarter_label("latest"), "latest");
    }

    #[test]
    fn test_format_change_annotations() {
        let new = OwnershipChange {
            shares_change: 1_500,
            percentage_change: 2.0,
            value_change: 10.0,
            is_new: true,
            is_sold: false,
        };
        assert_eq!(format_change(&new), "+1.500 shares (new)");

        let sold = OwnershipChange { shares_change: -200, is_new: false, is_sold: true, ..new.clone() };
        assert_eq!(format_change(&sold), "-200 shares (sold)");

        let flat = OwnershipChange { shares_change: 0, is_new: false, is_sold: false, ..new };
        assert_eq!(format_change(&flat), "unchanged");
    }
}
