//! Display formatting for numeric results.
//!
//! The display buffer holds strings, not floats. These helpers are the only
//! place a result becomes text, so every surface shows the same digits.

/// Buffer contents after a failed calculation.
pub const ERROR_MARKER: &str = "Error";

/// Transient buffer contents while the remote solver is working.
pub const THINKING_MARKER: &str = "Thinking...";

const BOUNDED_DECIMALS: usize = 10;

/// Format a result the way the calculator displays it.
///
/// Integers have no fractional suffix, other values use the shortest
/// representation that round-trips. Negative zero prints as `0`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    format!("{value}")
}

/// Format a scientific-function result: integers unadorned, everything else
/// rounded to ten decimals with trailing zeros trimmed.
#[must_use]
pub fn format_bounded(value: f64) -> String {
    if !value.is_finite() || value.fract() == 0.0 {
        return format_number(value);
    }
    let fixed = format!("{value:.prec$}", prec = BOUNDED_DECIMALS);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" || trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a display string back into a finite number.
#[must_use]
pub fn parse_display_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{format_bounded, format_number, parse_display_number};

    #[test]
    fn integers_have_no_fraction() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(1024.0), "1024");
        assert_eq!(format_number(-5.0), "-5");
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_bounded(-1e-12), "0");
    }

    #[test]
    fn fractions_use_shortest_repr() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn bounded_trims_trailing_zeros() {
        assert_eq!(format_bounded(0.5), "0.5");
        assert_eq!(format_bounded(3.0_f64.sin()), "0.1411200081");
        assert_eq!(format_bounded(2.0), "2");
    }

    #[test]
    fn parse_rejects_markers_and_non_finite() {
        assert_eq!(parse_display_number("12"), Some(12.0));
        assert_eq!(parse_display_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_display_number("Error"), None);
        assert_eq!(parse_display_number("inf"), None);
        assert_eq!(parse_display_number(""), None);
    }
}
