//! Spoken-English rendering of results.

use voxcalc_types::{ERROR_MARKER, format_number, parse_display_number};

/// Spoken when a result cannot be read back as a number.
pub const APOLOGY: &str = "There was an error in the calculation.";

const ONES: [&str; 20] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const SCALES: [&str; 6] = ["", "thousand", "million", "billion", "trillion", "quadrillion"];
const SCALE_LIMIT: u64 = 1_000_000_000_000_000_000;
const DIGITS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

/// Sentence handed to the text-to-speech collaborator for a display value.
#[must_use]
pub fn narrate(result: &str) -> String {
    match spoken(result) {
        Some(words) => format!("The answer is {words}"),
        None => APOLOGY.to_string(),
    }
}

/// Words for a display value, or [`APOLOGY`] when it is the error marker or
/// not a number.
#[must_use]
pub fn to_spoken_words(result: &str) -> String {
    spoken(result).unwrap_or_else(|| APOLOGY.to_string())
}

fn spoken(result: &str) -> Option<String> {
    if result.trim() == ERROR_MARKER {
        return None;
    }
    parse_display_number(result).map(number_to_words)
}

/// Short-scale English for a finite number.
///
/// Decimals are read digit by digit after "point". Integer parts too large
/// for the quadrillion scale are read digit by digit.
#[must_use]
pub fn number_to_words(value: f64) -> String {
    let mut words = Vec::new();
    if value < 0.0 {
        words.push("negative".to_string());
    }

    let text = format_number(value.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    match integer.parse::<u64>() {
        Ok(0) => words.push("zero".to_string()),
        Ok(n) if n < SCALE_LIMIT => words.push(integer_words(n)),
        _ => words.push(digit_words(integer)),
    }

    if !fraction.is_empty() {
        words.push("point".to_string());
        words.push(digit_words(fraction));
    }

    words.join(" ")
}

fn integer_words(mut n: u64) -> String {
    let mut groups = Vec::new();
    for scale in SCALES {
        let chunk = n % 1000;
        if chunk > 0 {
            let group = group_words(chunk);
            groups.push(if scale.is_empty() {
                group
            } else {
                format!("{group} {scale}")
            });
        }
        n /= 1000;
        if n == 0 {
            break;
        }
    }
    groups.reverse();
    groups.join(" ")
}

fn group_words(n: u64) -> String {
    let n = n as usize;
    let mut parts = Vec::new();
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds]));
    }
    if rest >= 20 {
        let ones = rest % 10;
        if ones == 0 {
            parts.push(TENS[rest / 10].to_string());
        } else {
            parts.push(format!("{}-{}", TENS[rest / 10], ONES[ones]));
        }
    } else if rest > 0 {
        parts.push(ONES[rest].to_string());
    }
    parts.join(" ")
}

fn digit_words(digits: &str) -> String {
    digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| DIGITS[d as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_values() {
        assert_eq!(to_spoken_words("1001"), "one thousand one");
        assert_eq!(to_spoken_words("0"), "zero");
        assert_eq!(to_spoken_words("-5"), "negative five");
    }

    #[test]
    fn tens_are_hyphenated() {
        assert_eq!(to_spoken_words("25"), "twenty-five");
        assert_eq!(to_spoken_words("90"), "ninety");
        assert_eq!(to_spoken_words("342"), "three hundred forty-two");
    }

    #[test]
    fn scales_skip_empty_groups() {
        assert_eq!(to_spoken_words("1000000"), "one million");
        assert_eq!(
            to_spoken_words("2003004"),
            "two million three thousand four"
        );
        assert_eq!(
            to_spoken_words("1000000000000000"),
            "one quadrillion"
        );
    }

    #[test]
    fn decimals_are_read_digit_by_digit() {
        assert_eq!(to_spoken_words("3.14"), "three point one four");
        assert_eq!(to_spoken_words("0.05"), "zero point zero five");
        assert_eq!(to_spoken_words("-0.5"), "negative zero point five");
    }

    #[test]
    fn huge_integers_fall_back_to_digits() {
        let expected = format!("one{}", " zero".repeat(18));
        assert_eq!(to_spoken_words("1000000000000000000"), expected);
    }

    #[test]
    fn errors_get_the_apology() {
        assert_eq!(to_spoken_words("Error"), APOLOGY);
        assert_eq!(to_spoken_words("Set API Key"), APOLOGY);
        assert_eq!(narrate("Error"), APOLOGY);
    }

    #[test]
    fn narration_sentence() {
        assert_eq!(narrate("12"), "The answer is twelve");
    }

    #[test]
    fn digit_words_table_round_trip() {
        for (digit, word) in DIGITS.iter().enumerate() {
            assert_eq!(to_spoken_words(&digit.to_string()), *word);
        }
    }
}
