//! Parsing of abbreviated engagement counts ("12.3K", "4M", "1,204").

use regex::Regex;
use std::sync::LazyLock;

/// First numeric run, an optional fraction, and the word directly after it.
static ABBREVIATED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.(\d+))?\s?([A-Za-z]*)").unwrap());

/// Fraction digits beyond this cannot change the floored result for K/M multipliers.
const MAX_FRACTION_DIGITS: usize = 7;

/// Parse a human-readable count into an integer.
///
/// Commas are stripped, the first number in the text is taken, and a trailing
/// `k`/`m` (any case) scales it by a thousand or a million. The result is
/// floored. Text without a number yields 0; this never fails.
pub fn parse_abbreviated_number(text: &str) -> u64 {
    let cleaned = text.replace(',', "");
    let Some(caps) = ABBREVIATED_NUMBER.captures(&cleaned) else {
        return 0;
    };

    let Ok(whole) = caps[1].parse::<u64>() else {
        return 0;
    };

    // Only a bare K or M is a magnitude; "12 Members" stays 12.
    let multiplier: u64 = match &caps[3] {
        "k" | "K" => 1_000,
        "m" | "M" => 1_000_000,
        _ => 1,
    };

    let fraction = caps
        .get(2)
        .map(|m| fraction_part(m.as_str(), multiplier))
        .unwrap_or(0);

    whole.saturating_mul(multiplier).saturating_add(fraction)
}

/// Floor of `0.<digits> * multiplier`, computed without floating point.
fn fraction_part(digits: &str, multiplier: u64) -> u64 {
    let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    let Ok(numerator) = digits.parse::<u64>() else {
        return 0;
    };
    let denominator = 10_u64.pow(digits.len() as u32);
    numerator * multiplier / denominator
}
