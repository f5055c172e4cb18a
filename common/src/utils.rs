use crate::config::{COIN_DECIMALS, COIN_VALUE};

/// Format a smallest-unit amount into a human readable coin value
///
/// Trailing zeros of the fractional part are trimmed: `1500000000000000000`
/// becomes "1.5", not "1.500000000000000000".
pub fn format_coin(amount: u64) -> String {
    let whole = amount / COIN_VALUE;
    let fraction = amount % COIN_VALUE;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = COIN_DECIMALS as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Parse a human readable coin value back into the smallest unit
///
/// Returns None on any invalid input: empty string, more fractional digits
/// than the coin supports, or a value that would overflow.
pub fn from_coin(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if fraction.len() > COIN_DECIMALS as usize {
        return None;
    }

    let whole: u64 = whole.parse().ok()?;
    let fraction = if fraction.is_empty() {
        0
    } else {
        // Right-pad to the full decimal width: "5" means 0.5, not 5 units
        let padded = format!("{:0<width$}", fraction, width = COIN_DECIMALS as usize);
        padded.parse::<u64>().ok()?
    };

    whole.checked_mul(COIN_VALUE)?.checked_add(fraction)
}
