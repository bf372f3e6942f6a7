/// Trim, drop spaces, read commas as decimal points, then parse.
///
/// `None` for anything that is still not a finite number.
pub fn clean_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Quantity never goes missing: unparseable is 0, fractions truncate, negatives clamp to 0.
/// Counts that do not fit an `i64` are treated as unparseable.
pub fn coerce_quantity(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v > 0.0 && v < i64::MAX as f64 => v.trunc() as i64,
        _ => 0,
    }
}
