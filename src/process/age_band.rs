/// `(lower inclusive, upper exclusive, label)`, ascending and contiguous.
pub const AGE_BANDS: [(f64, f64, &str); 6] = [
    (0.0, 18.0, "<18"),
    (18.0, 25.0, "18-24"),
    (25.0, 35.0, "25-34"),
    (35.0, 50.0, "35-49"),
    (50.0, 65.0, "50-64"),
    (65.0, 120.0, "65+"),
];

/// Band label for `age`, or `None` when missing or outside `[0, 120)`.
pub fn age_band(age: Option<f64>) -> Option<&'static str> {
    let age = age?;
    AGE_BANDS
        .iter()
        .find(|(lo, hi, _)| *lo <= age && age < *hi)
        .map(|(_, _, label)| *label)
}
