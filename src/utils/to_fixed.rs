/// Formats `value` with exactly `digits` decimals, rounding halves up
/// (`2.25` → `"2.3"`) rather than to the even digit.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let factor = 10f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    format!("{rounded:.digits$}")
}
