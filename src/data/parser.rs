/// Parse one temperature cell. Anything that is not a finite number
/// (`NaN`, `***`, blank) is an absent sample rather than an error.
pub fn parse_temperature(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the `Year` cell of a row.
pub fn parse_year(cell: &str) -> Option<i32> {
    let trimmed = cell.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    // Some exports write years as floats ("1880.0").
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}
