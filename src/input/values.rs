/// Coerces a raw cell to a metric value. Empty, unparseable, non-finite and
/// sentinel-coded cells are missing.
pub fn parse_metric(raw: &str, sentinel: Option<f64>) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    if sentinel.is_some_and(|s| value == s) {
        return None;
    }
    Some(value)
}

/// Leading year component of an age cell: "31-123" is 31 years and 123 days.
pub fn parse_age_years(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    trimmed[..end].parse::<f64>().ok()
}

pub fn normalize_age_cell(raw: &str) -> String {
    match parse_age_years(raw) {
        Some(years) => years.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/values.rs"]
mod tests;
