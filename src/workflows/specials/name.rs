/// Returned when no line carries a Latin letter.
pub const UNKNOWN_RESTAURANT: &str = "Unknown Restaurant";

/// Picks the first line containing an ASCII letter, trimmed of outer
/// whitespace. Internal noise such as `"Rt.66 Diner"` is kept as-is.
pub fn extract_name(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| line.bytes().any(|byte| byte.is_ascii_alphabetic()))
        .unwrap_or(UNKNOWN_RESTAURANT)
        .to_string()
}
