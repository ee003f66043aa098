//! Shared parse helpers for flat environment values.

/// Parse a boolean flag.
///
/// Case-insensitive `"true"` and the literal `"1"` parse to `true`; anything
/// else, including an unset value, falls back to `default`.
#[must_use]
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    value.map_or(default, |raw| {
        let trimmed = raw.trim();
        trimmed.eq_ignore_ascii_case("true") || trimmed == "1"
    })
}

/// Parse a comma-separated list.
///
/// Elements are trimmed and empty elements dropped; order is preserved.
/// Unset or blank input yields an empty list.
#[must_use]
pub fn parse_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|element| !element.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
