//! Priority ranks and their textual coercion

use crate::error::RoutingError;

/// Priority of block rules added through `reject`
pub const REJECT_PRIORITY: f64 = -1.0;

/// Priority reserved for the single catch-all default route
pub const DEFAULT_PRIORITY: f64 = 100.0;

/// Priority used by `add` when none is given
pub const STANDARD_PRIORITY: f64 = 0.0;

/// Parse a textual priority as a decimal floating point literal.
///
/// Accepts an optional sign, digits with an optional fraction and an optional
/// exponent; surrounding whitespace is ignored. Words such as `inf` or `NaN`
/// are rejected even though `f64::from_str` would take them.
pub fn coerce_priority(text: &str) -> Result<f64, RoutingError> {
    let text = text.trim();

    let well_formed = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return Err(RoutingError::invalid_priority(format!(
            "'{}' is not a number",
            text
        )));
    }

    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RoutingError::invalid_priority(format!("'{}' is not a number", text)))
}
