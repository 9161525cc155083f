//! Normalization of optional region name fields.
//!
//! The region API is inconsistent about missing values: a parent may be
//! omitted, `null`, or an empty string. All three mean "absent".

/// Maps `None` and `Some("")` to `None`; any other value is returned as-is.
pub fn normalize(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Returns true if the value normalizes to absent.
pub fn is_absent(value: Option<&str>) -> bool {
    normalize(value).is_none()
}
