//! Identifier safety checks.
//!
//! Any name that ends up in a synthesized parameter table must pass
//! [`is_safe_identifier`]. Field *values* are never identifier material, so
//! this check is the gate that keeps attacker-controlled content out of
//! generated parameter surfaces.

/// Returns `true` if `name` is a syntactically safe identifier.
///
/// Safe means: non-empty, starts with an ASCII letter or underscore, and
/// continues with ASCII letters, digits, or underscores only.
///
/// # Examples
///
/// ```
/// use command_bind_core::is_safe_identifier;
///
/// assert!(is_safe_identifier("retry_count"));
/// assert!(is_safe_identifier("_internal"));
/// assert!(!is_safe_identifier(""));
/// assert!(!is_safe_identifier("9lives"));
/// assert!(!is_safe_identifier("rm -rf /"));
/// assert!(!is_safe_identifier("a;b"));
/// ```
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_identifiers() {
        for name in ["a", "name", "retry_count", "_x", "f1"] {
            assert!(is_safe_identifier(name), "{name} should be safe");
        }
    }

    #[test]
    fn test_rejects_unsafe_names() {
        for name in ["", " ", "9a", "a-b", "a.b", "a b", "--flag", "x;y", "λ"] {
            assert!(!is_safe_identifier(name), "{name:?} should be rejected");
        }
    }
}
