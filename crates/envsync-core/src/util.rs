//! Utility functions for envsync
//!
//! Character-safe truncation and secret masking for operator-facing output.

/// Safely truncate a string at character boundaries (not byte boundaries).
///
/// # Example
/// ```
/// use envsync_core::util::safe_truncate;
///
/// assert_eq!(safe_truncate("Hello, world!", 5), "Hello");
/// assert_eq!(safe_truncate("日本語テスト", 3), "日本語");
/// ```
#[inline]
pub fn safe_truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate and append "..." if anything was cut.
///
/// # Example
/// ```
/// use envsync_core::util::safe_truncate_with_ellipsis;
///
/// assert_eq!(safe_truncate_with_ellipsis("Hello, world!", 5), "Hello...");
/// assert_eq!(safe_truncate_with_ellipsis("Hi", 5), "Hi");
/// ```
pub fn safe_truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!("{}...", safe_truncate(s, max_chars))
    }
}

/// Number of leading characters a masked secret keeps.
const MASK_VISIBLE_CHARS: usize = 4;

/// Mask a credential for display.
///
/// Short secrets are hidden entirely so the visible prefix never gives most
/// of the value away. Empty stays empty, so "set but blank" is still visible.
///
/// # Example
/// ```
/// use envsync_core::util::mask_secret;
///
/// assert_eq!(mask_secret("sk-abcdefghijkl"), "sk-a****");
/// assert_eq!(mask_secret("short"), "****");
/// assert_eq!(mask_secret(""), "");
/// ```
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    if secret.chars().count() <= MASK_VISIBLE_CHARS * 2 {
        return "****".to_string();
    }
    format!("{}****", safe_truncate(secret, MASK_VISIBLE_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_ascii() {
        assert_eq!(safe_truncate("hello world", 5), "hello");
        assert_eq!(safe_truncate("hi", 5), "hi");
        assert_eq!(safe_truncate("", 5), "");
    }

    #[test]
    fn test_safe_truncate_unicode() {
        assert_eq!(safe_truncate("🎉🎊🎈", 2), "🎉🎊");
        assert_eq!(safe_truncate("Hello 世界", 7), "Hello 世");
    }

    #[test]
    fn test_safe_truncate_with_ellipsis() {
        assert_eq!(safe_truncate_with_ellipsis("hello world", 5), "hello...");
        assert_eq!(safe_truncate_with_ellipsis("hello", 5), "hello");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefghi"), "abcd****");
        assert_eq!(mask_secret("abcdefgh"), "****");
        assert_eq!(mask_secret("密码密码密码密码密码"), "密码密码****");
        assert_eq!(mask_secret(""), "");
    }
}
