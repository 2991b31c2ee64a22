//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Use this when building LIKE patterns from user input so that a property
/// value like `50%_off` only matches itself.
///
/// # Example
///
/// ```
/// use clickpath_engine::utils::sql::escape_like_pattern;
///
/// let user_input = "100% match_test";
/// let pattern = format!("%{}%", escape_like_pattern(user_input));
/// assert_eq!(pattern, "%100\\% match\\_test%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Build a JSONPath selecting a single top-level member.
///
/// The key is always quoted so property names containing dots, spaces or
/// brackets address one member instead of a nested path.
pub fn json_member_path(key: &str) -> String {
    let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
    format!("$.\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern_no_special_chars() {
        assert_eq!(escape_like_pattern("hello"), "hello");
    }

    #[test]
    fn test_escape_like_pattern_percent_and_underscore() {
        assert_eq!(escape_like_pattern("50%_off"), "50\\%\\_off");
    }

    #[test]
    fn test_escape_like_pattern_backslash() {
        assert_eq!(escape_like_pattern("path\\file"), "path\\\\file");
    }

    #[test]
    fn test_escape_like_pattern_empty() {
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_json_member_path_plain() {
        assert_eq!(json_member_path("$browser"), "$.\"$browser\"");
    }

    #[test]
    fn test_json_member_path_dotted_key() {
        assert_eq!(json_member_path("utm.source"), "$.\"utm.source\"");
    }

    #[test]
    fn test_json_member_path_escapes_quotes() {
        assert_eq!(json_member_path("a\"b"), "$.\"a\\\"b\"");
    }
}
