//! Request path validation
//!
//! Gatekeeper for both API routing and static file serving. A path that fails
//! here never reaches the registry or the filesystem.

/// Check whether a request path is safe to route or serve
///
/// Rejects parent-directory traversal (`..`) and hidden segments (`/.`), then
/// accepts only ASCII letters, digits, `.`, `-`, `_` and `/`.
///
/// # Examples
/// ```
/// use dispatch_server::routing::is_valid_path;
/// assert!(is_valid_path("/assets/app-1.2_min.js"));
/// assert!(!is_valid_path("/../etc/passwd"));
/// assert!(!is_valid_path("/.env"));
/// assert!(!is_valid_path("/a b"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.contains("..") || path.contains("/.") {
        return false;
    }
    path.chars().all(is_path_char)
}

const fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_rejected() {
        assert!(!is_valid_path(".."));
        assert!(!is_valid_path("/.."));
        assert!(!is_valid_path("/a/../b"));
        assert!(!is_valid_path("/a/b.."));
        assert!(!is_valid_path("/a..b/c"));
    }

    #[test]
    fn test_hidden_segment_rejected() {
        assert!(!is_valid_path("/.git/config"));
        assert!(!is_valid_path("/static/.env"));
        assert!(!is_valid_path("/."));
    }

    #[test]
    fn test_allowed_charset_accepted() {
        assert!(is_valid_path("/"));
        assert!(is_valid_path(""));
        assert!(is_valid_path("/index.html"));
        assert!(is_valid_path("/api/v1/users"));
        assert!(is_valid_path("/a-b_c.d/E9"));
        assert!(is_valid_path("//double//slash/"));
        assert!(is_valid_path("file.tar.gz"));
    }

    #[test]
    fn test_other_characters_rejected() {
        for path in [
            "/a b", "/a%2e", "/<script>", "/a?b=1", "/a\nb", "/a\tb", "/caf\u{e9}", "/a~b",
            "/a+b", "/a\\b", "/a:b",
        ] {
            assert!(!is_valid_path(path), "expected {path:?} to be rejected");
        }
    }
}
