//! Slugs derived from post file names.

use std::path::Path;

/// Characters that cannot appear in a `/posts/<slug>/` path segment
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '/', '(', ')', '[', ']', '"', '\'', '%', '&', '\t',
    '\r', '\n',
];

/// Slug for a markdown file: its file stem, made URL-safe.
///
/// `_posts/hello-world.md` → `hello-world`
pub fn slug_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let slug = sanitize_text(stem);
    is_valid_slug(&slug).then_some(slug)
}

/// Remove forbidden characters and replace whitespace with hyphens
fn sanitize_text(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Whether `slug` is a single safe path segment: no forbidden or control
/// characters, no whitespace, and not `.` or `..`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.chars().any(char::is_control)
        && sanitize_text(slug) == slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_path() {
        assert_eq!(
            slug_from_path(Path::new("_posts/hello-world.md")).as_deref(),
            Some("hello-world")
        );
        assert_eq!(
            slug_from_path(Path::new("/abs/dir/preview.md")).as_deref(),
            Some("preview")
        );
    }

    #[test]
    fn test_slug_sanitizes_stem() {
        assert_eq!(
            slug_from_path(Path::new("My Post (draft).md")).as_deref(),
            Some("My-Post-draft")
        );
        assert_eq!(slug_from_path(Path::new("你好.md")).as_deref(), Some("你好"));
    }

    #[test]
    fn test_slug_empty_stem() {
        assert_eq!(slug_from_path(Path::new("()[].md")), None);
        assert_eq!(slug_from_path(Path::new("")), None);
    }

    #[test]
    fn test_sanitize_text_removes_all_forbidden_chars() {
        assert_eq!(sanitize_text("a<b>c:d|e?f*g#h\\i(j)k[l]m"), "abcdefghijklm");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("dynamic-routing"));
        assert!(!is_valid_slug("../etc/passwd"));
        assert!(!is_valid_slug("a b"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug("."));
        assert!(!is_valid_slug("a\"b"));
        assert!(!is_valid_slug("a\u{7f}b"));
        assert!(is_valid_slug("v1.2"));
    }

    #[test]
    fn test_dot_stems_have_no_slug() {
        assert_eq!(slug_from_path(Path::new("_posts/...md")), None);
    }
}
