//! Content loading error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning markdown files into posts.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` has no `---` front matter block")]
    MissingFrontMatter(PathBuf),

    #[error("invalid front matter in `{0}`")]
    FrontMatter(PathBuf, #[source] serde_yaml::Error),

    #[error("`{path}`: date `{value}` is neither RFC 3339 nor YYYY-MM-DD")]
    InvalidDate { path: PathBuf, value: String },

    #[error("`{0}`: no usable slug (one path segment without `/`, quotes or `..`)")]
    InvalidSlug(PathBuf),

    #[error("slug `{slug}` is used by both `{first}` and `{second}`")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_slug_display() {
        let err = ContentError::DuplicateSlug {
            slug: "hello".into(),
            first: "_posts/hello.md".into(),
            second: "_posts/2020/hello.md".into(),
        };
        let text = err.to_string();
        assert!(text.contains("`hello`"));
        assert!(text.contains("_posts/2020/hello.md"));
    }
}
