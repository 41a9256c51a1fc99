//! Post records.

use super::{
    ContentError,
    front_matter::{Author, FrontMatter, split_front_matter},
    markdown::markdown_to_html,
};
use crate::utils::{
    date,
    slug::{is_valid_slug, slug_from_path},
};
use chrono::{DateTime, FixedOffset};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// One rendered markdown file. Immutable once built.
#[derive(Debug, Clone)]
pub struct Post {
    /// Unique identifier, used in `/posts/<slug>/`.
    pub slug: String,
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub author: Option<Author>,
    pub excerpt: String,
    pub cover_image: Option<String>,
    /// Falls back to the cover image when the front matter has no `ogImage`.
    pub og_image: Option<String>,
    /// Rendered HTML body.
    pub content: String,
    /// Source file, for diagnostics.
    pub source: PathBuf,
}

impl Post {
    /// Read and render a markdown file.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let source =
            fs::read_to_string(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
        let slug = slug_from_path(path).ok_or_else(|| ContentError::InvalidSlug(path.into()))?;
        Self::parse(slug, &source, path)
    }

    /// Build a post from markdown source; `slug` is used unless the front matter overrides it.
    pub fn parse(slug: String, source: &str, path: &Path) -> Result<Self, ContentError> {
        let (yaml, body) = split_front_matter(source)
            .ok_or_else(|| ContentError::MissingFrontMatter(path.into()))?;
        let meta: FrontMatter =
            serde_yaml::from_str(yaml).map_err(|err| ContentError::FrontMatter(path.into(), err))?;

        let date = date::parse_date(&meta.date).ok_or_else(|| ContentError::InvalidDate {
            path: path.into(),
            value: meta.date.clone(),
        })?;

        let slug = match meta.slug {
            Some(custom) if !custom.trim().is_empty() => custom.trim().to_owned(),
            _ => slug,
        };
        if !is_valid_slug(&slug) {
            return Err(ContentError::InvalidSlug(path.into()));
        }

        let og_image = meta
            .og_image
            .map(|og| og.url)
            .or_else(|| meta.cover_image.clone());

        Ok(Self {
            slug,
            title: meta.title,
            date,
            author: meta.author,
            excerpt: meta.excerpt,
            cover_image: meta.cover_image,
            og_image,
            content: markdown_to_html(body),
            source: path.to_path_buf(),
        })
    }

    /// Site-relative URL of the post page.
    pub fn url(&self) -> String {
        format!("/posts/{}/", self.slug)
    }

    /// Date as shown on pages, e.g. "March 16, 2020".
    pub fn display_date(&self) -> String {
        date::display_date(&self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "---\n\
title: Hello World\n\
excerpt: First post\n\
coverImage: /assets/blog/hello/cover.jpg\n\
date: '2020-03-16T05:35:07.322Z'\n\
author:\n  name: Tim\n\
---\n\
# Hi\n\nMembers only.\n";

    #[test]
    fn test_parse_post() {
        let post = Post::parse("hello-world".into(), SOURCE, Path::new("hello-world.md")).unwrap();

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.excerpt, "First post");
        assert_eq!(post.author.as_ref().unwrap().name, "Tim");
        assert!(post.content.contains("<h1>Hi</h1>"));
        assert!(post.content.contains("Members only."));
        assert_eq!(post.url(), "/posts/hello-world/");
        assert_eq!(post.display_date(), "March 16, 2020");
    }

    #[test]
    fn test_og_image_falls_back_to_cover() {
        let post = Post::parse("hello".into(), SOURCE, Path::new("hello.md")).unwrap();
        assert_eq!(post.og_image.as_deref(), Some("/assets/blog/hello/cover.jpg"));
    }

    #[test]
    fn test_front_matter_slug_override() {
        let source = "---\ntitle: T\ndate: '2021-05-01'\nslug: custom\n---\nbody\n";
        let post = Post::parse("file-name".into(), source, Path::new("file-name.md")).unwrap();
        assert_eq!(post.slug, "custom");
    }

    #[test]
    fn test_front_matter_slug_must_be_one_segment() {
        for slug in ["../../x", "..", "'a\"b'", "a/b"] {
            let source = format!("---\ntitle: T\ndate: '2021-05-01'\nslug: {slug}\n---\nbody\n");
            let err = Post::parse("file-name".into(), &source, Path::new("file-name.md")).unwrap_err();
            assert!(matches!(err, ContentError::InvalidSlug(_)), "{slug} accepted");
        }
    }

    #[test]
    fn test_invalid_date() {
        let source = "---\ntitle: T\ndate: yesterday\n---\nbody\n";
        let err = Post::parse("t".into(), source, Path::new("t.md")).unwrap_err();
        assert!(matches!(err, ContentError::InvalidDate { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn test_missing_front_matter() {
        let err = Post::parse("t".into(), "# no meta\n", Path::new("t.md")).unwrap_err();
        assert!(matches!(err, ContentError::MissingFrontMatter(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Post::parse("t".into(), "---\ntitle: [unclosed\n---\n", Path::new("t.md"))
            .unwrap_err();
        assert!(matches!(err, ContentError::FrontMatter(..)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("from-disk.md");
        fs::write(&path, SOURCE).unwrap();

        let post = Post::from_file(&path).unwrap();
        assert_eq!(post.slug, "from-disk");
        assert_eq!(post.source, path);
    }
}
