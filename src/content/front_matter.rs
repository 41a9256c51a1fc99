//! YAML front matter.
//!
//! ```markdown
//! ---
//! title: 'Dynamic Routing and Static Generation'
//! excerpt: 'Lorem ipsum dolor sit amet...'
//! coverImage: '/assets/blog/dynamic-routing/cover.jpg'
//! date: '2020-03-16T05:35:07.322Z'
//! author:
//!   name: JJ Kasper
//!   picture: '/assets/blog/authors/jj.jpeg'
//! ogImage:
//!   url: '/assets/blog/dynamic-routing/cover.jpg'
//! ---
//! ```

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Leading `---` block, closed by a `---` line.
static RE_FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A(?:\u{feff})?---[ \t]*\r?\n(?:(.*?)\r?\n)??---[ \t]*(?:\r?\n|\z)").unwrap()
});

/// Parsed front matter fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: String,

    /// Kept as text; validated when the post is built.
    pub date: String,

    /// Overrides the file-name slug.
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub author: Option<Author>,

    #[serde(default)]
    pub og_image: Option<OgImage>,
}

/// Post author. Accepts either a bare name or `{ name, picture }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "AuthorRepr")]
pub struct Author {
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        picture: Option<String>,
    },
}

impl From<AuthorRepr> for Author {
    fn from(repr: AuthorRepr) -> Self {
        match repr {
            AuthorRepr::Name(name) => Self {
                name,
                picture: None,
            },
            AuthorRepr::Full { name, picture } => Self { name, picture },
        }
    }
}

/// Open Graph image reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OgImage {
    pub url: String,
}

/// Split a markdown source into its front matter text and body.
///
/// Returns `None` when the file does not start with a `---` block.
pub fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let captures = RE_FRONT_MATTER.captures(source)?;
    let whole = captures.get(0)?;
    let yaml = captures.get(1).map_or("", |m| m.as_str());
    Some((yaml, &source[whole.end()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = "---\n\
title: 'Dynamic Routing and Static Generation'\n\
excerpt: 'Lorem ipsum'\n\
coverImage: '/assets/blog/dynamic-routing/cover.jpg'\n\
date: '2020-03-16T05:35:07.322Z'\n\
author:\n  name: JJ Kasper\n  picture: '/assets/blog/authors/jj.jpeg'\n\
ogImage:\n  url: '/assets/blog/dynamic-routing/cover.jpg'\n\
---\n\
\n\
Body **text**.\n";

    #[test]
    fn test_split_front_matter() {
        let (yaml, body) = split_front_matter(POST).unwrap();
        assert!(yaml.starts_with("title:"));
        assert!(yaml.ends_with("cover.jpg'"));
        assert_eq!(body, "\nBody **text**.\n");
    }

    #[test]
    fn test_parse_full_front_matter() {
        let (yaml, _) = split_front_matter(POST).unwrap();
        let meta: FrontMatter = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(meta.title, "Dynamic Routing and Static Generation");
        assert_eq!(meta.date, "2020-03-16T05:35:07.322Z");
        assert_eq!(meta.excerpt, "Lorem ipsum");
        assert_eq!(
            meta.cover_image.as_deref(),
            Some("/assets/blog/dynamic-routing/cover.jpg")
        );
        let author = meta.author.unwrap();
        assert_eq!(author.name, "JJ Kasper");
        assert_eq!(author.picture.as_deref(), Some("/assets/blog/authors/jj.jpeg"));
        assert_eq!(meta.og_image.unwrap().url, "/assets/blog/dynamic-routing/cover.jpg");
        assert!(meta.slug.is_none());
    }

    #[test]
    fn test_author_as_plain_name() {
        let meta: FrontMatter =
            serde_yaml::from_str("title: T\ndate: '2021-01-01'\nauthor: Tim Neutkens\n").unwrap();
        assert_eq!(
            meta.author,
            Some(Author {
                name: "Tim Neutkens".into(),
                picture: None
            })
        );
    }

    #[test]
    fn test_missing_front_matter() {
        assert!(split_front_matter("# Just markdown\n").is_none());
        assert!(split_front_matter("text\n---\ntitle: x\n---\n").is_none());
    }

    #[test]
    fn test_crlf_and_empty_body() {
        let (yaml, body) = split_front_matter("---\r\ntitle: T\r\ndate: '2021-01-01'\r\n---").unwrap();
        assert_eq!(yaml, "title: T\r\ndate: '2021-01-01'");
        assert_eq!(body, "");
    }

    #[test]
    fn test_closing_fence_starts_a_line() {
        let source = "---\ntitle: Hello---\ndate: '2021-01-01'\n---\nbody\n";
        let (yaml, body) = split_front_matter(source).unwrap();
        assert_eq!(yaml, "title: Hello---\ndate: '2021-01-01'");
        assert_eq!(body, "body\n");

        let meta: FrontMatter = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(meta.title, "Hello---");
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(split_front_matter("---\n---\nbody"), Some(("", "body")));
        assert_eq!(
            split_front_matter("---\n---\nintro\n---\nmore"),
            Some(("", "intro\n---\nmore"))
        );
    }

    #[test]
    fn test_missing_title_is_an_error() {
        assert!(serde_yaml::from_str::<FrontMatter>("date: '2021-01-01'\n").is_err());
    }
}
