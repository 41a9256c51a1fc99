//! Content source: markdown files with front matter.
//!
//! Every `*.md` file under the content directory becomes one [`Post`].
//! The collection is ordered newest first and indexed by slug.

mod error;
mod front_matter;
mod markdown;
mod post;

pub use error::ContentError;
pub use front_matter::Author;
pub use post::Post;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All posts of the site, newest first.
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
    by_slug: FxHashMap<String, usize>,
}

impl PostStore {
    /// Load every markdown file below `dir`.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let files = collect_markdown_files(dir)?;
        let posts = files
            .par_iter()
            .map(|path| Post::from_file(path))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_posts(posts)
    }

    /// Order and index already built posts; slugs must be unique.
    pub fn from_posts(mut posts: Vec<Post>) -> Result<Self, ContentError> {
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        let mut by_slug = FxHashMap::default();
        for (index, post) in posts.iter().enumerate() {
            if let Some(&first) = by_slug.get(&post.slug) {
                let first: &Post = &posts[first];
                return Err(ContentError::DuplicateSlug {
                    slug: post.slug.clone(),
                    first: first.source.clone(),
                    second: post.source.clone(),
                });
            }
            by_slug.insert(post.slug.clone(), index);
        }

        Ok(Self { posts, by_slug })
    }

    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Collect `*.md` files, skipping hidden entries.
fn collect_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            ContentError::Io(path, err.into())
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_markdown = entry.path().extension().is_some_and(|ext| ext == "md");
        if entry.file_type().is_file() && is_markdown && !hidden {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
