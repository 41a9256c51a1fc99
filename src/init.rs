//! Site initialization module.
//!
//! Creates a new blog with default configuration and a sample post.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Default config filename
const CONFIG_FILE: &str = "lockblog.toml";

const SAMPLE_POST: &str = r#"---
title: 'Hello, members'
excerpt: 'The first post of this blog. Connect a wallet holding a membership to read it.'
coverImage: '/assets/blog/hello-world/cover.jpg'
date: '2020-03-16T05:35:07.322Z'
author:
  name: Tim
  picture: '/assets/blog/authors/tim.jpeg'
ogImage:
  url: '/assets/blog/hello-world/cover.jpg'
---

Welcome! This post is only visible to wallets holding a key of the
configured lock.

## Writing posts

Every markdown file in `_posts/` becomes a page at `/posts/<file-name>/`.
The front matter above holds the public part shown on the index and in the
feed; everything below it is for members.
"#;

/// Create a new site with default structure
pub fn new_site(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = &config.root;

    // Without a name the current directory is used and must be empty.
    if !has_name && !is_dir_empty(root)? {
        bail!("Current directory is not empty. Use `lockblog init <SITE_NAME>` to create in a subdirectory.");
    }

    init_site_structure(config)?;
    init_default_config(root)?;
    init_ignored_files(root, &[Path::new("out/")])?;

    log!("init"; "created {}", root.display());
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file
fn init_default_config(root: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Create content and asset directories with the sample post.
fn init_site_structure(config: &SiteConfig) -> Result<()> {
    let dirs = [
        config.build.content.clone(),
        config.build.assets.join("assets/blog/hello-world"),
        config.build.assets.join("assets/blog/authors"),
    ];
    for path in &dirs {
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `lockblog init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    }

    fs::write(config.build.content.join("hello-world.md"), SAMPLE_POST)?;
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}
