//! RSS feed generation.
//!
//! The feed carries public metadata only (title, link, excerpt, date,
//! author); gated bodies never leave the server.

use crate::{
    config::SiteConfig,
    content::{Post, PostStore},
    log,
    utils::{
        date::rfc2822,
        minify::{MinifyType, minify},
    },
};
use anyhow::{Context, Result, anyhow};
use regex::Regex;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use std::{fs, sync::LazyLock};

/// Build the feed if enabled in config.
pub fn build_rss(config: &SiteConfig, posts: &PostStore) -> Result<()> {
    if config.build.rss.enable {
        RssFeed::new(config, posts).write()?;
    }
    Ok(())
}

struct RssFeed<'a> {
    config: &'a SiteConfig,
    posts: &'a [Post],
}

impl<'a> RssFeed<'a> {
    fn new(config: &'a SiteConfig, posts: &'a PostStore) -> Self {
        Self {
            config,
            posts: posts.all(),
        }
    }

    fn into_xml(self) -> Result<String> {
        let base_url = self.config.base.url.as_deref().unwrap_or_default();
        let items: Vec<_> = self
            .posts
            .iter()
            .map(|post| post_to_rss_item(post, base_url, self.config))
            .collect();

        let channel = ChannelBuilder::default()
            .title(&self.config.base.title)
            .link(base_url)
            .description(&self.config.base.description)
            .language(self.config.base.language.clone())
            .generator(format!("lockblog {}", env!("CARGO_PKG_VERSION")))
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| anyhow!("rss validation failed: {e}"))?;
        Ok(channel.to_string())
    }

    fn write(self) -> Result<()> {
        let config = self.config;
        let xml = self.into_xml()?;
        let xml = minify(MinifyType::Xml(xml.as_bytes()), config);
        let rss_path = config.rss_path();

        if let Some(parent) = rss_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&rss_path, &*xml)
            .with_context(|| format!("Failed to write {}", rss_path.display()))?;

        log!("rss"; "{}", rss_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}

fn post_to_rss_item(post: &Post, base_url: &str, config: &SiteConfig) -> rss::Item {
    let link = format!("{}{}", base_url.trim_end_matches('/'), post.url());
    let author = normalize_rss_author(post.author.as_ref().map(|a| a.name.as_str()), config);

    ItemBuilder::default()
        .title(post.title.clone())
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description((!post.excerpt.is_empty()).then(|| post.excerpt.clone()))
        .pub_date(rfc2822(&post.date))
        .author(author)
        .build()
}

/// RSS wants `email@example.com (Name)`.
///
/// A post author already in that form is kept; otherwise the site author is
/// used, combined with the site email when needed.
fn normalize_rss_author(author: Option<&str>, config: &SiteConfig) -> Option<String> {
    static RE_VALID_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}[ \t]*\([^)]+\)$").unwrap()
    });

    let author = author?;
    if RE_VALID_AUTHOR.is_match(author) {
        return Some(author.to_owned());
    }

    let site_author = &config.base.author;
    if RE_VALID_AUTHOR.is_match(site_author) {
        return Some(site_author.clone());
    }

    Some(format!("{} ({})", config.base.email, author))
}
