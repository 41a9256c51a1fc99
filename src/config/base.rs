//! `[base]` section configuration.
//!
//! Contains basic site information like title, author, description, etc.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in lockblog.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Blog."
/// description = "Members-only writing"
/// author = "Alice"
/// url = "https://myblog.com"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title displayed in browser tab and headers.
    pub title: String,

    /// Author name for rss feed.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Author email for rss feed.
    #[serde(default = "defaults::base::email")]
    #[educe(Default = defaults::base::email())]
    pub email: String,

    /// Site description for meta tags and the feed channel.
    pub description: String,

    /// Base URL for absolute links in the feed and checkout redirects.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// BCP 47 language code.
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,

    /// Name appended to page titles ("<title> with <cms_name>").
    #[serde(default = "defaults::base::cms_name")]
    #[educe(Default = defaults::base::cms_name())]
    pub cms_name: String,
}

impl BaseConfig {
    /// Title used for the index page.
    pub fn index_title(&self) -> String {
        format!("{} with {}", self.title, self.cms_name)
    }

    /// Title used for a single post page.
    pub fn post_title(&self, post_title: &str) -> String {
        format!("{post_title} | {}", self.index_title())
    }
}
