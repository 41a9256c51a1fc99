//! HTML pages.
//!
//! Pages are plain string templates embedded at compile time. Every value
//! from content or config is escaped before substitution, except rendered
//! markdown bodies.

mod index;
mod post;

pub use index::index_page;
pub use post::post_page;

use crate::{config::SiteConfig, content::Post, utils::html::escape, wallet::WalletSession};

const LAYOUT_TEMPLATE: &str = include_str!("../embed/layout.html");

/// Browser side of the connect handshake.
const WALLET_SCRIPT: &str = include_str!("../embed/wallet.js");

/// Page-level values for [`layout`].
pub struct Page<'a> {
    pub title: &'a str,
    /// Extra `<head>` markup, already escaped.
    pub head: &'a str,
    /// Page content, already escaped.
    pub body: &'a str,
    pub connected: bool,
}

/// Wrap page content in the site layout.
pub fn layout(config: &SiteConfig, page: &Page) -> String {
    fill(
        LAYOUT_TEMPLATE,
        &[
            ("lang", &*escape(&config.base.language)),
            ("title", &*escape(page.title)),
            ("description", &*escape(&config.base.description)),
            ("head", page.head),
            ("connected", if page.connected { "true" } else { "false" }),
            ("body", page.body),
            ("script", WALLET_SCRIPT),
        ],
    )
}

/// Substitute `{name}` placeholders in one pass; substituted text is never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail.find('}').and_then(|end| {
            let key = &tail[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Connect affordance, or the greeting once a wallet is connected.
///
/// `next` is where the server sends the visitor after connecting.
pub fn connect_widget(session: &WalletSession, next: &str) -> String {
    if let Some(short) = session.display_address() {
        return format!(r#"<p class="welcome">Welcome back {}</p>"#, escape(&short));
    }
    format!(
        r#"<form method="post" action="/connect" data-connect>
    <input type="hidden" name="address" value="">
    <input type="hidden" name="error" value="">
    <input type="hidden" name="next" value="{}">
    <button type="submit" class="button">Connect</button>
</form>"#,
        escape(next)
    )
}

/// Cover image, linked to the post when `link` is set.
fn cover_image(post: &Post, link: bool) -> String {
    let Some(src) = &post.cover_image else {
        return String::new();
    };
    let img = format!(
        r#"<img class="cover" src="{}" alt="Cover Image for {}">"#,
        escape(src),
        escape(&post.title)
    );
    if link {
        format!(r#"<a href="{}" aria-label="{}">{img}</a>"#, post.url(), escape(&post.title))
    } else {
        img
    }
}

/// Author name with optional picture.
fn avatar(post: &Post) -> String {
    let Some(author) = &post.author else {
        return String::new();
    };
    let mut html = String::from(r#"<div class="avatar">"#);
    if let Some(picture) = &author.picture {
        html.push_str(&format!(r#"<img src="{}" alt="{}">"#, escape(picture), escape(&author.name)));
    }
    html.push_str(&format!("<span>{}</span></div>", escape(&author.name)));
    html
}

fn date(post: &Post) -> String {
    format!(
        r#"<time class="date" datetime="{}">{}</time>"#,
        post.date.to_rfc3339(),
        post.display_date()
    )
}
