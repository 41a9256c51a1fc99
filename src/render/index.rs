//! Home page: hero post plus "More Stories".

use super::{Page, avatar, connect_widget, cover_image, date, layout};
use crate::{config::SiteConfig, content::Post, utils::html::escape, wallet::WalletSession};

/// Render the post list, newest first. Only public metadata is shown.
pub fn index_page(config: &SiteConfig, posts: &[Post], session: &WalletSession) -> String {
    let mut body = format!(
        r#"<section class="intro">
    <h1>{}</h1>
    {}
</section>
"#,
        escape(&config.base.title),
        connect_widget(session, "/")
    );

    if let Some((hero, more)) = posts.split_first() {
        body.push_str(&hero_post(hero));
        if !more.is_empty() {
            body.push_str(&more_stories(more));
        }
    }

    layout(
        config,
        &Page {
            title: &config.base.index_title(),
            head: &feed_link(config),
            body: &body,
            connected: session.is_connected(),
        },
    )
}

fn hero_post(post: &Post) -> String {
    format!(
        r#"<section class="hero">
    {cover}
    <h3><a class="post-link" href="{url}">{title}</a></h3>
    {date}
    <p>{excerpt}</p>
    {avatar}
</section>
"#,
        cover = cover_image(post, true),
        url = post.url(),
        title = escape(&post.title),
        date = date(post),
        excerpt = escape(&post.excerpt),
        avatar = avatar(post),
    )
}

fn more_stories(posts: &[Post]) -> String {
    let mut html = String::from("<section class=\"stories\">\n    <h2>More Stories</h2>\n");
    for post in posts {
        html.push_str(&format!(
            r#"    <div class="preview">
        {}
        <h3><a class="post-link" href="{}">{}</a></h3>
        {}
        <p>{}</p>
        {}
    </div>
"#,
            cover_image(post, true),
            post.url(),
            escape(&post.title),
            date(post),
            escape(&post.excerpt),
            avatar(post),
        ));
    }
    html.push_str("</section>\n");
    html
}

fn feed_link(config: &SiteConfig) -> String {
    if !config.build.rss.enable {
        return String::new();
    }
    format!(
        r#"    <link rel="alternate" type="application/rss+xml" title="{}" href="/{}">"#,
        escape(&config.base.title),
        config.build.rss.path.display()
    )
}
