//! Post page with the membership gate.

use super::{Page, avatar, connect_widget, cover_image, date, layout};
use crate::{
    config::SiteConfig,
    content::Post,
    gate::{GateState, GatedView},
    utils::html::escape,
};

/// Render `post` as seen through `view`. The body appears only for members.
pub fn post_page(config: &SiteConfig, post: &Post, view: &GatedView) -> String {
    let state = view.state();

    let mut head = String::new();
    if let Some(og_image) = &post.og_image {
        head.push_str(&format!(
            r#"    <meta property="og:image" content="{}">
"#,
            escape(og_image)
        ));
    }
    if state == GateState::Loading {
        head.push_str(&format!(
            r#"    <meta http-equiv="refresh" content="{}">
"#,
            config.serve.refresh_secs
        ));
    }

    let mut body = format!(
        r#"<h2 class="header"><a href="/">{}</a>.</h2>
"#,
        escape(&config.base.title)
    );

    if state == GateState::Loading {
        body.push_str("<h1 class=\"post-title\">Loading…</h1>\n");
    } else {
        body.push_str(&format!(
            r#"<article>
    <h1 class="post-title">{title}</h1>
    {avatar}
    <div class="cover-wrap">{cover}</div>
    <div class="narrow">{date}</div>
{panel}
</article>
"#,
            title = escape(&post.title),
            avatar = avatar(post),
            cover = cover_image(post, false),
            date = date(post),
            panel = gate_panel(&state, post, view),
        ));
    }

    layout(
        config,
        &Page {
            title: &config.base.post_title(&post.title),
            head: &head,
            body: &body,
            connected: view.session().is_connected(),
        },
    )
}

fn gate_panel(state: &GateState, post: &Post, view: &GatedView) -> String {
    let url = post.url();
    match state {
        GateState::ConnectedWithAccess => {
            format!(r#"<div class="narrow post-body">{}</div>"#, post.content)
        }
        GateState::Disconnected => format!(
            r#"<div class="narrow panel">
    <p>You are not connected...</p>
    {}
</div>"#,
            connect_widget(view.session(), &url)
        ),
        GateState::ConnectedNoAccess => format!(
            r#"<div class="narrow panel">
    <p>You don't have access! Please purchase a membership!</p>
    <form method="post" action="/checkout/{slug}">
        <button type="submit" class="button">Purchase membership</button>
    </form>
</div>"#,
            slug = escape(&post.slug)
        ),
        GateState::AccessFailed(reason) => format!(
            r#"<div class="narrow panel">
    <p>We could not check your membership.</p>
    <p class="reason">{reason}</p>
    <form method="post" action="/retry/{slug}">
        <button type="submit" class="button">Try again</button>
    </form>
</div>"#,
            reason = escape(reason),
            slug = escape(&post.slug)
        ),
        GateState::Loading => String::new(),
    }
}
