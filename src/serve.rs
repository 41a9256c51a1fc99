//! Gated blog server.
//!
//! Built on `tiny_http`:
//!
//! - `/` and `/posts/<slug>/` rendered per visitor through their gated view
//! - `POST /connect`, `/checkout/<slug>`, `/retry/<slug>` drive the gate
//! - `GET /api/access` reports the gate state as JSON
//! - everything else served from the build output directory
//! - content watching with rebuild, graceful shutdown on Ctrl+C
//!
//! ```text
//! ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │   Main Thread   │   │  Watcher Thread  │   │  tokio runtime   │
//! │  (HTTP Server)  │   │  (File Monitor)  │   │ (oracle queries) │
//! └────────┬────────┘   └────────┬─────────┘   └────────┬─────────┘
//!          │                     │                      │
//!          ▼                     ▼                      ▼
//!     route() → Reply     build_site() → swap    AccessResolved{epoch}
//!          └──────────── ServeContext ──────────────────┘
//! ```

use crate::{
    access::AccessOracle,
    config::SiteConfig,
    content::PostStore,
    gate::{Effect, GateEvent, GateState},
    log,
    paywall::{Handshake, Paywall},
    render,
    session::{AccessDriver, SESSION_COOKIE, SessionStore, SharedView, session_id_from_cookie},
    utils::query::{is_local_path, parse_query, split_url},
    wallet::Connector,
    watch::watch_for_changes_blocking,
};
use anyhow::{Context, Result, anyhow};
use arc_swap::ArcSwap;
use serde_json::json;
use std::{
    fs,
    io::{Cursor, Read},
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tokio::runtime::Handle;

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Largest accepted form body.
const MAX_FORM_BYTES: u64 = 16 * 1024;

/// Everything a request handler needs, passed explicitly.
pub struct ServeContext {
    pub config: SiteConfig,
    pub paywall: Paywall,
    pub posts: ArcSwap<PostStore>,
    pub sessions: Arc<SessionStore>,
    pub driver: Arc<AccessDriver>,
}

impl ServeContext {
    pub fn new(
        config: SiteConfig,
        paywall: Paywall,
        posts: PostStore,
        oracle: Arc<dyn AccessOracle>,
        runtime: Handle,
    ) -> Result<Self> {
        let lock = config.lock.lock()?;
        let sessions = Arc::new(SessionStore::new(paywall.checkout_request().clone()));
        let driver = Arc::new(AccessDriver::new(oracle, lock, runtime));
        Ok(Self {
            config,
            paywall,
            posts: ArcSwap::from_pointee(posts),
            sessions,
            driver,
        })
    }

    /// Site origin used in checkout redirects.
    fn origin(&self) -> &str {
        self.config
            .base
            .url
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
    }
}

/// Bind the configured address, moving to the next free port on conflict.
///
/// When the port moves, a `base.url` derived from the old port follows it.
pub fn bind(config: &mut SiteConfig) -> Result<(Server, SocketAddr)> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;

    let derived = format!("http://{}:{}", config.serve.interface, config.serve.port);
    if addr.port() != config.serve.port && config.base.url.as_deref() == Some(derived.as_str()) {
        config.base.url = Some(format!("http://{}:{}", config.serve.interface, addr.port()));
    }
    config.serve.port = addr.port();
    Ok((server, addr))
}

/// Serve until Ctrl+C.
pub fn serve_site(server: Server, ctx: Arc<ServeContext>) -> Result<()> {
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", server.server_addr());

    if ctx.config.serve.watch {
        let ctx = Arc::clone(&ctx);
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(&ctx.config, &ctx.paywall, &ctx.posts) {
                log!("watch"; "{err}");
            }
        });
    }

    if ctx.config.lock.watch {
        let interval = Duration::from_secs(ctx.config.lock.watch_interval_secs);
        ctx.driver.spawn_watch(Arc::downgrade(&ctx.sessions), interval);
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &ctx) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Outcome of routing one request.
#[derive(Debug, PartialEq, Eq)]
enum Body {
    Html(String),
    Json(String),
    Redirect(String),
    File(PathBuf),
    NotFound,
}

#[derive(Debug)]
struct Reply {
    body: Body,
    /// New session id to hand out.
    set_session: Option<String>,
}

fn handle_request(mut request: Request, ctx: &ServeContext) -> Result<()> {
    let cookie = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Cookie"))
        .map(|h| h.value.as_str().to_owned());

    let mut form = String::new();
    if *request.method() == Method::Post {
        request
            .as_reader()
            .take(MAX_FORM_BYTES)
            .read_to_string(&mut form)
            .context("Failed to read request body")?;
    }

    let reply = route(ctx, request.method(), request.url(), cookie.as_deref(), &form);
    respond(request, reply)
}

/// Decide the response for one request.
fn route(ctx: &ServeContext, method: &Method, url: &str, cookie: Option<&str>, form: &str) -> Reply {
    let (path, _) = split_url(url);
    let path = urlencoding::decode(path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| path.to_owned());

    let session_id = cookie.and_then(session_id_from_cookie);
    let (view, set_session) = ctx.sessions.get_or_create(session_id);

    let body = match (method, path.as_str()) {
        (Method::Get, "/" | "/index.html") => {
            let posts = ctx.posts.load();
            let session = view.lock().session().clone();
            Body::Html(render::index_page(&ctx.config, posts.all(), &session))
        }
        (Method::Get, "/api/access") => Body::Json(access_json(&view)),
        (Method::Post, "/connect") => connect(ctx, &view, form),
        (Method::Post, p) if p.starts_with("/checkout/") => {
            checkout(ctx, &view, p.trim_start_matches("/checkout/").trim_matches('/'))
        }
        (Method::Post, p) if p.starts_with("/retry/") => {
            retry(ctx, &view, p.trim_start_matches("/retry/").trim_matches('/'))
        }
        (Method::Get, p) if p.starts_with("/posts/") => match post_slug(p) {
            Some(slug) => post(ctx, &view, slug),
            None => static_file(&ctx.config.build.output, &path),
        },
        (Method::Get | Method::Head, _) => static_file(&ctx.config.build.output, &path),
        _ => Body::NotFound,
    };

    Reply { body, set_session }
}

/// `/posts/<slug>/` (with or without trailing slash or `index.html`).
fn post_slug(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/posts/")?;
    let rest = rest.strip_suffix("index.html").unwrap_or(rest);
    let slug = rest.trim_end_matches('/');
    (!slug.is_empty() && !slug.contains('/')).then_some(slug)
}

fn post(ctx: &ServeContext, view: &SharedView, slug: &str) -> Body {
    let posts = ctx.posts.load();
    match posts.get(slug) {
        Some(post) => Body::Html(render::post_page(&ctx.config, post, &view.lock())),
        None => Body::NotFound,
    }
}

fn connect(ctx: &ServeContext, view: &SharedView, form: &str) -> Body {
    let form = parse_query(form);
    let next = form
        .get("next")
        .map(String::as_str)
        .filter(|next| is_local_path(next))
        .unwrap_or("/")
        .to_owned();

    let handshake = Handshake::from_form(&form);
    let connector = ctx.paywall.connector(&handshake);

    let mut session = view.lock().session().clone();
    let was_connected = session.is_connected();
    if connector.connect(&mut session)
        && let Some(address) = session.address()
    {
        log!("session"; "{} connected via {}", short(address), connector.name());
        let event = if was_connected {
            GateEvent::AddressChanged(address.to_owned())
        } else {
            GateEvent::Connect(address.to_owned())
        };
        ctx.driver.dispatch(view, event);
    }

    Body::Redirect(next)
}

fn checkout(ctx: &ServeContext, view: &SharedView, slug: &str) -> Body {
    let back = format!("/posts/{slug}/");
    if ctx.posts.load().get(slug).is_none() {
        return Body::NotFound;
    }

    let effects = ctx.driver.dispatch(view, GateEvent::CheckoutOpened);
    for effect in effects {
        if let Effect::OpenCheckout(request) = effect {
            let redirect_uri = format!("{}{back}", ctx.origin());
            log!("checkout"; "{} on network {}", request.lock_address, request.network);
            return Body::Redirect(ctx.paywall.checkout_url(&request, Some(&redirect_uri)));
        }
    }
    Body::Redirect(back)
}

fn retry(ctx: &ServeContext, view: &SharedView, slug: &str) -> Body {
    let posts = ctx.posts.load();
    let Some(post) = posts.get(slug) else {
        return Body::NotFound;
    };
    ctx.driver.dispatch(view, GateEvent::Refresh);
    Body::Redirect(post.url())
}

fn access_json(view: &SharedView) -> String {
    let view = view.lock();
    let gate = view.state();
    let (state, reason) = match &gate {
        GateState::Disconnected => ("disconnected", None),
        GateState::Loading => ("loading", None),
        GateState::ConnectedNoAccess => ("no_access", None),
        GateState::ConnectedWithAccess => ("access", None),
        GateState::AccessFailed(reason) => ("failed", Some(reason)),
    };
    json!({
        "state": state,
        "address": view.session().address(),
        "reason": reason,
        "member": gate.shows_body(),
        "epoch": view.epoch(),
    })
    .to_string()
}

fn short(address: &str) -> String {
    let prefix: String = address.chars().take(10).collect();
    format!("{prefix}…")
}

/// Map a request path onto a file below `root`; `..` is never followed.
fn static_file(root: &Path, path: &str) -> Body {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Body::NotFound;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Body::File(local);
    }
    let index = local.join("index.html");
    if local.is_dir() && index.is_file() {
        return Body::File(index);
    }
    Body::NotFound
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header {name}: {value}"))
}

fn respond(request: Request, reply: Reply) -> Result<()> {
    let cookie = reply
        .set_session
        .map(|id| header("Set-Cookie", &format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")))
        .transpose()?;

    let mut response = match reply.body {
        Body::Html(html) => Response::from_string(html)
            .with_header(header("Content-Type", "text/html; charset=utf-8")?)
            .boxed(),
        Body::Json(json) => Response::from_string(json)
            .with_header(header("Content-Type", "application/json")?)
            .with_header(header("Cache-Control", "no-store")?)
            .boxed(),
        Body::Redirect(location) => Response::empty(StatusCode(303))
            .with_header(header("Location", &location)?)
            .boxed(),
        Body::File(path) => {
            let content = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            Response::from_data(content)
                .with_header(header("Content-Type", guess_content_type(&path))?)
                .boxed()
        }
        Body::NotFound => Response::new(
            StatusCode(404),
            vec![header("Content-Type", "text/plain")?],
            Cursor::new("404 Not Found"),
            Some(13),
            None,
        )
        .boxed(),
    };

    if let Some(cookie) = cookie {
        response.add_header(cookie);
    }
    request.respond(response)?;
    Ok(())
}

/// MIME type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
