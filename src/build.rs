//! Static build: posts to HTML pages, assets, feed.
//!
//! ```text
//! build_site()
//!     │
//!     ├── PostStore::load()      markdown → Post records
//!     │
//!     ├── rayon::join
//!     │     ├── render pages     index.html, posts/<slug>/index.html
//!     │     └── copy assets      public/** → out/**
//!     │
//!     └── build_rss()            feed.xml
//! ```
//!
//! Post pages are written as a disconnected visitor sees them, so the
//! output directory never holds a gated body.

use crate::{
    config::SiteConfig,
    content::{Post, PostStore},
    gate::GatedView,
    generator::rss::build_rss,
    log,
    logger::ProgressBars,
    paywall::Paywall,
    render,
    utils::minify::{MinifyType, minify},
    wallet::WalletSession,
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use walkdir::WalkDir;

/// Build the whole site into `config.build.output` and return the loaded posts.
pub fn build_site(config: &SiteConfig, paywall: &Paywall) -> Result<PostStore> {
    let output = &config.build.output;

    prepare_output(output, config.build.clean)?;

    let posts = PostStore::load(&config.build.content)
        .with_context(|| format!("Failed to load posts from {}", config.build.content.display()))?;
    log!("content"; "{} posts", posts.len());

    let asset_files = collect_all_files(&config.build.assets);
    let progress = ProgressBars::new_filtered(&[("posts", posts.len()), ("assets", asset_files.len())]);
    let has_error = AtomicBool::new(false);

    let (pages_result, assets_result) = rayon::join(
        || {
            posts.all().par_iter().try_for_each(|post| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = write_post_page(config, post, paywall) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", post.source.display(), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                if let Some(progress) = &progress {
                    progress.inc(0);
                }
                Ok(())
            })
        },
        || {
            asset_files.par_iter().try_for_each(|path| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = copy_asset(path, &config.build.assets, output) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", path.display(), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                if let Some(progress) = &progress {
                    // Bar 0 is filtered out when there are no posts.
                    progress.inc(usize::from(!posts.is_empty()));
                }
                Ok(())
            })
        },
    );

    if let Some(progress) = &progress {
        progress.finish();
    }
    pages_result?;
    assets_result?;

    let index = render::index_page(config, posts.all(), &WalletSession::new());
    write_html(config, &output.join("index.html"), &index)?;

    build_rss(config, &posts)?;

    log!("build"; "done, {} pages", posts.len() + 1);
    Ok(posts)
}

/// Create the output directory, clearing it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

fn write_post_page(config: &SiteConfig, post: &Post, paywall: &Paywall) -> Result<()> {
    let view = GatedView::new(paywall.checkout_request().clone());
    let html = render::post_page(config, post, &view);
    write_html(config, &post_output_path(&config.build.output, post), &html)
}

/// `out/posts/<slug>/index.html`
pub fn post_output_path(output: &Path, post: &Post) -> PathBuf {
    output.join("posts").join(&post.slug).join("index.html")
}

fn write_html(config: &SiteConfig, path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let html = minify(MinifyType::Html(html.as_bytes()), config);
    fs::write(path, &*html).with_context(|| format!("Failed to write {}", path.display()))
}

/// Every file below `dir`; missing directory means no files.
fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Copy `path` from the assets tree to the same relative place in `output`.
fn copy_asset(path: &Path, assets: &Path, output: &Path) -> Result<()> {
    let relative = path
        .strip_prefix(assets)
        .with_context(|| format!("{} is outside {}", path.display(), assets.display()))?;
    let dest = output.join(relative);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(path, &dest)?;
    Ok(())
}
