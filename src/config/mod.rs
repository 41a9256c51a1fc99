//! Site configuration management for `lockblog.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[base]`    | Site metadata (title, author, url)               |
//! | `[build]`   | Source/output paths, minify, RSS                 |
//! | `[serve]`   | Gated server (port, interface, watch)            |
//! | `[lock]`    | Membership contract (address, network, RPC)      |
//! | `[paywall]` | Checkout options and wallet provider name        |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Blog."
//! description = "Members-only writing"
//! url = "https://example.com"
//!
//! [lock]
//! address = "0x8C1C77B37549De45834739f8cf8b9181D690e2bf"
//! network = 5
//!
//! [paywall]
//! pessimistic = true
//! ```
//!
//! The loaded config is handed to every component explicitly; nothing reads
//! it from a global.

mod base;
mod build;
pub mod defaults;
mod error;
mod lock;
mod paywall;
mod serve;

pub use error::ConfigError;
pub use lock::LockConfig;
pub use paywall::PaywallConfig;

use base::BaseConfig;
use build::BuildConfig;
use serve::ServeConfig;

use crate::access::Address;
use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing lockblog.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute project root (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Membership lock
    #[serde(default)]
    pub lock: LockConfig,

    /// Checkout options
    #[serde(default)]
    pub paywall: PaywallConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config named by the CLI, falling back to defaults when absent.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = Self::cli_root(cli);
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli, &root);
        Ok(config)
    }

    /// Root directory requested on the command line.
    fn cli_root(cli: &Cli) -> PathBuf {
        let base = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        match &cli.command {
            Commands::Init { name: Some(name) } => base.join(name),
            _ => base,
        }
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Some(args) = cli.build_args() {
            Self::update_option(&mut self.build.minify, args.minify.as_ref());
            Self::update_option(&mut self.build.rss.enable, args.rss.as_ref());
            self.build.clean |= args.clean;
            if let Some(url) = &args.base_url {
                self.base.url = Some(url.trim_end_matches('/').to_owned());
            }
        }

        if let Commands::Serve {
            interface,
            port,
            watch,
            build_args,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
            if build_args.base_url.is_none() {
                self.base.url = Some(format!(
                    "http://{}:{}",
                    self.serve.interface, self.serve.port
                ));
            }
        }

        self.update_path_with_root(root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all paths against the root directory
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = Self::normalize_path(root);
        self.config_path = Self::normalize_path(&root.join(config_name));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Absolute path of the feed file.
    pub fn rss_path(&self) -> PathBuf {
        self.build.output.join(&self.build.rss.path)
    }

    /// Validate configuration for the current command
    pub fn validate(&self, cli: &Cli) -> Result<()> {
        match (cli.is_init(), self.config_path.exists()) {
            (true, true) => bail!(
                "Config file already exists. Remove it manually or init in a different path."
            ),
            (true, false) => return Ok(()),
            (false, false) => bail!("Config file not found."),
            (false, true) => {}
        }

        if self.build.rss.enable && self.base.url.is_none() {
            bail!("[base.url] is required for RSS generation");
        }

        if let Some(base_url) = &self.base.url
            && !is_http_url(base_url)
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if Address::parse(&self.lock.address).is_err() {
            bail!(ConfigError::Validation(format!(
                "[lock.address] `{}` is not a 0x-prefixed 20-byte hex address",
                self.lock.address
            )));
        }

        if self.lock.network == 0 {
            bail!(ConfigError::Validation("[lock.network] must be a chain id > 0".into()));
        }

        if !is_http_url(&self.lock.rpc_url) {
            bail!(ConfigError::Validation(
                "[lock.rpc_url] must start with http:// or https://".into()
            ));
        }

        if !is_http_url(&self.paywall.checkout_url) {
            bail!(ConfigError::Validation(
                "[paywall.checkout_url] must start with http:// or https://".into()
            ));
        }

        if self.lock.watch && self.lock.watch_interval_secs == 0 {
            bail!(ConfigError::Validation(
                "[lock.watch_interval_secs] must be > 0 when watching".into()
            ));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ============================================================================
// Tests
// ============================================================================
