//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn email() -> String {
        "user@noreply.lockblog".into()
    }

    pub fn language() -> String {
        "en".into()
    }

    pub fn cms_name() -> String {
        "Markdown".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn content() -> PathBuf {
        "_posts".into()
    }

    pub fn output() -> PathBuf {
        "out".into()
    }

    pub fn assets() -> PathBuf {
        "public".into()
    }

    pub mod rss {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "feed.xml".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }

    pub fn refresh_secs() -> u64 {
        2
    }
}

// ============================================================================
// [lock] Section Defaults
// ============================================================================

pub mod lock {
    pub fn address() -> String {
        "0x8C1C77B37549De45834739f8cf8b9181D690e2bf".into()
    }

    pub fn network() -> u64 {
        5
    }

    pub fn rpc_url() -> String {
        "https://rpc.ankr.com/eth_goerli".into()
    }

    pub fn watch_interval_secs() -> u64 {
        12
    }
}

// ============================================================================
// [paywall] Section Defaults
// ============================================================================

pub mod paywall {
    pub fn provider_name() -> String {
        "Unlock Paywall Provider".into()
    }

    pub fn checkout_url() -> String {
        "https://app.unlock-protocol.com/checkout".into()
    }
}
