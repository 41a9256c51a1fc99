//! `[lock]` section configuration.
//!
//! Identifies the membership contract and how it is queried.

use super::defaults;
use crate::access::{AccessError, Address, Lock};
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[lock]` section in lockblog.toml - the on-chain membership lock.
///
/// # Example
/// ```toml
/// [lock]
/// address = "0x8C1C77B37549De45834739f8cf8b9181D690e2bf"
/// network = 5
/// rpc_url = "https://rpc.ankr.com/eth_goerli"
/// watch = true
/// watch_interval_secs = 12
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    /// Lock contract address.
    #[serde(default = "defaults::lock::address")]
    #[educe(Default = defaults::lock::address())]
    pub address: String,

    /// Chain id the lock is deployed on.
    #[serde(default = "defaults::lock::network")]
    #[educe(Default = defaults::lock::network())]
    pub network: u64,

    /// JSON-RPC endpoint for `network`.
    #[serde(default = "defaults::lock::rpc_url")]
    #[educe(Default = defaults::lock::rpc_url())]
    pub rpc_url: String,

    /// Keep re-querying connected sessions so purchases show up without a reload.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub watch: bool,

    /// Seconds between watch re-queries (roughly one block).
    #[serde(default = "defaults::lock::watch_interval_secs")]
    #[educe(Default = defaults::lock::watch_interval_secs())]
    pub watch_interval_secs: u64,

    /// Reject an endpoint whose `eth_chainId` differs from `network`.
    #[serde(default)]
    pub verify_chain: bool,
}

impl LockConfig {
    /// Parse the configured address into a [`Lock`].
    pub fn lock(&self) -> Result<Lock, AccessError> {
        Ok(Lock {
            address: Address::parse(&self.address)?,
            network: self.network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_lock_config_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            title = "Test"
            description = "Test"
        "#,
        )
        .unwrap();

        assert_eq!(
            config.lock.address,
            "0x8C1C77B37549De45834739f8cf8b9181D690e2bf"
        );
        assert_eq!(config.lock.network, 5);
        assert!(config.lock.watch);
        assert!(!config.lock.verify_chain);

        let lock = config.lock.lock().unwrap();
        assert_eq!(lock.network, 5);
        assert_eq!(
            lock.address.to_string(),
            "0x8c1c77b37549de45834739f8cf8b9181d690e2bf"
        );
    }

    #[test]
    fn test_lock_config_custom() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            title = "Test"
            description = "Test"

            [lock]
            address = "0x0000000000000000000000000000000000000001"
            network = 137
            rpc_url = "https://polygon-rpc.com"
            watch = false
            verify_chain = true
        "#,
        )
        .unwrap();

        assert_eq!(config.lock.network, 137);
        assert_eq!(config.lock.rpc_url, "https://polygon-rpc.com");
        assert!(!config.lock.watch);
        assert!(config.lock.verify_chain);
    }

    #[test]
    fn test_lock_config_bad_address() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            title = "Test"
            description = "Test"
            [lock]
            address = "0x1234"
        "#,
        )
        .unwrap();

        assert!(config.lock.lock().is_err());
    }
}
