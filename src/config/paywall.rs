//! `[paywall]` section configuration.
//!
//! Options passed to the hosted checkout and the wallet provider.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[paywall]` section in lockblog.toml.
///
/// # Example
/// ```toml
/// [paywall]
/// provider_name = "Unlock Paywall Provider"
/// pessimistic = true      # wait for the purchase to be mined
/// skip_recipient = true   # buy for the connected wallet only
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PaywallConfig {
    /// Display name of the wallet connector.
    #[serde(default = "defaults::paywall::provider_name")]
    #[educe(Default = defaults::paywall::provider_name())]
    pub provider_name: String,

    /// Hosted checkout page.
    #[serde(default = "defaults::paywall::checkout_url")]
    #[educe(Default = defaults::paywall::checkout_url())]
    pub checkout_url: String,

    /// Only grant access once the purchase transaction is confirmed.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub pessimistic: bool,

    /// Skip the recipient selection step of the checkout.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub skip_recipient: bool,

    /// Optional title shown by the checkout.
    #[serde(default)]
    pub title: Option<String>,
}
