//! Membership purchase through the hosted checkout.

use crate::{
    access::AccessError,
    config::{LockConfig, PaywallConfig},
};
use serde_json::{Map, Value, json};

/// Everything the checkout needs to sell a key of one lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Lock address exactly as configured.
    pub lock_address: String,
    pub network: u64,
    pub pessimistic: bool,
    pub skip_recipient: bool,
    pub title: Option<String>,
}

impl CheckoutRequest {
    /// Build the request for the configured lock. The address must parse.
    pub fn for_lock(lock: &LockConfig, paywall: &PaywallConfig) -> Result<Self, AccessError> {
        let parsed = lock.lock()?;
        Ok(Self {
            lock_address: lock.address.trim().to_owned(),
            network: parsed.network,
            pessimistic: paywall.pessimistic,
            skip_recipient: paywall.skip_recipient,
            title: paywall.title.clone(),
        })
    }

    /// Paywall config object: `locks` is keyed by the lock address value.
    ///
    /// ```json
    /// {"locks":{"0x8C1C…e2bf":{"network":5}},"pessimistic":true,"skipRecipient":true}
    /// ```
    pub fn to_paywall_config(&self) -> Value {
        let mut locks = Map::new();
        locks.insert(self.lock_address.clone(), json!({ "network": self.network }));

        let mut config = json!({
            "locks": locks,
            "pessimistic": self.pessimistic,
            "skipRecipient": self.skip_recipient,
        });
        if let Some(title) = &self.title {
            config["title"] = json!(title);
        }
        config
    }
}

/// Opens a purchase flow for a request.
pub trait Checkout {
    /// URL that starts the purchase, returning to `redirect_uri` when done.
    fn checkout_url(&self, request: &CheckoutRequest, redirect_uri: Option<&str>) -> String;
}

/// The hosted checkout page, configured through its query string.
#[derive(Debug, Clone)]
pub struct HostedCheckout {
    base_url: String,
}

impl HostedCheckout {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Checkout for HostedCheckout {
    fn checkout_url(&self, request: &CheckoutRequest, redirect_uri: Option<&str>) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        let config = request.to_paywall_config().to_string();
        let mut url = format!(
            "{}{separator}paywallConfig={}",
            self.base_url,
            urlencoding::encode(&config)
        );
        if let Some(redirect) = redirect_uri {
            url.push_str("&redirectUri=");
            url.push_str(&urlencoding::encode(redirect));
        }
        url
    }
}
