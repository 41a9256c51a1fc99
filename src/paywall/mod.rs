//! Paywall client: wallet provider and checkout for the configured lock.
//!
//! One [`Paywall`] is built from the config at startup and passed to whoever
//! needs it.

mod checkout;
mod provider;

pub use checkout::{Checkout, CheckoutRequest, HostedCheckout};
pub use provider::PaywallProvider;

use crate::{
    access::AccessError,
    config::{LockConfig, PaywallConfig},
    wallet::{InjectedConnector, WalletProvider},
};
use rustc_hash::FxHashMap;

/// What the page reported after asking the browser wallet for accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    pub accounts: Vec<String>,
    pub error: Option<String>,
}

impl Handshake {
    /// Read `address` and `error` fields of the connect form.
    pub fn from_form(form: &FxHashMap<String, String>) -> Self {
        let accounts = form
            .get("address")
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_owned)
            .into_iter()
            .collect();
        let error = form
            .get("error")
            .filter(|e| !e.trim().is_empty())
            .cloned();
        Self { accounts, error }
    }

    /// Nothing was reported: the page found no injected wallet.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.error.is_none()
    }
}

pub struct Paywall {
    provider_name: String,
    request: CheckoutRequest,
    checkout: HostedCheckout,
}

impl Paywall {
    pub fn new(lock: &LockConfig, config: &PaywallConfig) -> Result<Self, AccessError> {
        Ok(Self {
            provider_name: config.provider_name.clone(),
            request: CheckoutRequest::for_lock(lock, config)?,
            checkout: HostedCheckout::new(&config.checkout_url),
        })
    }

    /// Provider for one handshake, `None` when no wallet answered.
    pub fn provider(&self, handshake: &Handshake) -> Option<PaywallProvider> {
        if handshake.is_empty() {
            return None;
        }
        Some(PaywallProvider::new(
            handshake.accounts.clone(),
            handshake.error.clone(),
        ))
    }

    /// Injected connector named after the provider, fed by this paywall.
    pub fn connector<'a>(&'a self, handshake: &'a Handshake) -> InjectedConnector<'a> {
        InjectedConnector::new(
            self.provider_name.clone(),
            Box::new(move || {
                self.provider(handshake)
                    .map(|p| Box::new(p) as Box<dyn WalletProvider>)
            }),
        )
    }

    pub fn checkout_request(&self) -> &CheckoutRequest {
        &self.request
    }

    /// Hosted checkout URL for `request`.
    pub fn checkout_url(&self, request: &CheckoutRequest, redirect_uri: Option<&str>) -> String {
        self.checkout.checkout_url(request, redirect_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{utils::query::parse_query, wallet::{Connector, WalletSession}};

    fn paywall() -> Paywall {
        Paywall::new(&LockConfig::default(), &PaywallConfig::default()).unwrap()
    }

    #[test]
    fn test_handshake_from_form() {
        let handshake = Handshake::from_form(&parse_query("address=0xabc&next=%2F"));
        assert_eq!(handshake.accounts, ["0xabc"]);
        assert!(handshake.error.is_none());

        let handshake = Handshake::from_form(&parse_query("address=&error="));
        assert!(handshake.is_empty());
    }

    #[test]
    fn test_connector_connects_session() {
        let paywall = paywall();
        let handshake = Handshake {
            accounts: vec!["0x8C1C77B37549De45834739f8cf8b9181D690e2bf".into()],
            error: None,
        };
        let connector = paywall.connector(&handshake);
        let mut session = WalletSession::new();

        assert_eq!(connector.name(), "Unlock Paywall Provider");
        assert!(connector.connect(&mut session));
        assert_eq!(session.display_address().as_deref(), Some("0x8C1C77…"));
    }

    #[test]
    fn test_no_wallet_no_provider() {
        let paywall = paywall();
        let handshake = Handshake::default();
        assert!(paywall.provider(&handshake).is_none());

        let mut session = WalletSession::new();
        assert!(!paywall.connector(&handshake).connect(&mut session));
        assert!(!session.is_connected());
    }

    #[test]
    fn test_checkout_request_matches_lock() {
        let paywall = paywall();
        let request = paywall.checkout_request();
        assert_eq!(request.lock_address, "0x8C1C77B37549De45834739f8cf8b9181D690e2bf");
        assert_eq!(request.network, 5);
        assert!(paywall.checkout_url(request, None).starts_with("https://app.unlock-protocol.com/checkout?paywallConfig="));
    }
}
