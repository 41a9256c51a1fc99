//! Connecting a session through an injected wallet.

use super::WalletSession;
use thiserror::Error;

/// Why a wallet could not hand out an account.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("request rejected: {0}")]
    Rejected(String),
}

/// An EIP-1193 style provider, reduced to the one request the blog needs.
pub trait WalletProvider {
    /// `eth_requestAccounts`: accounts the visitor agreed to expose.
    fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

/// Produces a provider, or `None` when no wallet is present.
pub type ProviderFactory<'a> = Box<dyn Fn() -> Option<Box<dyn WalletProvider + 'a>> + 'a>;

/// Something that can bind a wallet address to a session.
pub trait Connector {
    /// Name shown to the visitor.
    fn name(&self) -> &str;

    /// Try to connect. Failures leave the session untouched and return `false`.
    fn connect(&self, session: &mut WalletSession) -> bool;
}

/// Connector over an injected provider obtained from a factory.
pub struct InjectedConnector<'a> {
    name: String,
    factory: ProviderFactory<'a>,
}

impl<'a> InjectedConnector<'a> {
    pub fn new(name: impl Into<String>, factory: ProviderFactory<'a>) -> Self {
        Self {
            name: name.into(),
            factory,
        }
    }
}

impl Connector for InjectedConnector<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn connect(&self, session: &mut WalletSession) -> bool {
        let Some(provider) = (self.factory)() else {
            return false;
        };
        match provider.request_accounts() {
            Ok(accounts) => accounts
                .first()
                .is_some_and(|account| session.connect(account)),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider(Result<Vec<String>, WalletError>);

    impl WalletProvider for StaticProvider {
        fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            self.0.clone()
        }
    }

    fn connector(result: Option<Result<Vec<String>, WalletError>>) -> InjectedConnector<'static> {
        InjectedConnector::new(
            "Test Wallet",
            Box::new(move || {
                result
                    .clone()
                    .map(|r| Box::new(StaticProvider(r)) as Box<dyn WalletProvider>)
            }),
        )
    }

    #[test]
    fn test_connect_uses_first_account() {
        let mut session = WalletSession::new();
        let connector = connector(Some(Ok(vec!["0xaaa".into(), "0xbbb".into()])));

        assert_eq!(connector.name(), "Test Wallet");
        assert!(connector.connect(&mut session));
        assert_eq!(session.address(), Some("0xaaa"));
    }

    #[test]
    fn test_missing_wallet_fails_silently() {
        let mut session = WalletSession::new();
        assert!(!connector(None).connect(&mut session));
        assert!(!session.is_connected());
    }

    #[test]
    fn test_rejected_request_keeps_session() {
        let mut session = WalletSession::new();
        session.connect("0xaaa");

        let rejected = connector(Some(Err(WalletError::Rejected("user denied".into()))));
        assert!(!rejected.connect(&mut session));
        assert!(!connector(Some(Ok(vec![]))).connect(&mut session));
        assert_eq!(session.address(), Some("0xaaa"));
    }
}
