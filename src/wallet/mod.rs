//! Wallet session and connectors.

mod connector;
mod session;

pub use connector::{Connector, InjectedConnector, ProviderFactory, WalletError, WalletProvider};
pub use session::WalletSession;
