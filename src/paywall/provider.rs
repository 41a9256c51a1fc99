//! Wallet provider backed by the paywall's connect handshake.
//!
//! The page script asks the browser wallet for accounts and posts the answer
//! (or the rejection) back; this provider replays that answer to the
//! connector.

use crate::wallet::{WalletError, WalletProvider};

/// Answer of one connect handshake.
#[derive(Debug, Clone)]
pub struct PaywallProvider {
    accounts: Vec<String>,
    rejection: Option<String>,
}

impl PaywallProvider {
    pub(super) const fn new(accounts: Vec<String>, rejection: Option<String>) -> Self {
        Self { accounts, rejection }
    }
}

impl WalletProvider for PaywallProvider {
    fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        if let Some(reason) = &self.rejection {
            return Err(WalletError::Rejected(reason.clone()));
        }
        if self.accounts.is_empty() {
            return Err(WalletError::NoAccounts);
        }
        Ok(self.accounts.clone())
    }
}
