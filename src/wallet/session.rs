//! Connection state between one visitor and their wallet.

/// Connected wallet address, if any.
///
/// Starts disconnected. The address is whatever the wallet reported; it is
/// only checked for presence here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    address: Option<String>,
}

impl WalletSession {
    pub const fn new() -> Self {
        Self { address: None }
    }

    /// Bind `address`. Blank input leaves the session unchanged and returns `false`.
    pub fn connect(&mut self, address: &str) -> bool {
        let address = address.trim();
        if address.is_empty() {
            return false;
        }
        self.address = Some(address.to_owned());
        true
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub const fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// First eight characters of the address followed by an ellipsis.
    pub fn display_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        let prefix: String = address.chars().take(8).collect();
        Some(format!("{prefix}…"))
    }
}
