//! Membership checks against the on-chain lock.
//!
//! ```text
//! WalletSession.address ──► query_access() ──► AccessOracle::balance_of()
//!                                  │                     │
//!                                  ▼                     ▼
//!                            AccessResult         eth_call balanceOf
//! ```

mod abi;
mod address;
mod error;
mod oracle;
mod rpc;

pub use abi::Balance;
pub use address::Address;
pub use error::AccessError;
pub use oracle::{AccessOracle, AccessResult, OracleFuture, query_access};
pub use rpc::RpcOracle;

#[cfg(test)]
pub(crate) use oracle::tests as testing;

/// The membership contract: an address on a fixed network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    pub address: Address,
    pub network: u64,
}
