//! Read-only membership query.

use super::{AccessError, Address, Balance, Lock};
use crate::log;
use std::{future::Future, pin::Pin};

/// Boxed future returned by [`AccessOracle::balance_of`].
pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<Balance, AccessError>> + Send + 'a>>;

/// Something that can read a lock's `balanceOf` for an owner.
pub trait AccessOracle: Send + Sync {
    fn balance_of<'a>(&'a self, lock: &'a Lock, owner: &'a Address) -> OracleFuture<'a>;
}

/// Outcome of the membership query for the connected address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    /// Query issued, no answer yet.
    Loading,
    /// `true` when the balance is positive.
    Resolved(bool),
    /// The query failed; carries a displayable reason.
    Failed(String),
}

/// Query the oracle for `owner` and project the balance onto access.
///
/// The owner string comes straight from the wallet session, so a malformed
/// address becomes a failed result rather than an error.
pub async fn query_access(oracle: &dyn AccessOracle, lock: &Lock, owner: &str) -> AccessResult {
    let owner = match Address::parse(owner) {
        Ok(owner) => owner,
        Err(err) => return AccessResult::Failed(err.reason()),
    };

    match oracle.balance_of(lock, &owner).await {
        Ok(balance) => {
            log!("oracle"; "{} holds {} key(s)", short(&owner), balance.saturating_u64());
            AccessResult::Resolved(balance.is_positive())
        }
        Err(err) => {
            log!("oracle"; "balanceOf({}) failed: {err:#}", short(&owner));
            AccessResult::Failed(err.reason())
        }
    }
}

fn short(owner: &Address) -> String {
    let text = owner.to_string();
    format!("{}…", &text[..10])
}
