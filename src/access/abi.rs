//! `balanceOf(address)` call encoding.
//!
//! The lock contract is ERC-721 compatible, so membership is a plain
//! `balanceOf(owner) -> uint256` read.

use super::{AccessError, Address};

/// First four bytes of `keccak256("balanceOf(address)")`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// ABI word size.
const WORD: usize = 32;

/// Build the `eth_call` data field for `balanceOf(owner)`.
pub fn encode_balance_of(owner: &Address) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&[0u8; WORD - Address::LEN]);
    data.extend_from_slice(owner.as_bytes());
    format!("0x{}", hex::encode(data))
}

/// A `uint256` balance as returned by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance([u8; WORD]);

impl Balance {
    #[cfg(test)]
    pub fn from_u64(value: u64) -> Self {
        let mut word = [0u8; WORD];
        word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }

    /// Membership means holding at least one key.
    pub fn is_positive(&self) -> bool {
        self.0.iter().any(|&b| b != 0)
    }

    /// Low 64 bits, saturating; only used for log output.
    pub fn saturating_u64(&self) -> u64 {
        if self.0[..WORD - 8].iter().any(|&b| b != 0) {
            return u64::MAX;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[WORD - 8..]);
        u64::from_be_bytes(low)
    }
}

/// Decode the hex return data of `balanceOf`.
///
/// An empty result (`0x`) means the target has no code at that address,
/// which is reported as an error instead of a zero balance.
pub fn decode_balance(data: &str) -> Result<Balance, AccessError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    if digits.is_empty() {
        return Err(AccessError::Decode(
            "empty return data, is the lock deployed on this network?".into(),
        ));
    }

    let bytes = hex::decode(digits).map_err(|e| AccessError::Decode(e.to_string()))?;
    if bytes.len() < WORD {
        return Err(AccessError::Decode(format!(
            "expected a {WORD}-byte word, got {} bytes",
            bytes.len()
        )));
    }

    let mut word = [0u8; WORD];
    word.copy_from_slice(&bytes[..WORD]);
    Ok(Balance(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_balance_of() {
        let owner = Address::parse("0x00000000000000000000000000000000deadbeef").unwrap();
        let data = encode_balance_of(&owner);

        assert_eq!(data.len(), 2 + (4 + 32) * 2);
        assert!(data.starts_with("0x70a08231"));
        assert!(data.ends_with("00000000000000000000000000000000deadbeef"));
        assert_eq!(&data[10..34], "000000000000000000000000");
    }

    #[test]
    fn test_decode_zero_and_positive() {
        let zero = format!("0x{}", "0".repeat(64));
        let one = format!("0x{}1", "0".repeat(63));

        assert!(!decode_balance(&zero).unwrap().is_positive());
        let balance = decode_balance(&one).unwrap();
        assert!(balance.is_positive());
        assert_eq!(balance.saturating_u64(), 1);
        assert_eq!(balance, Balance::from_u64(1));
    }

    #[test]
    fn test_decode_large_balance_saturates() {
        let big = format!("0x01{}", "0".repeat(62));
        let balance = decode_balance(&big).unwrap();
        assert!(balance.is_positive());
        assert_eq!(balance.saturating_u64(), u64::MAX);
    }

    #[test]
    fn test_decode_rejects_bad_data() {
        assert!(decode_balance("0x").is_err());
        assert!(decode_balance("0x1234").is_err());
        assert!(decode_balance("0xzz").is_err());
        assert!(!Balance::from_u64(0).is_positive());
    }
}
