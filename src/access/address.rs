//! Ethereum account addresses.

use super::AccessError;
use std::fmt;

/// A 20-byte account or contract address.
///
/// Parsing is case-insensitive; EIP-55 checksums are not verified. The
/// canonical text form is lowercase hex with a `0x` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// Parse `0x` followed by exactly 40 hex digits.
    pub fn parse(text: &str) -> Result<Self, AccessError> {
        let invalid = || AccessError::InvalidAddress(text.to_owned());

        let digits = text
            .trim()
            .strip_prefix("0x")
            .or_else(|| text.trim().strip_prefix("0X"))
            .ok_or_else(invalid)?;
        if digits.len() != Self::LEN * 2 {
            return Err(invalid());
        }

        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_case() {
        let addr = Address::parse("0x8C1C77B37549De45834739f8cf8b9181D690e2bf").unwrap();
        assert_eq!(addr.to_string(), "0x8c1c77b37549de45834739f8cf8b9181d690e2bf");
        assert_eq!(addr.as_bytes()[0], 0x8c);
        assert_eq!(addr.as_bytes()[19], 0xbf);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(Address::parse("  0x0000000000000000000000000000000000000001\n").is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "0x",
            "8C1C77B37549De45834739f8cf8b9181D690e2bf",
            "0x8C1C...e2bf",
            "0x8C1C77B37549De45834739f8cf8b9181D690e2",
            "0x8C1C77B37549De45834739f8cf8b9181D690e2bf00",
            "0xZZ1C77B37549De45834739f8cf8b9181D690e2bf",
        ] {
            assert!(Address::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
