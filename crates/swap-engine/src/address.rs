use std::fmt;

use tiny_keccak::{Hasher, Keccak};

/// A 20-byte EVM account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Parse a `0x`-prefixed 40-character hex address. Case is not checked.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
        if digits.len() != 40 {
            return None;
        }
        let bytes = hex::decode(digits).ok()?;
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&bytes);
        Some(Self(addr))
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let mut digest = [0u8; 32];
        let mut keccak = Keccak::v256();
        keccak.update(lower.as_bytes());
        keccak.finalize(&mut digest);

        // Digit `i` is uppercased when the matching digest nibble is >= 8,
        // i.e. when its high bit is set.
        let checksummed: String = lower
            .char_indices()
            .map(|(i, digit)| {
                let mask = if i % 2 == 0 { 0x80 } else { 0x08 };
                if digest[i / 2] & mask != 0 {
                    digit.to_ascii_uppercase()
                } else {
                    digit
                }
            })
            .collect();
        format!("0x{checksummed}")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

/// Checksummed form of `s` when it parses as an address, otherwise `s` itself.
pub fn display_address(s: &str) -> String {
    Address::parse(s)
        .map(|a| a.to_checksum())
        .unwrap_or_else(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip55_checksum() {
        let addr = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(addr.to_checksum(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(addr.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

        for expected in [
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let addr = Address::parse(&expected.to_lowercase()).unwrap();
            assert_eq!(addr.to_checksum(), expected);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Address::parse("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_none());
        assert!(Address::parse("0x5aaeb6").is_none());
        assert!(Address::parse("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_none());
        assert!(Address::parse("").is_none());
    }

    #[test]
    fn test_display_address_falls_back() {
        assert_eq!(display_address("not-an-address"), "not-an-address");
        assert_eq!(
            display_address("0X5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }
}
