use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw size of an account address in bytes
pub const ADDRESS_SIZE: usize = 20;
/// Expected length of the hex form, "0x" prefix included
pub const ADDRESS_HEX_LENGTH: usize = 2 + ADDRESS_SIZE * 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with \"0x\"")]
    MissingPrefix,
    #[error("address must be exactly {ADDRESS_HEX_LENGTH} characters long (including \"0x\"), current length: {0}")]
    InvalidLength(usize),
    #[error("address must contain only valid hexadecimal characters (0-9, a-f, A-F) after \"0x\"")]
    InvalidHex,
}

/// A 20-byte account identifier, externally supplied by the
/// wallet-connection collaborator
///
/// Parsed from and displayed as the usual "0x"-prefixed hex form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Shortened form used for display badges: first 6 and last 4 characters
    /// of the hex representation ("0x1234...abcd")
    pub fn shorten(&self) -> String {
        let hex = self.to_string();
        format!("{}...{}", &hex[..6], &hex[hex.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("0x") {
            return Err(AddressError::MissingPrefix);
        }

        if s.len() != ADDRESS_HEX_LENGTH {
            return Err(AddressError::InvalidLength(s.len()));
        }

        let decoded = hex::decode(&s[2..]).map_err(|_| AddressError::InvalidHex)?;
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}
