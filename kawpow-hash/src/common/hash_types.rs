//! Hash value types.

use crate::error::{PowError, Result};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte seed hash identifying an epoch.
///
/// The seed hash changes only at epoch boundaries; cache and dataset
/// contents are pure functions of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedHash(pub [u8; 32]);

impl SeedHash {
    /// Create from bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 32 {
            return Err(PowError::InvalidSeedLength(slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The eight little-endian 32-bit words of the hash
    pub fn words(&self) -> [u32; 8] {
        let mut words = [0u32; 8];
        LittleEndian::read_u32_into(&self.0, &mut words);
        words
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for SeedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for SeedHash {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_hash_basics() {
        let seed = SeedHash::from_bytes([1u8; 32]);
        assert_eq!(seed.as_bytes(), &[1u8; 32]);

        let hex = seed.to_hex();
        let seed2 = SeedHash::from_hex(&hex).unwrap();
        assert_eq!(seed, seed2);
    }

    #[test]
    fn test_seed_hash_words_little_endian() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x78;
        bytes[1] = 0x56;
        bytes[2] = 0x34;
        bytes[3] = 0x12;
        let seed = SeedHash::from_bytes(bytes);
        assert_eq!(seed.words()[0], 0x12345678);
    }

    #[test]
    fn test_seed_hash_from_slice_rejects_bad_length() {
        assert!(SeedHash::from_slice(&[0u8; 31]).is_err());
        assert!(SeedHash::from_slice(&[0u8; 33]).is_err());
        assert!(SeedHash::from_slice(&[0u8; 32]).is_ok());
    }
}
