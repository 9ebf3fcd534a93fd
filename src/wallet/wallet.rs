use crate::error::Result;
use crate::utils::{new_key_pair, sha256_hex};
use serde::Serialize;
use std::fmt;

/// A P-256 key pair and the address derived from it.
///
/// The private key is kept in memory in the clear.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    public_key: String,
    #[serde(skip_serializing)]
    private_key: String,
    address: String,
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        let (public_key, private_key) = new_key_pair()?;
        let address = derive_address(&public_key);
        Ok(Wallet {
            public_key,
            private_key,
            address,
        })
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    /// Hex of the DER SubjectPublicKeyInfo encoding
    pub fn get_public_key(&self) -> &str {
        self.public_key.as_str()
    }

    /// Hex of the PKCS#8 encoding
    pub fn get_private_key(&self) -> &str {
        self.private_key.as_str()
    }
}

// Keep the private key out of logs
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Address = SHA-256 of the public key's hex text
pub fn derive_address(public_key_hex: &str) -> String {
    sha256_hex(public_key_hex.as_bytes())
}
