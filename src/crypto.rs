//! Addresses, signatures and the signature verification capability.
//!
//! An address is the raw 32-byte Ed25519 public key of its owner, so verifying a signature
//! "under an address" needs nothing but the address itself.

use crate::{LedgerError, LedgerResult};
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryInto;
use std::fmt::{Display, Formatter};

const ADDRESS_BYTE_COUNT: usize = 32;
const SIGNATURE_BYTE_COUNT: usize = 64;
const SECRET_KEY_BYTE_COUNT: usize = 32;

fn decode_hex_array<const N: usize>(what: &'static str, s: &str) -> LedgerResult<[u8; N]> {
    let bytes = hex::decode(s)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| LedgerError::InvalidLength {
        what,
        expected: N,
        actual,
    })
}

/// The owner of a transaction output.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Address([u8; ADDRESS_BYTE_COUNT]);

impl Address {
    pub const fn from_raw(raw_bytes: [u8; ADDRESS_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> LedgerResult<Self> {
        decode_hex_array("address", s).map(Self)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// A signature that authorizes a single transaction input.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct Signature([u8; SIGNATURE_BYTE_COUNT]);

impl Signature {
    pub const fn from_raw(raw_bytes: [u8; SIGNATURE_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> LedgerResult<Self> {
        decode_hex_array("signature", s).map(Self)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// A signing key together with the address it controls.
/// Deliberately not serializable, the secret only leaves through `secret_hex`.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a fresh keypair from the OS random number generator.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair, the seed is the Ed25519 secret key.
    pub fn from_seed(seed: &[u8; SECRET_KEY_BYTE_COUNT]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn from_secret_hex(s: &str) -> LedgerResult<Self> {
        let seed = decode_hex_array::<SECRET_KEY_BYTE_COUNT>("secret key", s)?;
        Ok(Self::from_seed(&seed))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn address(&self) -> Address {
        Address(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

/// Decides whether a signature over a message was produced by the owner of an address.
///
/// Implementations must be pure: no side effects, and every failure (malformed key, malformed
/// signature, mismatch) is reported as `false`.
pub trait SignatureVerifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool;
}

/// Strict Ed25519 verification.
#[derive(Copy, Clone, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool {
        match VerifyingKey::from_bytes(address.as_bytes()) {
            Ok(verifying_key) => {
                let signature = DalekSignature::from_bytes(signature.as_bytes());
                verifying_key.verify_strict(message, &signature).is_ok()
            }
            Err(_) => false,
        }
    }
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool {
        (**self).verify(address, message, signature)
    }
}
