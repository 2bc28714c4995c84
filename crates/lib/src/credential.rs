//! Password credentials
//!
//! A credential is a random per-user secret, a random per-user salt and the
//! HMAC-SHA256 of `password ‖ salt` keyed by the secret. Only the credential is
//! ever stored; the plaintext password is dropped as soon as it is hashed.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    auth::AuthError,
    constants::{SALT_LENGTH, SECRET_LENGTH},
};

type HmacSha256 = Hmac<Sha256>;

/// Salted, keyed password hash for one user.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    secret: Vec<u8>,
    salt: String,
    hash: Vec<u8>,
}

impl Credential {
    /// Create a credential for `password` with fresh random secret and salt.
    pub fn issue(password: &str) -> Result<Self, AuthError> {
        let secret = random_bytes(SECRET_LENGTH)?;
        let salt = Base64::encode_string(&random_bytes(SALT_LENGTH)?);
        let hash = keyed_hash(&secret, password, &salt)?;
        Ok(Self { secret, salt, hash })
    }

    /// Check `password` against the stored hash in constant time.
    ///
    /// A secret that cannot key the HMAC never verifies.
    pub fn verify(&self, password: &str) -> bool {
        match keyed_hash(&self.secret, password, &self.salt) {
            Ok(candidate) => candidate.ct_eq(&self.hash).into(),
            Err(e) => {
                warn!("credential cannot be checked: {e}");
                false
            }
        }
    }

    /// Hash a new password under the existing secret and salt.
    pub fn rehash(&self, new_password: &str) -> Result<Self, AuthError> {
        Ok(Self {
            secret: self.secret.clone(),
            salt: self.salt.clone(),
            hash: keyed_hash(&self.secret, new_password, &self.salt)?,
        })
    }

    /// Rebuild a credential from its stored (base64) form.
    pub fn from_stored(
        secret: &str,
        salt: &str,
        hash: &str,
    ) -> Result<Self, base64ct::Error> {
        Ok(Self {
            secret: Base64::decode_vec(secret)?,
            salt: salt.to_string(),
            hash: Base64::decode_vec(hash)?,
        })
    }

    /// Base64 form of the secret key material, as stored.
    pub fn encoded_secret(&self) -> String {
        Base64::encode_string(&self.secret)
    }

    /// The salt text (already base64).
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Base64 form of the hash, as stored.
    pub fn encoded_hash(&self) -> String {
        Base64::encode_string(&self.hash)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"<redacted>")
            .field("salt", &self.salt)
            .field("hash", &"<redacted>")
            .finish()
    }
}

fn random_bytes(len: usize) -> Result<Vec<u8>, AuthError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Entropy {
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

fn keyed_hash(secret: &[u8], password: &str, salt: &str) -> Result<Vec<u8>, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| AuthError::InvalidKey {
        reason: e.to_string(),
    })?;
    mac.update(password.as_bytes());
    mac.update(salt.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
