use std::fmt;
use std::path::Path;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::info;

use crate::error::TokenError;
use crate::utils::read_pem_file;

/// Default modulus size for generated key pairs
pub const DEFAULT_KEY_BITS: usize = 2048;

/// RSA key pair used to sign (private half) and verify (public half) tokens.
///
/// Built once at start-up and shared read-only between the issuer and the
/// verifier, usually behind an `Arc`.
pub struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
    public_pem: String,
}

impl KeyMaterial {
    /// Load a key pair from PEM strings.
    ///
    /// The private key may be PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`),
    /// the public key PKCS#1 (`RSA PUBLIC KEY`) or SPKI (`PUBLIC KEY`).
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| TokenError::invalid_key(format!("private key: {}", e)))?;
        let decoding = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| TokenError::invalid_key(format!("public key: {}", e)))?;

        Ok(Self {
            encoding,
            decoding,
            public_pem: public_pem.to_string(),
        })
    }

    /// Load a key pair from two PEM files on disk
    pub fn from_pem_files(
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, TokenError> {
        let private_pem = read_pem_file(private_path)?;
        let public_pem = read_pem_file(public_path)?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Generate a fresh key pair.
    ///
    /// Tokens signed with a generated pair do not survive a restart, so this is
    /// meant for development setups and tests.
    pub fn generate(bits: usize) -> Result<Self, TokenError> {
        let (private_pem, public_pem) = generate_pem_pair(bits)?;
        info!(bits, "generated ephemeral RSA signing key pair");
        Self::from_pem(&private_pem, &public_pem)
    }

    /// The public half in PEM form, suitable for handing to external verifiers
    pub fn public_key_pem(&self) -> &str {
        &self.public_pem
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Generate an RSA key pair and return it as (PKCS#8 private PEM, SPKI public PEM)
pub fn generate_pem_pair(bits: usize) -> Result<(String, String), TokenError> {
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, bits)
        .map_err(|e| TokenError::invalid_key(format!("key generation failed: {}", e)))?;
    let public = RsaPublicKey::from(&private);

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| TokenError::invalid_key(e.to_string()))?;
    let public_pem = public
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| TokenError::invalid_key(e.to_string()))?;

    Ok((private_pem.to_string(), public_pem))
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_pem", &self.public_pem)
            .finish_non_exhaustive()
    }
}
