//! RSA2048/SHA-256 and DSA2048/SHA-224 signing and verification.
use std::path::Path;

use dsa::pkcs8::DecodePrivateKey as DsaDecodePrivateKey;
use dsa::pkcs8::DecodePublicKey as DsaDecodePublicKey;
use rsa::pkcs1v15::{SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha224, Sha256};
use signature::{DigestSigner, DigestVerifier, Signer, Verifier};

use crate::err::{UitsError, UitsResult};

/// The two signature algorithms spec.md's `algorithm` attribute admits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Algorithm {
    Rsa2048,
    Dsa2048,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Rsa2048 => "RSA2048",
            Algorithm::Dsa2048 => "DSA2048",
        }
    }

    pub fn parse(s: &str) -> UitsResult<Self> {
        match s {
            "RSA2048" => Ok(Algorithm::Rsa2048),
            "DSA2048" => Ok(Algorithm::Dsa2048),
            other => Err(UitsError::Value(format!(
                "unsupported signature algorithm '{}'",
                other
            ))),
        }
    }
}

/// An opaque signature, already Base64-decodable bytes.
pub struct Signature(pub Vec<u8>);

/// A loaded private key, ready to sign the deterministic metadata byte range.
pub enum KeyPair {
    Rsa(Box<RsaPrivateKey>),
    Dsa(Box<dsa::SigningKey>),
}

impl KeyPair {
    /// Loads a PEM-encoded PKCS#8 private key matching `algorithm`.
    pub fn load(path: impl AsRef<Path>, algorithm: Algorithm) -> UitsResult<Self> {
        let pem = std::fs::read_to_string(path).map_err(UitsError::File)?;

        match algorithm {
            Algorithm::Rsa2048 => {
                let key = RsaPrivateKey::from_pkcs8_pem(&pem)
                    .map_err(|e| UitsError::Ssl(format!("invalid RSA private key: {}", e)))?;
                Ok(KeyPair::Rsa(Box::new(key)))
            }
            Algorithm::Dsa2048 => {
                let key = dsa::SigningKey::from_pkcs8_pem(&pem)
                    .map_err(|e| UitsError::Ssl(format!("invalid DSA private key: {}", e)))?;
                Ok(KeyPair::Dsa(Box::new(key)))
            }
        }
    }

    /// Signs `data` (the literal metadata byte range), returning raw signature bytes.
    pub fn sign(&self, data: &[u8]) -> UitsResult<Signature> {
        match self {
            KeyPair::Rsa(key) => {
                let signing_key = RsaSigningKey::<Sha256>::new((**key).clone());
                let sig = signing_key.try_sign(data).map_err(|e| {
                    UitsError::Ssl(format!("RSA signing failed: {}", e))
                })?;
                Ok(Signature(sig.to_vec()))
            }
            KeyPair::Dsa(key) => {
                let digest = Sha224::new_with_prefix(data);
                let sig: dsa::Signature = key
                    .try_sign_digest(digest)
                    .map_err(|e| UitsError::Ssl(format!("DSA signing failed: {}", e)))?;
                Ok(Signature(sig.to_der()))
            }
        }
    }
}

/// A loaded public key, ready to verify a signature against the recovered metadata bytes.
pub enum PublicKey {
    Rsa(Box<RsaPublicKey>),
    Dsa(Box<dsa::VerifyingKey>),
}

impl PublicKey {
    pub fn load(path: impl AsRef<Path>, algorithm: Algorithm) -> UitsResult<Self> {
        let pem = std::fs::read_to_string(path).map_err(UitsError::File)?;

        match algorithm {
            Algorithm::Rsa2048 => {
                let key = RsaPublicKey::from_public_key_pem(&pem)
                    .map_err(|e| UitsError::Ssl(format!("invalid RSA public key: {}", e)))?;
                Ok(PublicKey::Rsa(Box::new(key)))
            }
            Algorithm::Dsa2048 => {
                let key = dsa::VerifyingKey::from_public_key_pem(&pem)
                    .map_err(|e| UitsError::Ssl(format!("invalid DSA public key: {}", e)))?;
                Ok(PublicKey::Dsa(Box::new(key)))
            }
        }
    }

    /// Verifies `signature` (raw bytes, already Base64-decoded) against `data`.
    ///
    /// # Errors
    /// Returns `UitsError::Sig` specifically (not a generic crypto error) on mismatch,
    /// so the CLI can map it to the dedicated SIG exit code.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> UitsResult<()> {
        match self {
            PublicKey::Rsa(key) => {
                let verifying_key = RsaVerifyingKey::<Sha256>::new((**key).clone());
                let sig = rsa::pkcs1v15::Signature::try_from(signature)
                    .map_err(|e| UitsError::Sig(format!("malformed RSA signature: {}", e)))?;
                verifying_key
                    .verify(data, &sig)
                    .map_err(|_| UitsError::Sig("RSA signature did not verify".into()))
            }
            PublicKey::Dsa(key) => {
                let sig = dsa::Signature::from_der(signature)
                    .map_err(|e| UitsError::Sig(format!("malformed DSA signature: {}", e)))?;
                verify_dsa(key, data, &sig)
            }
        }
    }
}

fn verify_dsa(key: &dsa::VerifyingKey, data: &[u8], sig: &dsa::Signature) -> UitsResult<()> {
    let digest = Sha224::new_with_prefix(data);
    key.verify_digest(digest, sig)
        .map_err(|_| UitsError::Sig("DSA signature did not verify".into()))
}
