//! Webhook signature validation implementation.
//!
//! Provides HMAC-SHA256 signature validation for GitHub webhooks using
//! constant-time comparison to prevent timing attacks.

use crate::error::SignatureError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Validates GitHub webhook signatures using HMAC-SHA256.
///
/// The validator holds the shared secret of a single webhook. It is cheap to
/// construct, so callers build one per delivery from the secret they resolved
/// for the target repository.
///
/// # Security
///
/// - Uses constant-time comparison to prevent timing attacks
/// - Never logs secrets or signature values
/// - Validates signature format before HMAC computation
///
/// # Examples
///
/// ```rust
/// use github_webhook_sdk::webhook::SignatureValidator;
/// use github_webhook_sdk::SignatureError;
///
/// let validator = SignatureValidator::new("webhook-secret");
/// let payload = b"{}";
///
/// assert_eq!(
///     validator.validate(payload, Some("sha256=00")),
///     Err(SignatureError::Mismatch)
/// );
/// ```
#[derive(Clone)]
pub struct SignatureValidator {
    secret: Vec<u8>,
}

impl SignatureValidator {
    /// Create a validator for the given shared secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Validate a webhook signature.
    ///
    /// # Arguments
    ///
    /// * `payload` - The raw webhook payload bytes, exactly as received
    /// * `signature` - The `X-Hub-Signature-256` header value, if present
    ///
    /// # Errors
    ///
    /// * [`SignatureError::MissingSignature`] - header absent or empty
    /// * [`SignatureError::InvalidFormat`] - not `sha256=<hex>`
    /// * [`SignatureError::Mismatch`] - digest does not match the payload
    pub fn validate(&self, payload: &[u8], signature: Option<&str>) -> Result<(), SignatureError> {
        let signature = match signature {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => return Err(SignatureError::MissingSignature),
        };

        let provided = Self::parse_signature(signature)?;
        let expected = self.compute_hmac(payload)?;

        if Self::constant_time_compare(&provided, &expected) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    /// Produce the `sha256=<hex>` header value GitHub would send for `payload`.
    pub fn sign(&self, payload: &[u8]) -> Result<String, SignatureError> {
        Ok(format!("{}{}", PREFIX, hex::encode(self.compute_hmac(payload)?)))
    }

    /// Extract hex-encoded signature bytes from GitHub's `sha256=<hex>` format.
    fn parse_signature(signature: &str) -> Result<Vec<u8>, SignatureError> {
        let hex_signature =
            signature
                .strip_prefix(PREFIX)
                .ok_or_else(|| SignatureError::InvalidFormat {
                    message: format!("signature must start with '{}'", PREFIX),
                })?;

        hex::decode(hex_signature).map_err(|e| SignatureError::InvalidFormat {
            message: format!("invalid hex encoding in signature: {}", e),
        })
    }

    fn compute_hmac(&self, payload: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|e| {
            SignatureError::InvalidFormat {
                message: format!("failed to create HMAC instance: {}", e),
            }
        })?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
        // Length is not secret; only the content comparison must be constant time.
        if a.len() != b.len() {
            return false;
        }
        a.ct_eq(b).into()
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for SignatureValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureValidator")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
