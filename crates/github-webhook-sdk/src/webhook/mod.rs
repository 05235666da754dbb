//! GitHub webhook delivery validation.
//!
//! GitHub signs every delivery with HMAC-SHA256 over the exact request body
//! using the secret configured on the webhook, and sends the digest in the
//! `X-Hub-Signature-256` header as `sha256=<hex>`. The body must be validated
//! byte-for-byte as received, before any JSON parsing.

pub mod validation;

pub use validation::SignatureValidator;

/// Header carrying the event type of a delivery (e.g. `push`).
pub const EVENT_TYPE_HEADER: &str = "X-GitHub-Event";

/// Header carrying the unique ID of a delivery.
pub const DELIVERY_ID_HEADER: &str = "X-GitHub-Delivery";

/// Header carrying the HMAC-SHA256 signature of the body.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
