//! Slack request signature verification.
//!
//! Implements Slack's v0 signing scheme:
//! <https://api.slack.com/authentication/verifying-requests-from-slack>
//!
//! Verification happens in two stages so callers can tell a malformed
//! request (400) from a forged one (401):
//!
//! 1. [`SignatureVerifier::from_headers`] reads and sanity-checks the headers
//! 2. [`SignatureVerifier::ensure`] checks the HMAC over the raw body

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::debug;

use super::error::SlackError;

/// Request timestamp header.
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Request signature header.
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Maximum age of a signed request, in seconds.
const MAX_REQUEST_AGE_SECS: u64 = 300;

const VERSION: &str = "v0";

/// Verifier for a single inbound request.
pub struct SignatureVerifier {
    mac: Hmac<Sha256>,
    timestamp: String,
    signature: String,
}

impl SignatureVerifier {
    /// Prepare verification from request headers.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::MalformedRequest` if a header is missing or the
    /// timestamp is invalid or outside the five minute replay window.
    pub fn from_headers(headers: &HeaderMap, signing_secret: &SecretString) -> Result<Self, SlackError> {
        let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
        let signature = header_str(headers, SIGNATURE_HEADER)?;

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| SlackError::MalformedRequest("Invalid timestamp".to_string()))?;

        let now = unix_now()?;
        if now.abs_diff(ts) > MAX_REQUEST_AGE_SECS {
            return Err(SlackError::MalformedRequest(
                "Request timestamp too old".to_string(),
            ));
        }

        let mac = Hmac::<Sha256>::new_from_slice(signing_secret.expose_secret().as_bytes())
            .map_err(|e| SlackError::MalformedRequest(e.to_string()))?;

        Ok(Self {
            mac,
            timestamp: timestamp.to_string(),
            signature: signature.to_string(),
        })
    }

    /// Check the signature against the raw request body.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::InvalidSignature` on mismatch, including a
    /// signature that is not `v0=<hex>`.
    pub fn ensure(self, body: &[u8]) -> Result<(), SlackError> {
        let expected = self
            .signature
            .strip_prefix("v0=")
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or_else(|| SlackError::InvalidSignature("Malformed signature".to_string()))?;

        let mut mac = self.mac;
        mac.update(format!("{VERSION}:{}:", self.timestamp).as_bytes());
        mac.update(body);

        // Constant-time comparison
        mac.verify_slice(&expected)
            .map_err(|_| SlackError::InvalidSignature("Signature mismatch".to_string()))?;

        debug!("Slack signature verified");

        Ok(())
    }
}

/// Compute the `v0=<hex>` signature Slack would send for `body`.
///
/// # Errors
///
/// Returns `SlackError::MalformedRequest` if the secret cannot key the HMAC.
pub fn compute_signature(
    signing_secret: &SecretString,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SlackError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(signing_secret.expose_secret().as_bytes())
        .map_err(|e| SlackError::MalformedRequest(e.to_string()))?;
    mac.update(format!("{VERSION}:{timestamp}:").as_bytes());
    mac.update(body);

    Ok(format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes())))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, SlackError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| SlackError::MalformedRequest(format!("Missing {name} header")))
}

fn unix_now() -> Result<i64, SlackError> {
    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| SlackError::MalformedRequest(e.to_string()))?
        .as_secs();

    i64::try_from(now_secs)
        .map_err(|_| SlackError::MalformedRequest("System time overflow".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn secret() -> SecretString {
        SecretString::from("test-signing-secret".to_string())
    }

    fn now() -> String {
        unix_now().expect("system time").to_string()
    }

    fn signed_headers(timestamp: &str, signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            TIMESTAMP_HEADER,
            HeaderValue::from_str(timestamp).expect("valid header"),
        );
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(signature).expect("valid header"),
        );
        headers
    }

    #[test]
    fn test_signature_verification_valid() {
        let timestamp = now();
        let body = b"token=x&payload=%7B%7D";
        let signature = compute_signature(&secret(), &timestamp, body).expect("sign");

        let verifier = SignatureVerifier::from_headers(&signed_headers(&timestamp, &signature), &secret())
            .expect("headers are well formed");
        assert!(verifier.ensure(body).is_ok());
    }

    #[test]
    fn test_signature_verification_tampered_body() {
        let timestamp = now();
        let signature = compute_signature(&secret(), &timestamp, b"original=body").expect("sign");

        let verifier = SignatureVerifier::from_headers(&signed_headers(&timestamp, &signature), &secret())
            .expect("headers are well formed");
        assert!(matches!(
            verifier.ensure(b"tampered=body"),
            Err(SlackError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signature_verification_wrong_secret() {
        let timestamp = now();
        let other = SecretString::from("another-secret".to_string());
        let signature = compute_signature(&other, &timestamp, b"body").expect("sign");

        let verifier = SignatureVerifier::from_headers(&signed_headers(&timestamp, &signature), &secret())
            .expect("headers are well formed");
        assert!(matches!(
            verifier.ensure(b"body"),
            Err(SlackError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_missing_headers() {
        let result = SignatureVerifier::from_headers(&HeaderMap::new(), &secret());
        assert!(matches!(result, Err(SlackError::MalformedRequest(_))));
    }

    #[test]
    fn test_invalid_timestamp() {
        let result = SignatureVerifier::from_headers(&signed_headers("not-a-number", "v0=00"), &secret());
        assert!(matches!(result, Err(SlackError::MalformedRequest(_))));
    }

    #[test]
    fn test_old_timestamp() {
        let old = (unix_now().expect("system time") - 600).to_string();
        let signature = compute_signature(&secret(), &old, b"body").expect("sign");

        let result = SignatureVerifier::from_headers(&signed_headers(&old, &signature), &secret());
        assert!(matches!(result, Err(SlackError::MalformedRequest(_))));
    }

    #[test]
    fn test_extreme_timestamps_are_rejected() {
        for ts in [i64::MIN, i64::MAX] {
            let timestamp = ts.to_string();
            let result = SignatureVerifier::from_headers(&signed_headers(&timestamp, "v0=00"), &secret());
            assert!(matches!(result, Err(SlackError::MalformedRequest(_))));
        }
    }

    #[test]
    fn test_malformed_signature_is_mismatch() {
        let verifier = SignatureVerifier::from_headers(&signed_headers(&now(), "v1=zz"), &secret())
            .expect("headers are present");
        assert!(matches!(
            verifier.ensure(b"body"),
            Err(SlackError::InvalidSignature(_))
        ));
    }
}
