//! # API Key Authentication
//!
//! Optional bearer-token authentication for the Veritrack HTTP API.
//!
//! When `VERITRACK_API_KEY` is set, every endpoint except `/health`
//! requires the key via:
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```
//! A bare `Authorization: <your-api-key>` header is also accepted.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

// =============================================================================
// API KEY AUTHENTICATION
// =============================================================================

/// Read the configured API key.
///
/// Returns `Some(key)` when `VERITRACK_API_KEY` is set and non-empty,
/// `None` otherwise (authentication disabled).
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("VERITRACK_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Compare a provided key against the expected one in constant time.
///
/// Both sides are padded to a common length so `ct_eq` always walks the
/// same number of bytes; the separate length check keeps the result
/// correct for unequal lengths.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_equal: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_equal && provided_bytes.len() == expected_bytes.len()
}

/// Authentication middleware.
///
/// `/health` is always exempt so load balancers can probe the server
/// without credentials. Everything else requires the configured key when
/// one is set; with no key configured, all requests pass through.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) => {
            let provided = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

            if keys_match(provided, &expected) {
                Ok(next.run(request).await)
            } else {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "invalid_api_key",
                    "Authentication failed: invalid API key"
                );
                Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_key_disables_auth() {
        // SAFETY: This is a unit test running in isolation.
        unsafe { std::env::remove_var("VERITRACK_API_KEY") };
        assert!(get_api_key_from_env().is_none());
    }

    #[test]
    fn key_comparison_requires_exact_match() {
        assert!(keys_match("secret-token", "secret-token"));
        assert!(!keys_match("secret-token", "secret-tokeN"));
        assert!(!keys_match("secret", "secret-token"));
        assert!(!keys_match("", "secret-token"));
    }
}
