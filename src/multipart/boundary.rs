//! Boundary tokens (RFC 2046 section 5.1.1).

use crate::base::error::MultipartError;
use crate::multipart::config::BoundaryConfig;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Longest boundary RFC 2046 allows.
pub const MAX_BOUNDARY_LEN: usize = 70;

fn is_bchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}

/// Check a caller-supplied boundary token.
pub fn validate_boundary(boundary: &str) -> Result<(), MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::invalid_boundary(boundary, "empty"));
    }
    if boundary.len() > MAX_BOUNDARY_LEN {
        return Err(MultipartError::invalid_boundary(
            boundary,
            format!("longer than {MAX_BOUNDARY_LEN} characters"),
        ));
    }
    if let Some(c) = boundary.chars().find(|c| !is_bchar(*c)) {
        return Err(MultipartError::invalid_boundary(
            boundary,
            format!("character {c:?} is not allowed"),
        ));
    }
    if boundary.ends_with(' ') {
        return Err(MultipartError::invalid_boundary(boundary, "ends with a space"));
    }
    Ok(())
}

/// Generate a random boundary from the thread-local CSPRNG.
///
/// Bodies are never scanned for the token; with the default 144 bits a
/// collision with payload bytes is not a practical concern.
pub fn random_boundary(config: &BoundaryConfig) -> Result<String, MultipartError> {
    config.validate()?;
    let mut raw = vec![0u8; config.random_bytes];
    rand::thread_rng().fill_bytes(&mut raw);
    let boundary = URL_SAFE_NO_PAD.encode(&raw);
    tracing::trace!(boundary = %boundary, "generated random boundary");
    Ok(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_boundaries() {
        let longest = "x".repeat(70);
        for ok in ["simple", "a", "with space inside", "'()+_,-./:=?", longest.as_str()] {
            assert!(validate_boundary(ok).is_ok(), "{ok:?} should be accepted");
        }
    }

    #[test]
    fn test_invalid_boundaries() {
        let too_long = "x".repeat(71);
        for bad in ["", "trailing ", "semi;colon", "quote\"", "tab\t", too_long.as_str()] {
            let err = validate_boundary(bad).unwrap_err();
            assert!(matches!(err, MultipartError::InvalidBoundary { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_random_boundary() {
        let a = random_boundary(&BoundaryConfig::default()).unwrap();
        let b = random_boundary(&BoundaryConfig::default()).unwrap();
        assert_eq!(a.len(), 24);
        assert_ne!(a, b);
        assert!(validate_boundary(&a).is_ok());

        let longest = random_boundary(&BoundaryConfig::new().random_bytes(52)).unwrap();
        assert!(longest.len() <= MAX_BOUNDARY_LEN);
        assert!(validate_boundary(&longest).is_ok());
    }

    #[test]
    fn test_random_boundary_bad_config() {
        let err = random_boundary(&BoundaryConfig::new().random_bytes(0)).unwrap_err();
        assert!(matches!(err, MultipartError::InvalidConfig(_)));
    }
}
