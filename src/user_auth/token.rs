//! Session token codec.
//!
//! Signs and verifies compact HS256 claims tokens with the server-held
//! secret. Any bit alteration, or an expired `exp`, fails verification with
//! the single merged `InvalidToken` rejection.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::error::AuthError;
use super::models::{Claims, Role};

/// Session lifetime: 7 days from issuance.
pub const SESSION_LIFETIME_DAYS: i64 = 7;

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self::with_lifetime(secret, Duration::days(SESSION_LIFETIME_DAYS))
    }

    /// Codec with a custom lifetime. Used by tests to mint already-expired
    /// tokens without sleeping.
    pub fn with_lifetime(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Issue a signed token embedding the claims plus `iat`/`exp`.
    pub fn issue(&self, sub: i64, email: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Internal("expiry timestamp overflow".to_string()))?;

        let claims = Claims {
            sub,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {}", e)))
    }

    /// Verify a token and return its claims.
    ///
    /// Bad signature, expiry, and garbage input all collapse into
    /// `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";

    #[test]
    fn test_round_trip() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(42, "user@example.com", Role::User).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, SESSION_LIFETIME_DAYS * 24 * 3600);
    }

    #[test]
    fn test_any_single_char_flip_fails() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(1, "a@b.com", Role::Admin).unwrap();

        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] = if tampered[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();
            if tampered == token {
                continue;
            }
            assert!(
                matches!(codec.verify(&tampered), Err(AuthError::InvalidToken)),
                "tampering byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_truncated_token_fails() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(1, "a@b.com", Role::User).unwrap();
        let truncated = &token[..token.len() - 1];
        assert!(matches!(
            codec.verify(truncated),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_fails() {
        // jsonwebtoken applies 60s leeway, so expire well past it
        let codec = TokenCodec::with_lifetime(SECRET, Duration::hours(-1));
        let token = codec.issue(1, "a@b.com", Role::User).unwrap();
        assert!(matches!(codec.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new("another-secret-also-32-bytes-long!!!");
        let token = codec.issue(1, "a@b.com", Role::User).unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_input_fails() {
        let codec = TokenCodec::new(SECRET);
        assert!(matches!(codec.verify(""), Err(AuthError::InvalidToken)));
        assert!(matches!(
            codec.verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
