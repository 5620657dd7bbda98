//! JWT token generation and validation

use crate::core::config::JwtConfig;
use crate::core::error::{ChapterError, Result};
use crate::db::models::User;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    /// User id
    pub sub: String,
    pub email: String,
    /// User type code
    pub role: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The user id carried in `sub`
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| ChapterError::AuthenticationError("Invalid token subject".to_string()))
    }
}

/// Signs and validates tokens with the configured issuer, audience and key
pub struct TokenIssuer {
    issuer: String,
    audience: String,
    lifetime: chrono::Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: chrono::Duration::minutes(config.expiration_minutes),
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
        }
    }

    /// Mint a fresh token for `user`
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| ChapterError::TokenError("Failed to calculate expiration".to_string()))?;

        let claims = Claims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.user_type.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ChapterError::TokenError(format!("Failed to generate token: {}", e)))
    }

    /// Check signature, issuer, audience and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ChapterError::AuthenticationError(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Decode the claims of a token without checking signature, audience or expiry
///
/// For inspecting a token whose key is unknown to the caller; never use the
/// result to make an authorization decision.
pub fn read_claims(token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(b""), &validation)
        .map(|data| data.claims)
        .map_err(|e| ChapterError::InvalidRequest(format!("Malformed token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            issuer: "chapter.webapi".to_string(),
            audience: "chapter.webapi".to_string(),
            signing_key: "chapter-chave-autenticacao".to_string(),
            expiration_minutes: 30,
        }
    }

    fn user() -> User {
        User {
            id: 1,
            email: "email@email.com".to_string(),
            password: "1234".to_string(),
            user_type: "0".to_string(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = TokenIssuer::new(&config());
        let token = issuer.issue(&user()).unwrap();

        assert_eq!(token.split('.').count(), 3);

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.iss, "chapter.webapi");
        assert_eq!(claims.aud, "chapter.webapi");
        assert_eq!(claims.user_id().unwrap(), 1);
        assert_eq!(claims.email, "email@email.com");
        assert_eq!(claims.role, "0");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_each_token_has_unique_id() {
        let issuer = TokenIssuer::new(&config());
        let a = issuer.validate(&issuer.issue(&user()).unwrap()).unwrap();
        let b = issuer.validate(&issuer.issue(&user()).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_read_claims_without_key() {
        let token = TokenIssuer::new(&config()).issue(&user()).unwrap();
        let claims = read_claims(&token).unwrap();
        assert_eq!(claims.iss, "chapter.webapi");
    }

    #[test]
    fn test_read_claims_rejects_garbage() {
        assert!(read_claims("not-a-token").is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = TokenIssuer::new(&config()).issue(&user()).unwrap();

        let mut other = config();
        other.signing_key = "a-completely-different-key".to_string();
        let err = TokenIssuer::new(&other).validate(&token).unwrap_err();
        assert!(matches!(err, ChapterError::AuthenticationError(_)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = TokenIssuer::new(&config()).issue(&user()).unwrap();

        let mut other = config();
        other.issuer = "someone.else".to_string();
        assert!(TokenIssuer::new(&other).validate(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = TokenIssuer::new(&config()).issue(&user()).unwrap();

        let mut other = config();
        other.audience = "another.client".to_string();
        assert!(TokenIssuer::new(&other).validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let cfg = config();
        let claims = Claims {
            iss: cfg.issuer.clone(),
            aud: cfg.audience.clone(),
            sub: "1".to_string(),
            email: "email@email.com".to_string(),
            role: "0".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: chrono::Utc::now().timestamp() - 7200,
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(cfg.signing_key.as_bytes()),
        )
        .unwrap();

        assert!(TokenIssuer::new(&cfg).validate(&token).is_err());
        // still readable for inspection
        assert_eq!(read_claims(&token).unwrap().sub, "1");
    }
}
