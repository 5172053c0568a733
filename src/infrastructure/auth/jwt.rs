//! JWT access/refresh token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt::Debug;

use crate::domain::token::{TokenClaims, TokenKind, TokenPair, TokenSubject};
use crate::domain::user::User;
use crate::domain::{DomainError, TokenError};

/// Configuration for JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret for signing and verifying tokens
    pub secret: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
}

impl JwtConfig {
    /// Create new JWT configuration with lifetimes in minutes
    pub fn new(secret: impl Into<String>, access_minutes: u64, refresh_minutes: u64) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl: Duration::minutes(access_minutes as i64),
            refresh_token_ttl: Duration::minutes(refresh_minutes as i64),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new("change-me-in-production", 15, 7 * 24 * 60)
    }
}

/// Mints and validates signed token pairs
pub trait TokenIssuer: Send + Sync + Debug {
    /// Mint an access and a refresh token from the same identity snapshot
    fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError>;

    /// Verify signature and expiry and decode the claims.
    ///
    /// The token kind is not checked; see [`TokenIssuer::validate_kind`].
    fn validate(&self, token: &str) -> Result<TokenClaims, DomainError>;

    /// Exchange a refresh token for a fresh pair carrying the same claims
    fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError>;

    /// Validate a token and require it to be of the given kind
    fn validate_kind(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, DomainError> {
        let claims = self.validate(token)?;
        claims.require_kind(kind)?;
        Ok(claims)
    }
}

/// HS256 token service using a shared secret
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_ttl", &self.config.access_token_ttl)
            .field("refresh_token_ttl", &self.config.refresh_token_ttl)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Create a JWT service with default configuration
    pub fn with_default_config() -> Self {
        Self::new(JwtConfig::default())
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    fn sign(&self, subject: &TokenSubject, kind: TokenKind) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.id.to_string(),
            username: subject.username.clone(),
            role: subject.role.clone(),
            kind,
            iat: now.timestamp(),
            exp: (now + self.config.ttl(kind)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            TokenError::Signing {
                message: e.to_string(),
            }
            .into()
        })
    }

    fn issue_for(&self, subject: &TokenSubject) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access: self.sign(subject, TokenKind::Access)?,
            refresh: self.sign(subject, TokenKind::Refresh)?,
        })
    }
}

fn classify(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

impl TokenIssuer for JwtService {
    fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError> {
        self.issue_for(&TokenSubject::from(user))
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;

        Ok(token_data.claims)
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let claims = self.validate_kind(refresh_token, TokenKind::Refresh)?;
        let subject = TokenSubject::try_from(&claims)?;

        self.issue_for(&subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{NewUser, UserId};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &str = "test-secret-key-12345";

    fn create_test_user() -> User {
        User::new(
            UserId::new(7).unwrap(),
            NewUser {
                first_name: None,
                last_name: None,
                username: "alice".to_string(),
                phone: "+15551234567".to_string(),
                password_hash: "hashed_password".to_string(),
                role: "editor".to_string(),
                is_admin: false,
                is_active: true,
            },
            Utc::now(),
        )
    }

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new(SECRET, 15, 60))
    }

    fn sign_raw(claims: &TokenClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_expiring_in(kind: TokenKind, seconds: i64) -> TokenClaims {
        let now = Utc::now();
        TokenClaims {
            sub: "7".to_string(),
            username: "alice".to_string(),
            role: "editor".to_string(),
            kind,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now + Duration::seconds(seconds)).timestamp(),
        }
    }

    #[test]
    fn test_issue_pair_kinds_and_claims() {
        let service = create_service();
        let user = create_test_user();

        let pair = service.issue_pair(&user).unwrap();
        let access = service.validate(&pair.access).unwrap();
        let refresh = service.validate(&pair.refresh).unwrap();

        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);

        for claims in [&access, &refresh] {
            assert_eq!(claims.sub, "7");
            assert_eq!(claims.username, "alice");
            assert_eq!(claims.role, "editor");
        }
    }

    #[test]
    fn test_pair_has_independent_windows() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();

        let access = service.validate(&pair.access).unwrap();
        let refresh = service.validate(&pair.refresh).unwrap();

        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 60 * 60);
    }

    #[test]
    fn test_header_is_hs256() {
        let pair = create_service().issue_pair(&create_test_user()).unwrap();

        let header = jsonwebtoken::decode_header(&pair.access).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(pair.access.split('.').count(), 3);
    }

    #[test]
    fn test_malformed_token() {
        let service = create_service();

        for token in ["invalid-token", "", "a.b.c"] {
            let result = service.validate(token);
            assert_eq!(
                result.unwrap_err().as_token_error(),
                Some(&TokenError::Malformed),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret-1", 15, 60));
        let service2 = JwtService::new(JwtConfig::new("secret-2", 15, 60));

        let pair = service1.issue_pair(&create_test_user()).unwrap();

        let result = service2.validate(&pair.access);
        assert_eq!(
            result.unwrap_err().as_token_error(),
            Some(&TokenError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();

        let parts: Vec<&str> = pair.access.split('.').collect();
        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["role"] = serde_json::Value::String("admin".to_string());
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            service.validate(&forged).unwrap_err().as_token_error(),
            Some(&TokenError::BadSignature)
        );
    }

    #[test]
    fn test_expired_token() {
        let service = create_service();
        let token = sign_raw(&claims_expiring_in(TokenKind::Access, -3600), SECRET);

        assert_eq!(
            service.validate(&token).unwrap_err().as_token_error(),
            Some(&TokenError::Expired)
        );
    }

    #[test]
    fn test_recently_expired_token_has_no_leeway() {
        let service = create_service();
        let token = sign_raw(&claims_expiring_in(TokenKind::Access, -5), SECRET);

        assert_eq!(
            service.validate(&token).unwrap_err().as_token_error(),
            Some(&TokenError::Expired)
        );
    }

    #[test]
    fn test_validate_does_not_check_kind() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();

        assert!(service.validate(&pair.refresh).is_ok());
    }

    #[test]
    fn test_validate_kind() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();

        assert!(service.validate_kind(&pair.access, TokenKind::Access).is_ok());

        let result = service.validate_kind(&pair.refresh, TokenKind::Access);
        assert_eq!(
            result.unwrap_err().as_token_error(),
            Some(&TokenError::WrongKind {
                expected: TokenKind::Access,
                actual: TokenKind::Refresh,
            })
        );
    }

    #[test]
    fn test_refresh_rejects_access_token() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();

        let result = service.refresh(&pair.access);
        assert!(matches!(
            result.unwrap_err().as_token_error(),
            Some(TokenError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_refresh_issues_later_expiring_pair() {
        let service = create_service();
        let original_claims = claims_expiring_in(TokenKind::Refresh, 30);
        let original = sign_raw(&original_claims, SECRET);

        let pair = service.refresh(&original).unwrap();
        let access = service.validate(&pair.access).unwrap();
        let refresh = service.validate(&pair.refresh).unwrap();

        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.sub, original_claims.sub);
        assert_eq!(refresh.username, original_claims.username);
        assert_eq!(refresh.role, original_claims.role);
        assert!(refresh.exp > original_claims.exp);
    }

    #[test]
    fn test_refresh_of_fresh_pair_never_shortens_expiry() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();
        let original = service.validate(&pair.refresh).unwrap();

        let refreshed = service.refresh(&pair.refresh).unwrap();
        let renewed = service.validate(&refreshed.refresh).unwrap();

        // exp has whole-second resolution; within the same second it is equal
        assert!(renewed.exp >= original.exp);
        assert!(renewed.iat >= original.iat);
    }

    #[test]
    fn test_refresh_rejects_expired_token() {
        let service = create_service();
        let token = sign_raw(&claims_expiring_in(TokenKind::Refresh, -60), SECRET);

        assert_eq!(
            service.refresh(&token).unwrap_err().as_token_error(),
            Some(&TokenError::Expired)
        );
    }

    #[test]
    fn test_refresh_rejects_non_numeric_subject() {
        let service = create_service();
        let mut claims = claims_expiring_in(TokenKind::Refresh, 600);
        claims.sub = "not-a-number".to_string();

        let token = sign_raw(&claims, SECRET);

        assert_eq!(
            service.refresh(&token).unwrap_err().as_token_error(),
            Some(&TokenError::Malformed)
        );
    }

    #[test]
    fn test_default_config() {
        let service = JwtService::with_default_config();
        assert_eq!(service.config().access_token_ttl, Duration::minutes(15));
        assert_eq!(service.config().refresh_token_ttl, Duration::days(7));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", create_service());
        assert!(!debug.contains(SECRET));
    }
}
