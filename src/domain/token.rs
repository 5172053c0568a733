//! Token claim types shared by the issuer and its callers

use serde::{Deserialize, Serialize};

use super::error::TokenError;
use super::user::{User, UserId};

/// Kind of a signed token, fixed when the token is minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token presented on each authorized request
    Access,
    /// Longer-lived token exchanged for a new pair
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity snapshot copied into both tokens of a pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: UserId,
    pub username: String,
    pub role: String,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            role: user.role().to_string(),
        }
    }
}

impl TryFrom<&TokenClaims> for TokenSubject {
    type Error = TokenError;

    fn try_from(claims: &TokenClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            username: claims.username.clone(),
            role: claims.role.clone(),
        })
    }
}

/// Payload embedded in a signed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID as a decimal string)
    pub sub: String,
    pub username: String,
    pub role: String,
    pub kind: TokenKind,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl TokenClaims {
    /// Parse the subject back into a user ID
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i64>()
            .ok()
            .and_then(|raw| UserId::new(raw).ok())
            .ok_or(TokenError::Malformed)
    }

    /// Ensure the token was minted as the given kind
    pub fn require_kind(&self, expected: TokenKind) -> Result<(), TokenError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(TokenError::WrongKind {
                expected,
                actual: self.kind,
            })
        }
    }
}

/// Access and refresh tokens minted together from one identity snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, kind: TokenKind) -> TokenClaims {
        TokenClaims {
            sub: sub.to_string(),
            username: "alice".to_string(),
            role: "editor".to_string(),
            kind,
            iat: 0,
            exp: 60,
        }
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&claims("1", TokenKind::Refresh)).unwrap();
        assert!(json.contains(r#""kind":"refresh""#));
    }

    #[test]
    fn test_user_id_from_subject() {
        assert_eq!(claims("42", TokenKind::Access).user_id().unwrap().value(), 42);
        assert_eq!(
            claims("abc", TokenKind::Access).user_id(),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            claims("0", TokenKind::Access).user_id(),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_require_kind() {
        let access = claims("1", TokenKind::Access);

        assert!(access.require_kind(TokenKind::Access).is_ok());
        assert_eq!(
            access.require_kind(TokenKind::Refresh),
            Err(TokenError::WrongKind {
                expected: TokenKind::Refresh,
                actual: TokenKind::Access,
            })
        );
    }

    #[test]
    fn test_subject_from_claims() {
        let subject = TokenSubject::try_from(&claims("9", TokenKind::Refresh)).unwrap();

        assert_eq!(subject.id.value(), 9);
        assert_eq!(subject.username, "alice");
        assert_eq!(subject.role, "editor");
    }

    #[test]
    fn test_pair_keys() {
        let pair = TokenPair {
            access: "a".to_string(),
            refresh: "r".to_string(),
        };
        let json = serde_json::to_value(&pair).unwrap();

        assert_eq!(json["access"], "a");
        assert_eq!(json["refresh"], "r");
    }
}
