//! Credential ports: password hashing and token issuance.

use uuid::Uuid;

/// The two token flavours of a login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token presented on every authenticated request.
    Access,
    /// Longer-lived token exchanged for fresh access tokens.
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims carried by a validated token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub kind: TokenKind,
    pub exp: i64,
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a token of the given kind for a user.
    fn issue(&self, user_id: Uuid, email: &str, kind: TokenKind) -> Result<String, AuthError>;

    /// Validate and decode a token, rejecting tokens of any other kind.
    fn validate(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError>;

    /// Lifetime of a freshly issued token, in seconds.
    fn ttl_seconds(&self, kind: TokenKind) -> i64;

    fn issue_pair(&self, user_id: Uuid, email: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, email, TokenKind::Access)?,
            refresh_token: self.issue(user_id, email, TokenKind::Refresh)?,
            expires_in: self.ttl_seconds(TokenKind::Access),
        })
    }
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token issuance failed: {0}")]
    Issuance(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
