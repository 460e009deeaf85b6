//! Account lifecycle: registration, login, token refresh, profile and password management.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{User, validate_name, validate_password};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, BaseRepository, PasswordService, TokenKind, TokenPair, TokenService, UserRepository,
};

/// Input for a new registration.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial profile update. The email is read-only and has no field here.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

/// A freshly minted access token obtained from a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Create a regular account with a hashed password.
    pub async fn register(&self, input: NewAccount) -> Result<User, DomainError> {
        let email = User::normalize_email(&input.email);
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(DomainError::Validation(
                    "Enter a valid email address".to_string(),
                ));
            }
        }
        validate_password(&input.password)?;
        validate_name("First name", &input.first_name)?;
        validate_name("Last name", &input.last_name)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(duplicate_email());
        }

        let password_hash = self.passwords.hash(&input.password).map_err(internal)?;
        let user = User::new(email, password_hash, input.first_name, input.last_name);

        let saved = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => duplicate_email(),
            other => other.into(),
        })?;

        tracing::info!(user_id = %saved.id, "User registered");
        Ok(saved)
    }

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// An inactive account is rejected before the password is even looked at,
    /// so the answer does not depend on whether the password was right.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, DomainError> {
        let email = User::normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login attempt on inactive account");
            return Err(DomainError::Forbidden("User is not active".to_string()));
        }

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(internal)?;
        if !valid {
            tracing::info!(user_id = %user.id, "Login failed: bad password");
            return Err(DomainError::Unauthenticated(
                "Invalid credentials".to_string(),
            ));
        }

        let tokens = self.tokens.issue_pair(user.id, &user.email).map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Token generation failed");
            DomainError::Internal("Token generation failed".to_string())
        })?;

        let now = Utc::now();
        self.users.mark_login(user.id, now).await?;
        user.last_login = Some(now);

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { user, tokens })
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess, DomainError> {
        let user = self.resolve(refresh_token, TokenKind::Refresh).await?;

        let access_token = self
            .tokens
            .issue(user.id, &user.email, TokenKind::Access)
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Token generation failed");
                DomainError::Internal("Token generation failed".to_string())
            })?;

        Ok(RefreshedAccess {
            access_token,
            expires_in: self.tokens.ttl_seconds(TokenKind::Access),
        })
    }

    /// Resolve a bearer access token to the calling user.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, DomainError> {
        self.resolve(access_token, TokenKind::Access).await
    }

    pub async fn update_profile(
        &self,
        caller: &User,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        if let Some(first_name) = &changes.first_name {
            validate_name("First name", first_name)?;
        }
        if let Some(last_name) = &changes.last_name {
            validate_name("Last name", last_name)?;
        }

        let saved = self
            .users
            .update_names(caller.id, changes.first_name, changes.last_name, Utc::now())
            .await
            .map_err(gone_user)?;
        tracing::info!(user_id = %saved.id, "Profile updated");
        Ok(saved)
    }

    pub async fn change_password(
        &self,
        caller: &User,
        change: PasswordChange,
    ) -> Result<(), DomainError> {
        let current = change.current_password.unwrap_or_default();
        let new = change.new_password.unwrap_or_default();
        if current.is_empty() || new.is_empty() {
            return Err(DomainError::BadRequest(
                "Both current and new passwords are required".to_string(),
            ));
        }

        if change.confirm_password.as_deref() != Some(new.as_str()) {
            return Err(DomainError::BadRequest(
                "New password and confirm password do not match".to_string(),
            ));
        }

        let valid = self
            .passwords
            .verify(&current, &caller.password_hash)
            .map_err(internal)?;
        if !valid {
            return Err(DomainError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password(&new).map_err(|e| DomainError::BadRequest(e.to_string()))?;

        let password_hash = self.passwords.hash(&new).map_err(internal)?;
        self.users
            .set_password_hash(caller.id, password_hash, Utc::now())
            .await
            .map_err(gone_user)?;

        tracing::info!(user_id = %caller.id, "Password changed");
        Ok(())
    }

    /// Delete the caller's own account together with everything it owns.
    pub async fn delete_account(&self, caller: &User) -> Result<(), DomainError> {
        self.users.delete(caller.id).await.map_err(gone_user)?;
        tracing::info!(user_id = %caller.id, "Account deleted");
        Ok(())
    }

    async fn resolve(&self, token: &str, kind: TokenKind) -> Result<User, DomainError> {
        let claims = self.tokens.validate(token, kind).map_err(|e| {
            tracing::debug!(error = %e, kind = kind.as_str(), "Token rejected");
            match e {
                AuthError::TokenExpired => {
                    DomainError::Unauthenticated("Token has expired".to_string())
                }
                _ => DomainError::Unauthenticated("Token is invalid".to_string()),
            }
        })?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthenticated("User not found".to_string()))?;

        if !user.is_active {
            return Err(DomainError::Unauthenticated("User is inactive".to_string()));
        }

        Ok(user)
    }
}

fn duplicate_email() -> DomainError {
    DomainError::Validation("A user with this email already exists".to_string())
}

fn internal(e: AuthError) -> DomainError {
    DomainError::Internal(e.to_string())
}

fn gone_user(e: RepoError) -> DomainError {
    match e {
        RepoError::NotFound => DomainError::not_found("User"),
        other => other.into(),
    }
}
