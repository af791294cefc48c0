use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::AppError;

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Public view of a user. Password material never leaves the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserCreateRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl UserCreateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        if self.password != self.password_confirm {
            return Err(AppError::validation("Passwords don't match"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl UserUpdateRequest {
    /// `full` is a PUT: username and both password fields must be present.
    pub fn validate(&self, full: bool) -> Result<(), AppError> {
        if full {
            for (field, value) in [
                ("username", &self.username),
                ("password", &self.password),
                ("password_confirm", &self.password_confirm),
            ] {
                if value.is_none() {
                    return Err(AppError::validation(format!("{field} is required")));
                }
            }
        }

        if let Some(username) = &self.username {
            validate_username(username)?;
        }

        match (&self.password, &self.password_confirm) {
            (None, None) => Ok(()),
            (Some(password), Some(confirm)) => {
                validate_password(password)?;
                if password != confirm {
                    return Err(AppError::validation("Passwords don't match"));
                }
                Ok(())
            }
            _ => Err(AppError::validation(
                "password and password_confirm must be provided together",
            )),
        }
    }
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i32,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::validation("username may not be blank"));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(AppError::validation(format!(
            "username may not exceed {USERNAME_MAX_LEN} characters"
        )));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(AppError::validation(
            "username may contain only letters, numbers, and @/./+/-/_ characters",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}
