//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying a `token_type` so an access token can never
//! be used as a refresh token and vice versa. Handlers that need a caller take
//! an [`AuthenticatedUser`] argument.

use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtSettings;
use crate::message::AppError;
use crate::models::user::{Claims, TokenPair, TokenType};

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_ttl: Duration::minutes(settings.access_minutes),
            refresh_ttl: Duration::hours(settings.refresh_hours),
        }
    }

    pub fn issue(&self, user_id: i32, token_type: TokenType) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            token_type,
            user_id,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(&JwtHeader::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn issue_pair(&self, user_id: i32) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Verifies signature, expiry and token type.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AppError::InvalidToken)?;

        if data.claims.token_type != expected {
            return Err(AppError::InvalidToken);
        }
        Ok(data.claims)
    }
}

/// The caller identified by a valid access token whose user still exists.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or(AppError::MissingState)?;

            let credentials =
                Authorization::<Bearer>::parse(&req).map_err(|_| AppError::NotAuthenticated)?;
            let claims = state
                .tokens
                .decode(credentials.into_scheme().token(), TokenType::Access)?;

            match state.repo.find_user(claims.user_id).await? {
                Some(user) => Ok(AuthenticatedUser { user_id: user.id }),
                None => Err(AppError::InvalidToken),
            }
        })
    }
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hashed = web::block(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let valid = web::block(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}
