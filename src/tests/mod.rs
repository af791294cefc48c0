use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{hash_password, TokenService};
use crate::config::{JwtSettings, MediaSettings};
use crate::db::memory::MemoryRepository;
use crate::db::Repository;
use crate::models::user::{NewUser, TokenType};
use crate::utils::media::MediaStorage;


pub const TEST_PASSWORD: &str = "password123";
pub const JPEG: &[u8] = b"\xff\xd8\xff\xe0fake jpeg body";
const BOUNDARY: &str = "----photoappboundary7MA4YWxkTrZu0gW";

/// App state over an in-memory repository and a throwaway media root.
pub struct TestContext {
    pub state: web::Data<AppState>,
    pub repo: MemoryRepository,
    media_root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_media(|media| media)
    }

    pub fn with_media(customize: impl FnOnce(MediaSettings) -> MediaSettings) -> Self {
        let repo = MemoryRepository::new();
        let media_root = std::env::temp_dir().join(format!("photo_app_test_{}", Uuid::new_v4()));
        let media = customize(MediaSettings::new(media_root.clone()));

        let state = AppState {
            repo: Arc::new(repo.clone()),
            tokens: TokenService::new(&JwtSettings::new("test-secret")),
            media: MediaStorage::new(&media),
            bcrypt_cost: 4,
        };

        Self {
            state: web::Data::new(state),
            repo,
            media_root,
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Seeds a user with [`TEST_PASSWORD`] and returns its id and an access token.
    pub async fn create_user(&self, username: &str) -> (i32, String) {
        let password_hash = hash_password(TEST_PASSWORD.to_string(), 4).await.unwrap();
        let user = self
            .repo
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash,
            })
            .await
            .unwrap();
        let token = self.state.tokens.issue(user.id, TokenType::Access).unwrap();

        (user.id, token)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.media_root).ok();
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Builds a `multipart/form-data` body. `image` is `(filename, content type, bytes)`.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
