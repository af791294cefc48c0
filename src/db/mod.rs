//! Persistence boundary.
//!
//! Handlers talk to a [`Repository`]; production wires in [`PgRepository`],
//! tests use the in-memory implementation. Every folder and photo query takes
//! the owning user's id so ownership is enforced at the query level.

use async_trait::async_trait;

use crate::models::folder::Folder;
use crate::models::photo::{NewPhoto, Photo, PhotoChanges};
use crate::models::user::{NewUser, User, UserChanges};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("A user with that username already exists.")]
    UsernameTaken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<User>, RepositoryError>;

    async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError>;

    /// Deletes the user with everything they own. Returns the image paths of
    /// the removed photos, or `None` when the user does not exist.
    async fn delete_user(&self, id: i32) -> Result<Option<Vec<String>>, RepositoryError>;

    async fn list_folders(&self, user_id: i32) -> Result<Vec<Folder>, RepositoryError>;

    async fn find_folder(&self, id: i32, user_id: i32) -> Result<Option<Folder>, RepositoryError>;

    async fn create_folder(&self, user_id: i32, name: &str) -> Result<Folder, RepositoryError>;

    async fn rename_folder(
        &self,
        id: i32,
        user_id: i32,
        name: &str,
    ) -> Result<Option<Folder>, RepositoryError>;

    /// Returns the user's oldest folder called `name`, creating it when absent.
    /// The flag is `true` when a folder was created.
    async fn get_or_create_folder(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<(Folder, bool), RepositoryError>;

    /// Atomically deletes every photo referencing the folder and then the
    /// folder itself. Returns the image paths of the removed photos, or `None`
    /// when the folder is not owned by `user_id`.
    async fn delete_folder(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<Vec<String>>, RepositoryError>;

    async fn list_photos(&self, user_id: i32, folder_id: i32)
        -> Result<Vec<Photo>, RepositoryError>;

    async fn find_photo(&self, id: i32, user_id: i32) -> Result<Option<Photo>, RepositoryError>;

    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, RepositoryError>;

    async fn update_photo(
        &self,
        id: i32,
        user_id: i32,
        changes: PhotoChanges,
    ) -> Result<Option<Photo>, RepositoryError>;

    async fn delete_photo(&self, id: i32, user_id: i32) -> Result<Option<Photo>, RepositoryError>;
}
