use async_trait::async_trait;
use sqlx::PgPool;

use super::{Repository, RepositoryError};
use crate::models::folder::Folder;
use crate::models::photo::{NewPhoto, Photo, PhotoChanges};
use crate::models::user::{NewUser, User, UserChanges};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::UsernameTaken,
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            "
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, date_joined
            ",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_error)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, date_joined FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, User>(
            "
            UPDATE users
            SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash)
            WHERE id = $1
            RETURNING id, username, email, password_hash, date_joined
            ",
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_error)
    }

    async fn delete_user(&self, id: i32) -> Result<Option<Vec<String>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let images: Vec<String> =
            sqlx::query_scalar("SELECT image FROM photos WHERE user_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        // folders and photos go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(images))
    }

    async fn list_folders(&self, user_id: i32) -> Result<Vec<Folder>, RepositoryError> {
        let folders = sqlx::query_as::<_, Folder>(
            "
            SELECT id, user_id, name, created_at, updated_at
            FROM folders
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(folders)
    }

    async fn find_folder(&self, id: i32, user_id: i32) -> Result<Option<Folder>, RepositoryError> {
        let folder = sqlx::query_as::<_, Folder>(
            "
            SELECT id, user_id, name, created_at, updated_at
            FROM folders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn create_folder(&self, user_id: i32, name: &str) -> Result<Folder, RepositoryError> {
        let folder = sqlx::query_as::<_, Folder>(
            "
            INSERT INTO folders (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn rename_folder(
        &self,
        id: i32,
        user_id: i32,
        name: &str,
    ) -> Result<Option<Folder>, RepositoryError> {
        let folder = sqlx::query_as::<_, Folder>(
            "
            UPDATE folders
            SET name = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn get_or_create_folder(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<(Folder, bool), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // serialise concurrent get-or-create calls for the same user
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, Folder>(
            "
            SELECT id, user_id, name, created_at, updated_at
            FROM folders
            WHERE user_id = $1 AND name = $2
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(folder) = existing {
            tx.commit().await?;
            return Ok((folder, false));
        }

        let folder = sqlx::query_as::<_, Folder>(
            "
            INSERT INTO folders (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((folder, true))
    }

    async fn delete_folder(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<Vec<String>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !owned {
            tx.rollback().await?;
            return Ok(None);
        }

        let images: Vec<String> =
            sqlx::query_scalar("DELETE FROM photos WHERE folder_id = $1 RETURNING image")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(images))
    }

    async fn list_photos(
        &self,
        user_id: i32,
        folder_id: i32,
    ) -> Result<Vec<Photo>, RepositoryError> {
        let photos = sqlx::query_as::<_, Photo>(
            "
            SELECT
                p.id, p.user_id, p.folder_id, f.name AS folder_name,
                p.title, p.description, p.image, p.created_at, p.updated_at
            FROM
                photos p
                LEFT JOIN folders f ON f.id = p.folder_id
            WHERE
                p.user_id = $1 AND
                p.folder_id = $2
            ORDER BY p.id
            ",
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn find_photo(&self, id: i32, user_id: i32) -> Result<Option<Photo>, RepositoryError> {
        let photo = sqlx::query_as::<_, Photo>(
            "
            SELECT
                p.id, p.user_id, p.folder_id, f.name AS folder_name,
                p.title, p.description, p.image, p.created_at, p.updated_at
            FROM
                photos p
                LEFT JOIN folders f ON f.id = p.folder_id
            WHERE
                p.id = $1 AND
                p.user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, RepositoryError> {
        let photo = sqlx::query_as::<_, Photo>(
            "
            WITH inserted AS (
                INSERT INTO photos (user_id, folder_id, title, description, image)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT
                i.id, i.user_id, i.folder_id, f.name AS folder_name,
                i.title, i.description, i.image, i.created_at, i.updated_at
            FROM
                inserted i
                LEFT JOIN folders f ON f.id = i.folder_id
            ",
        )
        .bind(photo.user_id)
        .bind(photo.folder_id)
        .bind(&photo.title)
        .bind(&photo.description)
        .bind(&photo.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(photo)
    }

    async fn update_photo(
        &self,
        id: i32,
        user_id: i32,
        changes: PhotoChanges,
    ) -> Result<Option<Photo>, RepositoryError> {
        let photo = sqlx::query_as::<_, Photo>(
            "
            WITH updated AS (
                UPDATE photos
                SET
                    title = COALESCE($3, title),
                    description = CASE WHEN $6 THEN $4 ELSE description END,
                    image = COALESCE($5, image),
                    updated_at = NOW()
                WHERE id = $1 AND user_id = $2
                RETURNING *
            )
            SELECT
                u.id, u.user_id, u.folder_id, f.name AS folder_name,
                u.title, u.description, u.image, u.created_at, u.updated_at
            FROM
                updated u
                LEFT JOIN folders f ON f.id = u.folder_id
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.title)
        .bind(changes.description.clone().flatten())
        .bind(changes.image)
        .bind(changes.description.is_some())
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    async fn delete_photo(&self, id: i32, user_id: i32) -> Result<Option<Photo>, RepositoryError> {
        let photo = sqlx::query_as::<_, Photo>(
            "
            WITH deleted AS (
                DELETE FROM photos
                WHERE id = $1 AND user_id = $2
                RETURNING *
            )
            SELECT
                d.id, d.user_id, d.folder_id, f.name AS folder_name,
                d.title, d.description, d.image, d.created_at, d.updated_at
            FROM
                deleted d
                LEFT JOIN folders f ON f.id = d.folder_id
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }
}
