//! PostgreSQL user store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::info;

use notewell_core::{CreateUserRequest, Error, Result, User, UserStore};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, external_provider_id, created_at, updated_at";

/// PostgreSQL implementation of UserStore.
pub struct PgUserStore {
    pool: Pool<Postgres>,
}

impl PgUserStore {
    /// Create a new PgUserStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_user_row(row: PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        external_provider_id: row.get("external_provider_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a unique-constraint violation to `Conflict`; the insert never ran, so
/// the existing record is untouched.
fn map_insert_error(err: sqlx::Error) -> Error {
    let msg = err.to_string();
    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        if msg.contains("email") {
            Error::Conflict("email already registered".to_string())
        } else {
            Error::Conflict("provider id already linked".to_string())
        }
    } else {
        Error::Database(err)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_user_row))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_user_row))
    }

    async fn get_by_provider_id(&self, provider_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE external_provider_id = $1"
        ))
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_user_row))
    }

    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO app_user (email, name, password_hash, external_provider_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&req.email)
        .bind(&req.name)
        .bind(&req.password_hash)
        .bind(&req.external_provider_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        let user = map_user_row(row);
        info!(
            subsystem = "database",
            op = "create_user",
            user_id = user.id,
            "User created"
        );
        Ok(user)
    }

    async fn link_provider(&self, id: i64, provider_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE app_user SET external_provider_id = $1, updated_at = $2
             WHERE id = $3
             RETURNING {USER_COLUMNS}"
        ))
        .bind(provider_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(row.map(map_user_row))
    }
}
