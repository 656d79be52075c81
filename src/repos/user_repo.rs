/*
 * Responsibility
 * - Persistence for the `users` table behind the `UserRepo` trait
 * - PgUserRepo (SQLx / Postgres) for deployments, MemoryUserRepo for local runs and tests
 * - Emails are stored as given; callers normalise them before lookup/insert
 */
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // `RepoError::Conflict` when the email is already taken.
    async fn create(&self, user: NewUser) -> RepoResult<UserRow>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRow>>;

    // `Ok(None)` when no row has this id.
    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRow>>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $1
            RETURNING id, email, name, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.password_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}

/// Process-local store used when no `DATABASE_URL` is configured.
#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    rows: RwLock<HashMap<Uuid, UserRow>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        // Hold the write lock across the uniqueness check and the insert.
        let mut rows = self.rows.write().await;
        if rows.values().any(|r| r.email == user.email) {
            return Err(RepoError::Conflict);
        }

        let row = UserRow {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|r| r.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRow>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRow>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            row.password_hash = password_hash;
        }
        Ok(Some(row.clone()))
    }
}
