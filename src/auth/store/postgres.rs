//! Postgres-backed store (`sql/schema.sql`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{Instrument, Span};
use uuid::Uuid;

use super::{
    InsertUserOutcome, NewUser, RotationOutcome, TokenStore, UpdateUserOutcome, User, UserStore,
};
use crate::auth::{
    scope::Scope,
    token::{TokenHash, TokenRecord},
};

const USER_COLUMNS: &str =
    "users.id, users.created_at, users.name, users.email, users.password_hash, users.activated, users.version";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &'static str, statement: &str) -> Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        created_at: row.get("created_at"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        activated: row.get("activated"),
        version: row.get("version"),
    }
}

async fn insert_token_row<'e, E>(executor: E, token: &TokenRecord) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let query = r"
        INSERT INTO tokens (hash, user_id, scope, expiry)
        VALUES ($1, $2, $3, $4)
    ";
    sqlx::query(query)
        .bind(token.hash.as_slice())
        .bind(token.user_id)
        .bind(token.scope.as_str())
        .bind(token.expiry)
        .execute(executor)
        .instrument(db_span("INSERT", query))
        .await
        .map(|_| ())
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &NewUser) -> Result<InsertUserOutcome> {
        let query = r"
            INSERT INTO users (name, email, password_hash, activated)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, version
        ";
        let row = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.activated)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await;

        match row {
            Ok(row) => Ok(InsertUserOutcome::Created(User {
                id: row.get("id"),
                created_at: row.get("created_at"),
                name: user.name.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                activated: user.activated,
                version: row.get("version"),
            })),
            Err(err) if is_unique_violation(&err) => Ok(InsertUserOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE users.email = $1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup user by email")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE users.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup user by id")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_user(&self, user: &User) -> Result<UpdateUserOutcome> {
        // The version predicate turns a concurrent edit into zero affected rows.
        let query = r"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING version
        ";
        let row = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.activated)
            .bind(user.id)
            .bind(user.version)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await;

        match row {
            Ok(Some(row)) => Ok(UpdateUserOutcome::Updated(User {
                version: row.get("version"),
                ..user.clone()
            })),
            Ok(None) => Ok(UpdateUserOutcome::Conflict),
            Err(err) if is_unique_violation(&err) => Ok(UpdateUserOutcome::Conflict),
            Err(err) => Err(err).context("failed to update user"),
        }
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert_token(&self, token: &TokenRecord) -> Result<bool> {
        match insert_token_row(&self.pool, token).await {
            Ok(()) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err).context("failed to insert token"),
        }
    }

    async fn user_for_token(&self, hash: &TokenHash, scope: Scope) -> Result<Option<User>> {
        let query = format!(
            r"
            SELECT {USER_COLUMNS}
            FROM users
            INNER JOIN tokens ON users.id = tokens.user_id
            WHERE tokens.hash = $1
              AND tokens.scope = $2
              AND tokens.expiry > NOW()
            LIMIT 1
            "
        );
        let row = sqlx::query(&query)
            .bind(hash.as_slice())
            .bind(scope.as_str())
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup token")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn rotate_refresh(
        &self,
        hash: &TokenHash,
        replacements: &[TokenRecord],
    ) -> Result<RotationOutcome> {
        let mut tx = self.pool.begin().await.context("begin rotation transaction")?;

        // Conditional mark: a concurrent rotation of the same row blocks on the row
        // lock and then sees `deactivated_at` set, so only one caller gets a row back.
        let query = r"
            UPDATE tokens
            SET deactivated_at = NOW()
            WHERE hash = $1
              AND scope = 'refresh'
              AND expiry > NOW()
              AND deactivated_at IS NULL
            RETURNING user_id
        ";
        let marked = sqlx::query(query)
            .bind(hash.as_slice())
            .fetch_optional(&mut *tx)
            .instrument(db_span("UPDATE", query))
            .await
            .context("failed to mark refresh token")?;

        let Some(marked) = marked else {
            let query = r"
                SELECT user_id
                FROM tokens
                WHERE hash = $1
                  AND scope = 'refresh'
                  AND expiry > NOW()
                  AND deactivated_at IS NOT NULL
            ";
            let consumed = sqlx::query(query)
                .bind(hash.as_slice())
                .fetch_optional(&mut *tx)
                .instrument(db_span("SELECT", query))
                .await
                .context("failed to lookup consumed refresh token")?;
            tx.commit().await.context("commit rotation lookup")?;

            return Ok(consumed.map_or(RotationOutcome::NotFound, |row| {
                RotationOutcome::Reused {
                    user_id: row.get("user_id"),
                }
            }));
        };

        let user_id: Uuid = marked.get("user_id");
        for token in replacements {
            insert_token_row(&mut *tx, token)
                .await
                .context("failed to insert replacement token")?;
        }

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE users.id = $1");
        let user = sqlx::query(&query)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to load refresh token owner")?;

        tx.commit().await.context("commit rotation transaction")?;

        Ok(RotationOutcome::Rotated(user_from_row(&user)))
    }

    async fn delete_all_for_user(&self, user_id: Uuid, scopes: &[Scope]) -> Result<u64> {
        let scopes: Vec<&'static str> = scopes.iter().map(|scope| scope.as_str()).collect();
        let query = "DELETE FROM tokens WHERE user_id = $1 AND scope = ANY($2)";
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(scopes)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to delete tokens for user")?;
        Ok(result.rows_affected())
    }

    async fn delete_token(&self, hash: &TokenHash) -> Result<()> {
        // Idempotent; it's fine if no rows are deleted.
        let query = "DELETE FROM tokens WHERE hash = $1";
        sqlx::query(query)
            .bind(hash.as_slice())
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to delete token")?;
        Ok(())
    }
}
