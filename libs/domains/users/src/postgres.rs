use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserId};
use crate::repository::UserRepository;

const COLUMNS: &str = "id, email, name, age, created_at, updated_at";

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    age: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::from_parts(
            UserId::from_uuid(row.id),
            row.name,
            row.email,
            row.age,
            row.created_at,
            row.updated_at,
        )
    }
}

fn db_error(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                age = EXCLUDED.age,
                updated_at = NOW()
            RETURNING {COLUMNS}, (xmax = 0) AS inserted
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id().into_uuid().into(),
                user.email().into(),
                user.name().into(),
                user.age().into(),
                user.created_at().into(),
                user.updated_at().into(),
            ],
        );

        let row = self
            .db
            .query_one_raw(stmt)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserError::DuplicateEmail(user.email().to_string())
                } else {
                    db_error(e)
                }
            })?
            .ok_or_else(|| UserError::Internal("Failed to save user".to_string()))?;

        let inserted: bool = row.try_get("", "inserted").map_err(db_error)?;
        let saved: User = UserRow::from_query_result(&row, "")
            .map_err(db_error)?
            .into();

        if inserted {
            tracing::info!(user_id = %saved.id(), "Created user");
        } else {
            tracing::info!(user_id = %saved.id(), "Updated user");
        }
        Ok(saved)
    }

    async fn find_by_id(&self, id: UserId) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into_uuid().into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY created_at, id");
        let stmt = Statement::from_string(DbBackend::Postgres, sql);

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_by_id(&self, id: UserId) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into_uuid().into()],
        );

        let result = self.db.execute_raw(stmt).await.map_err(db_error)?;
        let removed = result.rows_affected() > 0;

        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }
}
