use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::users::{
    error::{UserError, UserResult},
    repo_types::{NewUser, UserCredentials, UserField, UserMatch, UserRow},
};

/// Everything the service needs from the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn save_user(&self, user: NewUser) -> UserResult<()>;
    async fn remove_user(&self, id: &str) -> UserResult<()>;
    async fn find_by_email(&self, email: &str) -> UserResult<UserCredentials>;
    async fn find_users(&self, fields: &[UserField], matcher: &UserMatch)
        -> UserResult<Vec<UserRow>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(op: &'static str) -> impl FnOnce(sqlx::Error) -> UserError {
    move |err| match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => UserError::UserExists,
        other => UserError::Storage { op, source: other },
    }
}

/// Escapes LIKE metacharacters so the pattern matches as a plain substring.
pub(crate) fn substring_pattern(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('%');
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

pub(crate) fn select_users_sql(fields: &[UserField], matcher: &UserMatch) -> String {
    let columns = fields
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ");
    let predicate = match matcher {
        UserMatch::ById(_) => "id = ANY($1)",
        UserMatch::ByUsernamePattern(_) => "username LIKE $1",
        UserMatch::ByUsernameSet(_) => "username = ANY($1)",
    };
    format!("SELECT {columns} FROM users WHERE {predicate} ORDER BY id")
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn save_user(&self, user: NewUser) -> UserResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, name, avatar_url, last_seen)
            VALUES ($1, $2, $3, $4, $5, now())
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .execute(&self.db)
        .await
        .map_err(map_insert_error("repo.save_user"))?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(())
    }

    async fn remove_user(&self, id: &str) -> UserResult<()> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(UserError::storage("repo.remove_user"))?;
        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<UserCredentials> {
        sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, username, pass_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(UserError::storage("repo.find_by_email"))?
        .ok_or(UserError::UserNotFound)
    }

    async fn find_users(
        &self,
        fields: &[UserField],
        matcher: &UserMatch,
    ) -> UserResult<Vec<UserRow>> {
        if fields.is_empty() {
            return Err(UserError::InvalidFields);
        }
        let sql = select_users_sql(fields, matcher);
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match matcher {
            UserMatch::ById(ids) => query.bind(ids),
            UserMatch::ByUsernamePattern(pattern) => query.bind(substring_pattern(pattern)),
            UserMatch::ByUsernameSet(names) => query.bind(names),
        };
        let rows = query
            .fetch_all(&self.db)
            .await
            .map_err(UserError::storage("repo.find_users"))?;
        debug!(count = rows.len(), "users fetched");
        Ok(rows)
    }
}
