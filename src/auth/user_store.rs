//! User Storage
//! Mission: Store and look up user credentials

use crate::auth::models::{NewUser, User, UserRole};
use crate::db::{is_constraint_violation, Database};
use crate::pagination::{like_any, ListParams, Sortable};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    Row,
};
use std::fmt;
use tracing::info;

pub const USER_SORTABLE: Sortable = Sortable {
    columns: &["id", "username", "email", "created_at"],
    default: "id",
};

/// Username or email already taken at insert time.
#[derive(Debug)]
pub struct DuplicateUser;

impl fmt::Display for DuplicateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "username or email already registered")
    }
}

impl std::error::Error for DuplicateUser {}

/// Credential store. Implementations hand out ids as strings.
pub trait UserStore: Send + Sync {
    /// Match on username OR email
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>>;

    fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    fn exists_by_username_or_email(&self, username: &str, email: &str) -> Result<bool>;

    /// Fails with [`DuplicateUser`] on a uniqueness violation
    fn create_user(&self, user: NewUser) -> Result<User>;

    fn count_admins(&self) -> Result<usize>;

    /// `None` when no user has this id
    fn set_alumni_id(&self, id: &str, alumni_id: Option<i64>) -> Result<Option<User>>;

    fn list_users(&self, params: &ListParams) -> Result<(Vec<User>, usize)>;
}

/// User storage with SQLite backend
pub struct SqliteUserStore {
    db: Database,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, alumni_id, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(4)?;
    let role = UserRole::from_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown role {:?}", role_str).into(),
        )
    })?;

    Ok(User {
        id: row.get::<_, i64>(0)?.to_string(),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        alumni_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl SqliteUserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl UserStore for SqliteUserStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM users WHERE username = ?1 OR email = ?1 LIMIT 1",
            USER_COLUMNS
        ))?;

        match stmt.query_row(params![identifier], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to look up user"),
        }
    }

    fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        // Ids from other stores (UUIDs) never match a rowid
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(None);
        };

        let conn = self.db.lock();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))?;

        match stmt.query_row(params![rowid], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to look up user by id"),
        }
    }

    fn exists_by_username_or_email(&self, username: &str, email: &str) -> Result<bool> {
        let conn = self.db.lock();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
                params![username, email],
                |row| row.get(0),
            )
            .context("Failed to check for existing user")?;
        Ok(exists)
    }

    fn create_user(&self, user: NewUser) -> Result<User> {
        let created_at = Utc::now().to_rfc3339();
        let conn = self.db.lock();

        let inserted = conn.execute(
            "INSERT INTO users (username, email, password_hash, role, alumni_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.alumni_id,
                created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(DuplicateUser.into()),
            Err(e) => return Err(e).context("Failed to insert user"),
        }

        let id = conn.last_insert_rowid();

        info!("✅ Created user: {} ({})", user.username, user.role.as_str());

        Ok(User {
            id: id.to_string(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            alumni_id: user.alumni_id,
            created_at,
        })
    }

    fn count_admins(&self) -> Result<usize> {
        let conn = self.db.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;
        Ok(count as usize)
    }

    fn set_alumni_id(&self, id: &str, alumni_id: Option<i64>) -> Result<Option<User>> {
        let Ok(rowid) = id.parse::<i64>() else {
            return Ok(None);
        };

        let conn = self.db.lock();
        let changed = conn
            .execute(
                "UPDATE users SET alumni_id = ?1 WHERE id = ?2",
                params![alumni_id, rowid],
            )
            .context("Failed to link user to alumni")?;
        if changed == 0 {
            return Ok(None);
        }

        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))?;
        let user = stmt
            .query_row(params![rowid], user_from_row)
            .context("Failed to reload linked user")?;
        Ok(Some(user))
    }

    fn list_users(&self, params: &ListParams) -> Result<(Vec<User>, usize)> {
        let pattern = params.search_pattern();
        let where_sql = if pattern.is_some() {
            format!("WHERE {}", like_any(&["username", "email"], 1))
        } else {
            String::new()
        };
        let mut bound: Vec<Value> = pattern.into_iter().map(Value::Text).collect();

        let conn = self.db.lock();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM users {}", where_sql),
                params_from_iter(bound.iter()),
                |row| row.get(0),
            )
            .context("Failed to count users")?;

        let sql = format!(
            "SELECT {} FROM users {} ORDER BY {} {}",
            USER_COLUMNS,
            where_sql,
            params.order_by_sql(),
            params.window_sql(bound.len() + 1)
        );
        bound.extend(params.window_values().map(Value::Integer));
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map(params_from_iter(bound.iter()), user_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list users")?;

        Ok((users, total as usize))
    }
}
