//! In-memory credential store
//!
//! Alternate `UserStore` backing the router tests. Issues UUID ids instead of
//! rowids; the server binary always uses `SqliteUserStore`.

use crate::auth::models::{NewUser, User, UserRole};
use crate::auth::user_store::{DuplicateUser, UserStore};
use crate::pagination::{ListParams, SortOrder};
use anyhow::Result;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

fn compare(a: &User, b: &User, column: &str) -> Ordering {
    match column {
        "username" => a.username.cmp(&b.username),
        "email" => a.email.cmp(&b.email),
        "created_at" => a.created_at.cmp(&b.created_at),
        _ => Ordering::Equal,
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    fn exists_by_username_or_email(&self, username: &str, email: &str) -> Result<bool> {
        Ok(self
            .users
            .read()
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    fn create_user(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write();
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(DuplicateUser.into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            alumni_id: user.alumni_id,
            created_at: Utc::now().to_rfc3339(),
        };
        users.push(user.clone());
        Ok(user)
    }

    fn count_admins(&self) -> Result<usize> {
        Ok(self
            .users
            .read()
            .iter()
            .filter(|u| u.role == UserRole::Admin)
            .count())
    }

    fn set_alumni_id(&self, id: &str, alumni_id: Option<i64>) -> Result<Option<User>> {
        let mut users = self.users.write();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.alumni_id = alumni_id;
            user.clone()
        }))
    }

    fn list_users(&self, params: &ListParams) -> Result<(Vec<User>, usize)> {
        let users = self.users.read();
        // Insertion order stands in for the rowid order
        let mut matched: Vec<(usize, &User)> = users
            .iter()
            .enumerate()
            .filter(|(_, u)| params.matches(&[u.username.as_str(), u.email.as_str()]))
            .collect();

        matched.sort_by(|(ia, a), (ib, b)| {
            let primary = match params.sort_by {
                "id" => ia.cmp(ib),
                column => compare(a, b, column),
            };
            let primary = match params.order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then(ia.cmp(ib))
        });

        let total = matched.len();
        let page = matched
            .into_iter()
            .skip(params.offset())
            .take(params.limit)
            .map(|(_, u)| u.clone())
            .collect();

        Ok((page, total))
    }
}
