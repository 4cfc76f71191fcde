//! In-memory `UserStore` used by the service and RPC tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::{
    error::{UserError, UserResult},
    repo::UserStore,
    repo_types::{NewUser, UserCredentials, UserField, UserMatch, UserRow},
};

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub bio: String,
    pub avatar_url: String,
    pub last_seen: OffsetDateTime,
    pub pass_hash: Option<Vec<u8>>,
}

/// Keyed by id so iteration order matches `ORDER BY id`.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<BTreeMap<String, StoredUser>>,
    calls: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn ids(&self) -> Vec<String> {
        self.rows.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<StoredUser> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn set_pass_hash(&self, id: &str, hash: &[u8]) {
        if let Some(row) = self.rows.lock().unwrap().get_mut(id) {
            row.pass_hash = Some(hash.to_vec());
        }
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn project(user: &StoredUser, fields: &[UserField]) -> UserRow {
    let mut row = UserRow::default();
    for field in fields {
        match field {
            UserField::Id => row.id = Some(user.id.clone()),
            UserField::Name => row.name = user.name.clone(),
            UserField::Username => row.username = Some(user.username.clone()),
            UserField::Bio => row.bio = Some(user.bio.clone()),
            UserField::AvatarUrl => row.avatar_url = Some(user.avatar_url.clone()),
            UserField::LastSeen => row.last_seen = Some(user.last_seen),
        }
    }
    row
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn save_user(&self, user: NewUser) -> UserResult<()> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&user.id) || rows.values().any(|u| u.email == user.email) {
            return Err(UserError::UserExists);
        }
        rows.insert(
            user.id.clone(),
            StoredUser {
                id: user.id,
                email: user.email,
                username: user.username,
                name: user.name,
                bio: String::new(),
                avatar_url: user.avatar_url,
                last_seen: OffsetDateTime::now_utc(),
                pass_hash: None,
            },
        );
        Ok(())
    }

    async fn remove_user(&self, id: &str) -> UserResult<()> {
        self.touch();
        self.rows
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> UserResult<UserCredentials> {
        self.touch();
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .map(|u| UserCredentials {
                id: u.id.clone(),
                username: u.username.clone(),
                pass_hash: u.pass_hash.clone(),
            })
            .ok_or(UserError::UserNotFound)
    }

    async fn find_users(
        &self,
        fields: &[UserField],
        matcher: &UserMatch,
    ) -> UserResult<Vec<UserRow>> {
        self.touch();
        if fields.is_empty() {
            return Err(UserError::InvalidFields);
        }
        let rows = self.rows.lock().unwrap();
        let matched = rows.values().filter(|u| match matcher {
            UserMatch::ById(ids) => ids.contains(&u.id),
            UserMatch::ByUsernamePattern(p) => u.username.contains(p.as_str()),
            UserMatch::ByUsernameSet(names) => names.contains(&u.username),
        });
        Ok(matched.map(|u| project(u, fields)).collect())
    }
}

/// Store whose every call fails the way a dropped database would.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn save_user(&self, _user: NewUser) -> UserResult<()> {
        Err(UserError::storage("memory.save_user")(sqlx::Error::PoolTimedOut))
    }

    async fn remove_user(&self, _id: &str) -> UserResult<()> {
        Err(UserError::storage("memory.remove_user")(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_email(&self, _email: &str) -> UserResult<UserCredentials> {
        Err(UserError::storage("memory.find_by_email")(sqlx::Error::PoolTimedOut))
    }

    async fn find_users(
        &self,
        _fields: &[UserField],
        _matcher: &UserMatch,
    ) -> UserResult<Vec<UserRow>> {
        Err(UserError::storage("memory.find_users")(sqlx::Error::PoolTimedOut))
    }
}
