//! In-memory store fakes shared by this crate's unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthResult;
use crate::storage::{FederatedCredential, IdentityStore, NewUser, SessionStore, User};

/// In-memory identity store backed by mutex-guarded maps.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    users: Mutex<HashMap<Uuid, User>>,
    credentials: Mutex<Vec<FederatedCredential>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.lock().unwrap().len()
    }

    /// Inserts a user directly, bypassing provisioning.
    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// Removes a user directly, simulating referential inconsistency.
    pub fn remove_user(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_user(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_credential(
        &self,
        provider: &str,
        subject: &str,
    ) -> AuthResult<Option<FederatedCredential>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.provider == provider && c.subject == subject)
            .cloned())
    }

    async fn create_user_with_credential(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> AuthResult<User> {
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().insert(created.id, created.clone());
        self.credentials.lock().unwrap().push(FederatedCredential {
            provider: provider.to_string(),
            subject: subject.to_string(),
            user_id: created.id,
        });
        Ok(created)
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, (Uuid, OffsetDateTime)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> AuthResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn resolve(
        &self,
        token: &str,
        new_expires_at: OffsetDateTime,
    ) -> AuthResult<Option<Uuid>> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(token) {
            Some((user_id, expires_at)) if *expires_at > OffsetDateTime::now_utc() => {
                *expires_at = new_expires_at;
                Ok(Some(*user_id))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

/// Builds a user with fixed fields for assertions.
pub fn sample_user(name: &str, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        profile_picture: None,
        created_at: OffsetDateTime::now_utc(),
    }
}
