use std::collections::HashMap;

use blueprints_config::UserCredential;
use blueprints_token::ScopeSet;
use subtle::ConstantTimeEq;

/// Source of truth for who may log in and with which scopes
pub trait CredentialStore: Send + Sync {
    /// Whether the password matches the one recorded for `username`
    fn validate(&self, username: &str, password: &str) -> bool;

    /// Scopes recorded for `username`, `None` for unknown users
    fn scopes(&self, username: &str) -> Option<ScopeSet>;
}

#[derive(Clone)]
struct Entry {
    password: String,
    scopes: ScopeSet,
}

/// Static credential table held in memory.
///
/// Passwords are stored and compared as plain text; the comparison is
/// constant-time but there is no hashing.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, Entry>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: &[UserCredential]) -> Self {
        users.iter().fold(Self::new(), |store, user| {
            store.with_user(&user.username, &user.password, user.scopes.iter().cloned())
        })
    }

    /// Add or replace one user
    pub fn with_user<S: Into<String>>(
        mut self,
        username: &str,
        password: &str,
        scopes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.users.insert(
            username.to_string(),
            Entry {
                password: password.to_string(),
                scopes: scopes.into_iter().collect(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.users.keys().collect();
        names.sort();
        f.debug_struct("InMemoryCredentialStore")
            .field("users", &names)
            .finish()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn validate(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(entry) => entry.password.as_bytes().ct_eq(password.as_bytes()).into(),
            None => false,
        }
    }

    fn scopes(&self, username: &str) -> Option<ScopeSet> {
        self.users.get(username).map(|entry| entry.scopes.clone())
    }
}
