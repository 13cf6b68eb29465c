use crate::user_models::{AuthToken, User};
use anyhow::{bail, Context, Result};
use chrono::Duration;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const USERS_FILE: &str = "users.json";

/// Accounts live on disk; issued tokens only in memory, so a restart
/// invalidates every session.
pub struct UserStorage {
    path: PathBuf,
    users: RwLock<Vec<User>>,
    tokens: RwLock<HashMap<String, AuthToken>>,
    token_ttl: Duration,
}

impl UserStorage {
    pub fn new(data_dir: &Path, token_ttl: Duration) -> Result<Self> {
        let path = data_dir.join(USERS_FILE);
        let users = if path.exists() {
            let data = fs::read_to_string(&path)
                .context("Failed to read users file")?;
            serde_json::from_str(&data)
                .context("Failed to parse users file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
            tokens: RwLock::new(HashMap::new()),
            token_ttl,
        })
    }

    pub async fn create_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            bail!("Username already exists");
        }

        users.push(user.clone());
        self.save_users_to_disk(&users)?;
        Ok(user)
    }

    /// Replaces the password hash of an existing account.
    pub async fn set_password_hash(&self, username: &str, password_hash: String) -> Result<()> {
        let mut users = self.users.write().await;

        let Some(user) = users.iter_mut().find(|u| u.username == username) else {
            bail!("User not found: {}", username);
        };
        user.password_hash = password_hash;
        self.save_users_to_disk(&users)?;
        Ok(())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.username == username).cloned()
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Checks the password with bcrypt; `Ok(None)` for unknown user or wrong password.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_user_by_username(username).await else {
            return Ok(None);
        };

        let valid = bcrypt::verify(password, &user.password_hash)
            .context("Failed to verify password")?;

        Ok(valid.then_some(user))
    }

    pub async fn issue_token(&self, user: &User) -> AuthToken {
        let token = AuthToken::issue(user.id.clone(), self.token_ttl);
        self.tokens
            .write()
            .await
            .insert(token.token.clone(), token.clone());
        token
    }

    /// Resolves a bearer token to its user, dropping it if expired.
    pub async fn user_for_token(&self, token: &str) -> Option<User> {
        let user_id = {
            let mut tokens = self.tokens.write().await;
            let (user_id, expired) = {
                let issued = tokens.get(token)?;
                (issued.user_id.clone(), issued.is_expired())
            };
            if expired {
                tokens.remove(token);
                return None;
            }
            user_id
        };

        let users = self.users.read().await;
        users.iter().find(|u| u.id == user_id).cloned()
    }

    pub async fn purge_expired_tokens(&self) -> usize {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        before - tokens.len()
    }

    fn save_users_to_disk(&self, users: &[User]) -> Result<()> {
        let json = serde_json::to_string_pretty(users)
            .context("Failed to serialize users")?;
        fs::write(&self.path, json)
            .context("Failed to write to users file")?;
        Ok(())
    }
}
