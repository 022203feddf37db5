use crate::api::{ApiClient, ApiResult};
use crate::model::User;
use crate::telemetry::LogManager;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("session store io: {0}")]
    Io(#[from] io::Error),
    #[error("session store encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed copy of the signed-in user, read at startup before the server
/// confirms the session.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unreadable or corrupt contents are discarded.
    pub fn load(&self) -> Option<User> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(user) => Some(user),
            Err(_) => {
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    pub fn save(&self, user: &User) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(user)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Login state handed to the parts of the app that need it.
#[derive(Debug, Clone)]
pub struct Session {
    user: Option<User>,
    store: Option<UserStore>,
    logger: LogManager,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            store: None,
            logger: LogManager::new("session"),
        }
    }

    pub fn restore(store: UserStore) -> Self {
        let user = store.load();
        Self {
            user,
            store: Some(store),
            logger: LogManager::new("session"),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn set_user(&mut self, user: User) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&user) {
                self.logger.warn(&format!("could not persist user: {err}"));
            }
        }
        self.logger
            .record(&format!("signed in as {}", user.user_login_id));
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                self.logger.warn(&format!("could not clear stored user: {err}"));
            }
        }
        self.user = None;
    }

    /// Confirms the stored user with `/users/me`; any failure signs out locally.
    pub async fn refresh(&mut self, client: &ApiClient) -> Option<&User> {
        match client.current_user().await {
            Ok(user) => self.set_user(user),
            Err(err) => {
                self.logger.warn(&format!("error fetching current user: {err}"));
                self.clear();
            }
        }
        self.user()
    }

    pub async fn login_with_code(&mut self, client: &ApiClient, auth_code: &str) -> ApiResult<()> {
        let user = client.login_with_google(auth_code).await?;
        self.set_user(user);
        Ok(())
    }

    /// Local state is cleared even when the server call fails.
    pub async fn logout(&mut self, client: &ApiClient) -> ApiResult<()> {
        let result = client.logout().await;
        self.clear();
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user() -> User {
        User {
            user_login_id: "ajou01".into(),
            user_name: "김아주".into(),
        }
    }

    #[test]
    fn restore_reads_persisted_user() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path().join("session/user.json"));
        let mut session = Session::restore(store.clone());
        assert!(!session.is_logged_in());

        session.set_user(user());
        let restored = Session::restore(store.clone());
        assert_eq!(restored.user(), Some(&user()));

        session.clear();
        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_store_is_discarded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user.json");
        fs::write(&path, b"{not json").unwrap();
        let session = Session::restore(UserStore::new(&path));
        assert!(!session.is_logged_in());
        assert!(!path.exists());
    }
}
