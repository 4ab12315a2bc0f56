//! crates/kitchen_king_core/src/context.rs
//!
//! The application context: who is logged in on this device, which language the
//! UI speaks, and the preferences new analyses run with.
//!
//! Built once at startup with [`AppContext::start`] and shared behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::domain::{Language, Preferences, User};
use crate::error::{AuthFailure, CoreError};
use crate::ports::KeyValueStore;

pub const USERS_KEY: &str = "users";
pub const SESSION_KEY: &str = "session_user";
pub const LANGUAGE_KEY: &str = "language";

pub fn onboarding_key(username: &str) -> String {
    format!("onboarding_done:{}", username)
}

/// Lowercases the username and strips all whitespace, the way the login form does.
pub fn normalize_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn validate_credentials(username: &str, pin: &str) -> Result<(), CoreError> {
    let pin_ok = pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit());
    if username.chars().count() < 3 || !pin_ok {
        return Err(CoreError::Auth(AuthFailure::MalformedCredentials));
    }
    Ok(())
}

pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    user: RwLock<Option<User>>,
    language: RwLock<Language>,
    preferences: RwLock<Preferences>,
    // Serializes read-modify-write of the credential map.
    credentials: Mutex<()>,
}

impl AppContext {
    /// Restores the session pointer and language from `store`.
    pub async fn start(store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let user = store
            .get(SESSION_KEY)
            .await?
            .filter(|name| !name.is_empty())
            .map(|username| User { username });

        let language = match store.get(LANGUAGE_KEY).await? {
            Some(code) => Language::from_code(&code).unwrap_or_else(|| {
                warn!(code = %code, "Unknown stored language, using default.");
                Language::default()
            }),
            None => Language::default(),
        };

        info!(
            restored_user = user.as_ref().map(|u| u.username.as_str()),
            language = language.code(),
            "Application context started."
        );

        Ok(Self {
            store,
            user: RwLock::new(user),
            language: RwLock::new(language),
            preferences: RwLock::new(Preferences::default()),
            credentials: Mutex::new(()),
        })
    }

    //=====================================================================================
    // Session
    //=====================================================================================

    /// Creates the account and logs it in. Rejects a username that already exists.
    pub async fn register(&self, username: &str, pin: &str) -> Result<User, CoreError> {
        let username = normalize_username(username);
        validate_credentials(&username, pin)?;

        let _guard = self.credentials.lock().await;
        let mut users = self.read_credentials().await?;
        if users.contains_key(&username) {
            warn!(username = %username, "Registration refused, username taken.");
            return Err(CoreError::Auth(AuthFailure::UsernameTaken));
        }
        users.insert(username.clone(), pin.to_string());
        let encoded = serde_json::to_string(&users)
            .map_err(|e| CoreError::Storage(format!("failed to encode credentials: {}", e)))?;
        self.store.set(USERS_KEY, &encoded).await?;

        info!(username = %username, "User registered.");
        self.open_session(username).await
    }

    pub async fn login(&self, username: &str, pin: &str) -> Result<User, CoreError> {
        let username = normalize_username(username);
        validate_credentials(&username, pin)?;

        let users = self.read_credentials().await?;
        match users.get(&username) {
            Some(stored) if stored == pin => self.open_session(username).await,
            _ => {
                warn!(username = %username, "Login refused.");
                Err(CoreError::Auth(AuthFailure::InvalidCredentials))
            }
        }
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        self.store.remove(SESSION_KEY).await?;
        let previous = self.user.write().await.take();
        *self.preferences.write().await = Preferences::default();
        if let Some(user) = previous {
            info!(username = %user.username, "User logged out.");
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn require_user(&self) -> Result<User, CoreError> {
        self.current_user()
            .await
            .ok_or(CoreError::Auth(AuthFailure::NotLoggedIn))
    }

    async fn open_session(&self, username: String) -> Result<User, CoreError> {
        self.store.set(SESSION_KEY, &username).await?;
        let user = User { username };
        *self.user.write().await = Some(user.clone());
        info!(username = %user.username, "Session opened.");
        Ok(user)
    }

    async fn read_credentials(&self) -> Result<HashMap<String, String>, CoreError> {
        let Some(raw) = self.store.get(USERS_KEY).await? else {
            return Ok(HashMap::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            CoreError::Storage(format!("credential map is not valid JSON: {}", e))
        })
    }

    //=====================================================================================
    // Settings
    //=====================================================================================

    pub async fn language(&self) -> Language {
        *self.language.read().await
    }

    pub async fn set_language(&self, language: Language) -> Result<(), CoreError> {
        self.store.set(LANGUAGE_KEY, language.code()).await?;
        *self.language.write().await = language;
        info!(language = language.code(), "Language changed.");
        Ok(())
    }

    pub async fn preferences(&self) -> Preferences {
        *self.preferences.read().await
    }

    pub async fn set_preferences(&self, preferences: Preferences) {
        *self.preferences.write().await = preferences;
    }

    //=====================================================================================
    // Onboarding
    //=====================================================================================

    /// Whether the current user still has to see the onboarding tutorial.
    pub async fn needs_onboarding(&self) -> Result<bool, CoreError> {
        let user = self.require_user().await?;
        let done = self.store.get(&onboarding_key(&user.username)).await?;
        Ok(done.as_deref() != Some("true"))
    }

    pub async fn complete_onboarding(&self) -> Result<(), CoreError> {
        let user = self.require_user().await?;
        self.store
            .set(&onboarding_key(&user.username), "true")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Diet;
    use crate::fakes::InMemoryStore;

    async fn context() -> (Arc<InMemoryStore>, AppContext) {
        let store = Arc::new(InMemoryStore::new());
        let ctx = AppContext::start(store.clone()).await.unwrap();
        (store, ctx)
    }

    #[test]
    fn usernames_are_lowercased_and_stripped() {
        assert_eq!(normalize_username(" Ali Ce\t"), "alice");
    }

    #[tokio::test]
    async fn register_logs_in_and_rejects_duplicates() {
        let (store, ctx) = context().await;
        let user = ctx.register("Alice", "1234").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(ctx.current_user().await, Some(user));
        assert_eq!(
            store.get(SESSION_KEY).await.unwrap().as_deref(),
            Some("alice")
        );

        let err = ctx.register("alice", "9999").await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthFailure::UsernameTaken)));
    }

    #[tokio::test]
    async fn login_checks_the_pin() {
        let (_, ctx) = context().await;
        ctx.register("alice", "1234").await.unwrap();
        ctx.logout().await.unwrap();

        let err = ctx.login("alice", "4321").await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthFailure::InvalidCredentials)));
        let err = ctx.login("carol", "1234").await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthFailure::InvalidCredentials)));

        assert!(ctx.login("alice", "1234").await.is_ok());
    }

    #[tokio::test]
    async fn malformed_credentials_are_refused_early() {
        let (store, ctx) = context().await;
        for (name, pin) in [("al", "1234"), ("alice", "123"), ("alice", "12a4")] {
            let err = ctx.register(name, pin).await.unwrap_err();
            assert!(matches!(err, CoreError::Auth(AuthFailure::MalformedCredentials)));
        }
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_session_and_preferences() {
        let (store, ctx) = context().await;
        ctx.register("alice", "1234").await.unwrap();
        ctx.set_preferences(Preferences {
            diet: Diet::NonVeg,
            time_available: 60,
            servings: 4,
        })
        .await;

        ctx.logout().await.unwrap();
        assert!(ctx.current_user().await.is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
        assert_eq!(ctx.preferences().await, Preferences::default());
        assert!(matches!(
            ctx.require_user().await,
            Err(CoreError::Auth(AuthFailure::NotLoggedIn))
        ));
    }

    #[tokio::test]
    async fn onboarding_is_tracked_per_user() {
        let (_, ctx) = context().await;
        ctx.register("alice", "1234").await.unwrap();
        assert!(ctx.needs_onboarding().await.unwrap());
        ctx.complete_onboarding().await.unwrap();
        assert!(!ctx.needs_onboarding().await.unwrap());

        ctx.register("bob", "5678").await.unwrap();
        assert!(ctx.needs_onboarding().await.unwrap());
    }

    #[tokio::test]
    async fn unknown_stored_language_falls_back_to_english() {
        let store = Arc::new(InMemoryStore::new());
        store.set(LANGUAGE_KEY, "fr").await.unwrap();
        let ctx = AppContext::start(store).await.unwrap();
        assert_eq!(ctx.language().await, Language::En);
    }
}
