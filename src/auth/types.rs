//! Credential holder types
//!
//! A credential holder carries the credentials submitted to the token
//! endpoint together with the bearer token they were last exchanged for.
//! The token and its expiry are stored as one `CachedToken`, so they are
//! always written together, and only the executor's authenticate flow
//! writes them.

use crate::types::StringMap;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// Cached bearer token with expiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires N milliseconds from now
    ///
    /// `None` when the expiry falls outside the representable date range.
    pub fn expires_in_millis(token: String, millis: i64) -> Option<Self> {
        let lifetime = chrono::Duration::try_milliseconds(millis)?;
        let expires_at = Utc::now().checked_add_signed(lifetime)?;
        Some(Self { token, expires_at })
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Expiry as milliseconds since the Unix epoch
    pub fn expires_at_epoch_millis(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }

    /// Rebuild a token from an epoch-millisecond expiry
    pub fn from_epoch_millis(token: String, epoch_millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(epoch_millis)
            .single()
            .map(|expires_at| Self { token, expires_at })
    }
}

/// Token slot shared by both credential kinds
#[derive(Default)]
struct TokenSlot {
    cached: RwLock<Option<CachedToken>>,
    /// Held for the duration of one token exchange on this holder
    exchange: Mutex<()>,
}

impl TokenSlot {
    fn get(&self) -> Option<CachedToken> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: Option<CachedToken>) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn access_token(&self) -> Option<String> {
        self.get().map(|t| t.token)
    }

    fn expires_at_epoch_millis(&self) -> Option<i64> {
        self.get().map(|t| t.expires_at_epoch_millis())
    }

    fn is_valid_token(&self) -> bool {
        self.get()
            .is_some_and(|t| !t.token.is_empty() && !t.is_expired())
    }
}

// ============================================================================
// App Auth
// ============================================================================

/// Application-level credentials (client id and secret)
pub struct AppAuth {
    client_id: String,
    client_secret: String,
    slot: TokenSlot,
}

impl AppAuth {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            slot: TokenSlot::default(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Body submitted to the token endpoint
    pub fn credentials_map(&self) -> StringMap {
        StringMap::from([
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
        ])
    }

    pub fn access_token(&self) -> Option<String> {
        self.slot.access_token()
    }

    pub fn expires_at_epoch_millis(&self) -> Option<i64> {
        self.slot.expires_at_epoch_millis()
    }

    pub fn is_valid_token(&self) -> bool {
        self.slot.is_valid_token()
    }
}

impl fmt::Debug for AppAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppAuth")
            .field("client_id", &self.client_id)
            .field("has_token", &self.slot.get().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// User Auth
// ============================================================================

/// User-level credentials (username and password)
pub struct UserAuth {
    username: String,
    password: String,
    /// Management (admin) users authenticate against the management endpoint
    is_admin_user: bool,
    slot: TokenSlot,
}

impl UserAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_admin_user: false,
            slot: TokenSlot::default(),
        }
    }

    /// Credentials for a management-level admin user
    pub fn admin(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            is_admin_user: true,
            ..Self::new(username, password)
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_admin_user(&self) -> bool {
        self.is_admin_user
    }

    /// Body submitted to the token endpoint
    pub fn credentials_map(&self) -> StringMap {
        StringMap::from([
            ("grant_type".to_string(), "password".to_string()),
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ])
    }

    pub fn access_token(&self) -> Option<String> {
        self.slot.access_token()
    }

    pub fn expires_at_epoch_millis(&self) -> Option<i64> {
        self.slot.expires_at_epoch_millis()
    }

    pub fn is_valid_token(&self) -> bool {
        self.slot.is_valid_token()
    }
}

impl fmt::Debug for UserAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAuth")
            .field("username", &self.username)
            .field("is_admin_user", &self.is_admin_user)
            .field("has_token", &self.slot.get().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Auth
// ============================================================================

/// A shared reference to either kind of credential holder
///
/// Cloning an `Auth` clones the reference, not the holder: a token stored
/// through one clone is visible through every other.
#[derive(Debug, Clone)]
pub enum Auth {
    App(Arc<AppAuth>),
    User(Arc<UserAuth>),
}

impl Auth {
    fn slot(&self) -> &TokenSlot {
        match self {
            Auth::App(app) => &app.slot,
            Auth::User(user) => &user.slot,
        }
    }

    /// Body submitted to the token endpoint
    pub fn credentials_map(&self) -> StringMap {
        match self {
            Auth::App(app) => app.credentials_map(),
            Auth::User(user) => user.credentials_map(),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.slot().access_token()
    }

    pub fn expires_at_epoch_millis(&self) -> Option<i64> {
        self.slot().expires_at_epoch_millis()
    }

    /// Token present and not yet expired
    pub fn is_valid_token(&self) -> bool {
        self.slot().is_valid_token()
    }

    /// Only user credentials can be admin
    pub fn is_admin_user(&self) -> bool {
        matches!(self, Auth::User(user) if user.is_admin_user)
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::App(_) => "app",
            Auth::User(user) if user.is_admin_user => "admin_user",
            Auth::User(_) => "user",
        }
    }

    /// Whether both references point at the same holder
    pub fn ptr_eq(&self, other: &Auth) -> bool {
        match (self, other) {
            (Auth::App(a), Auth::App(b)) => Arc::ptr_eq(a, b),
            (Auth::User(a), Auth::User(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Drop the cached token, returning the holder to its unauthenticated state
    pub fn clear_token(&self) {
        self.slot().set(None);
    }

    pub(crate) fn store_token(&self, token: CachedToken) {
        self.slot().set(Some(token));
    }

    pub(crate) fn exchange_lock(&self) -> &Mutex<()> {
        &self.slot().exchange
    }
}

impl From<AppAuth> for Auth {
    fn from(auth: AppAuth) -> Self {
        Auth::App(Arc::new(auth))
    }
}

impl From<UserAuth> for Auth {
    fn from(auth: UserAuth) -> Self {
        Auth::User(Arc::new(auth))
    }
}

impl From<Arc<AppAuth>> for Auth {
    fn from(auth: Arc<AppAuth>) -> Self {
        Auth::App(auth)
    }
}

impl From<Arc<UserAuth>> for Auth {
    fn from(auth: Arc<UserAuth>) -> Self {
        Auth::User(auth)
    }
}
