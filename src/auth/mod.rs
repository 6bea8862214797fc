//! Authentication module
//!
//! Credential holders for the two kinds of Usergrid credentials:
//! application (client id/secret) and user (username/password, optionally
//! a management admin). Each holder caches the bearer token it was last
//! exchanged for; the exchange itself lives in `RequestExecutor`.

mod types;

pub use types::{AppAuth, Auth, CachedToken, UserAuth};
