//! What the executor needs to know about the client it serves

use crate::auth::Auth;

/// Token endpoint locations and the auth attached to the executor's own calls
pub trait TokenEndpoints: Send + Sync {
    /// Application-scoped base URL (`<base>/<org>/<app>`)
    fn client_app_url(&self) -> String;

    /// Management-scoped base URL (`<base>/management`)
    fn management_url(&self) -> String;

    /// Credentials currently authorizing the client's own calls, if any
    fn auth_for_requests(&self) -> Option<Auth>;
}
