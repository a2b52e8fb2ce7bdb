use medtrial_db::PgPool;

use crate::config::AuthSettings;

/// Shared application state handed to every handler.
///
/// The pool is the single shared connection pool for the whole server;
/// storage structs borrow it per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(pool: PgPool, auth: AuthSettings) -> Self {
        Self { pool, auth }
    }
}
