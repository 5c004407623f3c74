//! Persisted client session.
//!
//! [`SessionStore`] owns the signed-in user and access token. Persistence
//! goes through [`SessionBackend`] implementations injected at construction:
//! a primary client backend (file or memory) and any number of mirrors such
//! as the [`CookieBackend`] the route guard reads.

pub mod backend;
pub mod cookie;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, SessionBackend};
pub use cookie::{CookieBackend, CookieSession};
pub use store::{SessionSnapshot, SessionStore};

use serde::{Deserialize, Serialize};

use crate::model::User;

/// The pair every backend persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub access_token: String,
    pub user: User,
}
