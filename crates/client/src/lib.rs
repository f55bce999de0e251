//! Client tier of the Emerald community site.
//!
//! Local session bookkeeping ([`session`]), the durable key/value store it
//! persists to ([`storage`]), a typed client for the HTTP API ([`api`]) and
//! the sign-in flow that ties them together ([`auth`]).

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod user_agent;

pub use api::ApiClient;
pub use auth::{AuthClient, SessionStatus};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionManager};
pub use storage::LocalStorage;
