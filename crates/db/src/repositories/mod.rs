//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or any `PgExecutor` where the call may run inside a
//! transaction) as the first argument.

pub mod category_repo;
pub mod permission_repo;
pub mod post_repo;
pub mod thread_repo;
pub mod user_repo;
pub mod whitelist_repo;

pub use category_repo::CategoryRepo;
pub use permission_repo::PermissionRepo;
pub use post_repo::PostRepo;
pub use thread_repo::ThreadRepo;
pub use user_repo::UserRepo;
pub use whitelist_repo::WhitelistRepo;
