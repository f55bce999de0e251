//! Per-user forum permission rows.

use emerald_core::permissions::ForumPermissions;
use emerald_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `user_permissions` table.
#[derive(Debug, Clone, FromRow)]
pub struct ForumPermissionRow {
    pub user_id: DbId,
    pub can_create_thread: bool,
    pub can_create_post: bool,
    pub can_edit_own: bool,
    pub can_delete_own: bool,
    pub can_pin_thread: bool,
    pub can_lock_thread: bool,
    pub can_moderate: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ForumPermissionRow> for ForumPermissions {
    fn from(row: ForumPermissionRow) -> Self {
        Self {
            can_create_thread: row.can_create_thread,
            can_create_post: row.can_create_post,
            can_edit_own: row.can_edit_own,
            can_delete_own: row.can_delete_own,
            can_pin_thread: row.can_pin_thread,
            can_lock_thread: row.can_lock_thread,
            can_moderate: row.can_moderate,
        }
    }
}
