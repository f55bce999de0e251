//! Forum capability set and the authorization rules applied before every
//! forum mutation.
//!
//! The rules are pure functions over the acting user, the resource owner and
//! the actor's [`ForumPermissions`]; the database and HTTP layers only supply
//! the inputs and translate the resulting [`CoreError`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Effective forum capabilities of a single user.
///
/// Serialized with the snake_case field names the web client expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPermissions {
    pub can_create_thread: bool,
    pub can_create_post: bool,
    pub can_edit_own: bool,
    pub can_delete_own: bool,
    pub can_pin_thread: bool,
    pub can_lock_thread: bool,
    pub can_moderate: bool,
}

impl Default for ForumPermissions {
    /// Baseline for users without an explicit row: may participate and edit
    /// their own content, may not moderate.
    fn default() -> Self {
        Self {
            can_create_thread: true,
            can_create_post: true,
            can_edit_own: true,
            can_delete_own: false,
            can_pin_thread: false,
            can_lock_thread: false,
            can_moderate: false,
        }
    }
}

/// Which aspects of a thread a PATCH touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadChange {
    /// Title or content.
    pub content: bool,
    /// `is_pinned` or `is_locked`.
    pub flags: bool,
}

/// Ownership-or-moderator rule shared by thread and post edits.
pub fn can_edit(actor: DbId, owner: DbId, permissions: &ForumPermissions) -> bool {
    actor == owner || permissions.can_moderate
}

pub fn authorize_thread_create(permissions: &ForumPermissions) -> Result<(), CoreError> {
    if !permissions.can_create_thread {
        return Err(CoreError::Forbidden(
            "Not allowed to create threads".into(),
        ));
    }
    Ok(())
}

/// Posting requires `can_create_post`; a locked thread additionally requires
/// `can_moderate`.
pub fn authorize_post_create(
    permissions: &ForumPermissions,
    thread_locked: bool,
) -> Result<(), CoreError> {
    if !permissions.can_create_post {
        return Err(CoreError::Forbidden("Not allowed to create posts".into()));
    }
    if thread_locked && !permissions.can_moderate {
        return Err(CoreError::Forbidden("Thread is locked".into()));
    }
    Ok(())
}

/// Authorize a thread PATCH.
///
/// Pin/lock changes require `can_moderate` even for the thread owner.
pub fn authorize_thread_update(
    actor: DbId,
    owner: DbId,
    permissions: &ForumPermissions,
    change: ThreadChange,
) -> Result<(), CoreError> {
    if !can_edit(actor, owner, permissions) {
        return Err(CoreError::Forbidden(
            "Not authorized to update this thread".into(),
        ));
    }
    if change.flags && !permissions.can_moderate {
        return Err(CoreError::Forbidden(
            "Moderator permission required to pin or lock threads".into(),
        ));
    }
    Ok(())
}

pub fn authorize_post_update(
    actor: DbId,
    owner: DbId,
    permissions: &ForumPermissions,
) -> Result<(), CoreError> {
    if !can_edit(actor, owner, permissions) {
        return Err(CoreError::Forbidden(
            "Not authorized to update this post".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const OWNER: DbId = 1;
    const OTHER: DbId = 2;

    fn moderator() -> ForumPermissions {
        ForumPermissions {
            can_moderate: true,
            ..ForumPermissions::default()
        }
    }

    #[test]
    fn default_allows_participation_but_not_moderation() {
        let p = ForumPermissions::default();
        assert!(p.can_create_thread && p.can_create_post && p.can_edit_own);
        assert!(!p.can_delete_own && !p.can_pin_thread && !p.can_lock_thread);
        assert!(!p.can_moderate);
    }

    #[test]
    fn owner_can_edit_own_thread() {
        let change = ThreadChange { content: true, flags: false };
        assert!(authorize_thread_update(OWNER, OWNER, &ForumPermissions::default(), change).is_ok());
    }

    #[test]
    fn non_owner_without_moderate_is_forbidden() {
        let change = ThreadChange { content: true, flags: false };
        let result = authorize_thread_update(OTHER, OWNER, &ForumPermissions::default(), change);
        assert_matches!(result, Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn moderator_can_edit_others_thread() {
        let change = ThreadChange { content: true, flags: false };
        assert!(authorize_thread_update(OTHER, OWNER, &moderator(), change).is_ok());
    }

    #[test]
    fn owner_cannot_pin_without_moderate() {
        let change = ThreadChange { content: false, flags: true };
        let result = authorize_thread_update(OWNER, OWNER, &ForumPermissions::default(), change);
        assert_matches!(result, Err(CoreError::Forbidden(msg)) if msg.contains("pin or lock"));
    }

    #[test]
    fn moderator_can_pin_any_thread() {
        let change = ThreadChange { content: false, flags: true };
        assert!(authorize_thread_update(OTHER, OWNER, &moderator(), change).is_ok());
    }

    #[test]
    fn post_edit_follows_same_rule() {
        let base = ForumPermissions::default();
        assert!(authorize_post_update(OWNER, OWNER, &base).is_ok());
        assert_matches!(
            authorize_post_update(OTHER, OWNER, &base),
            Err(CoreError::Forbidden(_))
        );
        assert!(authorize_post_update(OTHER, OWNER, &moderator()).is_ok());
    }

    #[test]
    fn thread_create_requires_capability() {
        let denied = ForumPermissions {
            can_create_thread: false,
            ..ForumPermissions::default()
        };
        assert!(authorize_thread_create(&ForumPermissions::default()).is_ok());
        assert_matches!(authorize_thread_create(&denied), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn locked_thread_rejects_non_moderator_posts() {
        let base = ForumPermissions::default();
        assert!(authorize_post_create(&base, false).is_ok());
        assert_matches!(
            authorize_post_create(&base, true),
            Err(CoreError::Forbidden(msg)) if msg.contains("locked")
        );
        assert!(authorize_post_create(&moderator(), true).is_ok());
    }

    #[test]
    fn post_create_requires_capability() {
        let denied = ForumPermissions {
            can_create_post: false,
            ..moderator()
        };
        assert_matches!(authorize_post_create(&denied, false), Err(CoreError::Forbidden(_)));
    }
}
