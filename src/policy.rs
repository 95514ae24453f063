//! Authorization policy.
//!
//! Pure decisions over an explicit actor. Handlers call these before touching the
//! repository and turn a `Denial` into a redirect with a message.

use thiserror::Error;

use crate::auth::AuthUser;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    #[error("actor neither owns the resource nor is an admin")]
    NotOwner,
    #[error("actor is not an admin")]
    NotAdmin,
    #[error("actor targeted their own account")]
    SelfTarget,
    #[error("category still has recipes")]
    CategoryInUse,
}

/// can_modify
///
/// True iff the actor owns the resource or is an admin. Governs recipe edit and delete.
pub fn can_modify(actor: &AuthUser, resource_owner_id: i64) -> bool {
    actor.id == resource_owner_id || actor.is_admin
}

pub fn require_owner_or_admin(actor: &AuthUser, resource_owner_id: i64) -> Result<(), Denial> {
    if can_modify(actor, resource_owner_id) {
        Ok(())
    } else {
        Err(Denial::NotOwner)
    }
}

/// require_admin
///
/// Gate for every admin-area operation and for comment deletion. Ownership is irrelevant.
pub fn require_admin(actor: &AuthUser) -> Result<(), Denial> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(Denial::NotAdmin)
    }
}

/// require_not_self
///
/// Admins may not toggle or delete their own account.
pub fn require_not_self(actor: &AuthUser, target_user_id: i64) -> Result<(), Denial> {
    if actor.id == target_user_id {
        Err(Denial::SelfTarget)
    } else {
        Ok(())
    }
}

/// A category may only be deleted once no recipe references it.
pub fn category_deletable(recipe_count: i64) -> Result<(), Denial> {
    if recipe_count > 0 {
        Err(Denial::CategoryInUse)
    } else {
        Ok(())
    }
}
