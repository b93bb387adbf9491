//! # Ownership & Mutation Policy
//!
//! Rules shared by the profile and post aggregates for touching their
//! embedded lists. Lists are ordered most-recent-first: inserts go to the
//! head, removals locate a position by key and splice exactly that slot.

use crate::error::{AppError, Result};
use crate::models::UserId;

/// An element addressable by a key inside an embedded list.
pub trait Keyed {
    type Key: PartialEq;
    fn key(&self) -> &Self::Key;
}

/// An entity with a recorded owner.
pub trait Owned {
    fn owner(&self) -> UserId;
}

/// Fails with `Forbidden` unless `caller` owns `target`.
pub fn ensure_owner<T: Owned + ?Sized>(target: &T, caller: UserId, what: &str) -> Result<()> {
    if target.owner() == caller {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("user is not authorized to modify this {what}")))
    }
}

pub fn position_of<T: Keyed>(items: &[T], key: &T::Key) -> Option<usize> {
    items.iter().position(|item| item.key() == key)
}

pub fn push_front<T>(items: &mut Vec<T>, item: T) {
    items.insert(0, item);
}

/// Removes the first element keyed by `key`. A missing key is a no-op.
pub fn remove_by_key<T: Keyed>(items: &mut Vec<T>, key: &T::Key) -> Option<T> {
    position_of(items, key).map(|index| items.remove(index))
}

/// Head-inserts `item` unless an element with the same key is present.
pub fn insert_unique<T: Keyed>(items: &mut Vec<T>, item: T, conflict: &str) -> Result<()> {
    if position_of(items, item.key()).is_some() {
        return Err(AppError::Conflict(conflict.to_string()));
    }
    push_front(items, item);
    Ok(())
}
