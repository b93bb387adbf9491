//! # Handlers
//!
//! Thin adapters: extract, call one service operation, serialize. Path
//! segments that are not valid ids answer 404 like unknown ids do.

pub mod posts;
pub mod profile;
pub mod system;
pub mod users;

use domains::{AppError, CommentId, EntryId, PostId, UserId};

use crate::error::ApiError;

macro_rules! path_id {
    ($fn_name:ident, $ty:ty, $what:literal) => {
        pub(crate) fn $fn_name(raw: &str) -> Result<$ty, ApiError> {
            <$ty>::parse(raw).ok_or_else(|| ApiError(AppError::not_found($what, raw)))
        }
    };
}

path_id!(post_id, PostId, "post");
path_id!(comment_id, CommentId, "comment");
path_id!(entry_id, EntryId, "entry");
path_id!(user_id, UserId, "profile");
