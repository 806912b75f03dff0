//! Follow and unfollow state transitions.
//!
//! A (follower, followed) pair is either absent or following. Follow moves it
//! to following and is idempotent; unfollow moves it back and fails when there
//! is nothing to remove.

use crate::database::{FollowInsert, Store, StoreError, User};

#[derive(thiserror::Error, Debug)]
pub enum FollowError {
	#[error("user does not exist: {0}")]
	InvalidTarget(String),
	#[error("a user cannot follow themselves")]
	SelfFollowRejected,
	#[error("not following {0}")]
	NotFollowing(String),
	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl FollowError {
	/// Machine readable code sent to clients.
	pub fn code(&self) -> &'static str {
		match self {
			FollowError::InvalidTarget(_) => "invalid_target",
			FollowError::SelfFollowRejected => "self_follow",
			FollowError::NotFollowing(_) => "not_following",
			FollowError::Store(_) => "internal",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
	/// The relation was created by this call.
	Followed,
	/// The relation already existed.
	AlreadyFollowing,
}

async fn resolve(store: &dyn Store, username: &str) -> Result<User, FollowError> {
	store
		.user_by_username(username)
		.await?
		.ok_or_else(|| FollowError::InvalidTarget(username.to_string()))
}

pub async fn follow(store: &dyn Store, actor: &User, target: &str) -> Result<FollowOutcome, FollowError> {
	let target = resolve(store, target).await?;

	if target.id == actor.id {
		return Err(FollowError::SelfFollowRejected);
	}

	match store.insert_follow(actor.id, target.id).await {
		Ok(FollowInsert::Created) => {
			tracing::debug!(follower = %actor.username, followed = %target.username, "follow created");
			Ok(FollowOutcome::Followed)
		}
		Ok(FollowInsert::AlreadyExists) => Ok(FollowOutcome::AlreadyFollowing),
		Err(StoreError::Constraint("follows_no_self_follow")) => Err(FollowError::SelfFollowRejected),
		Err(err) => Err(err.into()),
	}
}

pub async fn unfollow(store: &dyn Store, actor: &User, target: &str) -> Result<(), FollowError> {
	let target = resolve(store, target).await?;

	if !store.delete_follow(actor.id, target.id).await? {
		return Err(FollowError::NotFollowing(target.username));
	}

	tracing::debug!(follower = %actor.username, followed = %target.username, "follow removed");

	Ok(())
}
