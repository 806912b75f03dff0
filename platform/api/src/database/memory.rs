use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{Result, Store, StoreError};
use super::{FollowInsert, NewUser, Session, Ulid, User};

#[derive(Default)]
struct Inner {
	/// Keyed by username, so iteration is already in byte-wise username order.
	users: BTreeMap<String, User>,
	follows: HashSet<(Ulid, Ulid)>,
	sessions: HashMap<Ulid, Session>,
}

impl Inner {
	fn user_exists(&self, id: Ulid) -> bool {
		self.users.values().any(|u| u.id == id)
	}
}

/// A process local store. Every operation takes the lock once, so check and
/// write happen atomically.
#[derive(Default)]
pub struct MemoryStore {
	inner: RwLock<Inner>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait::async_trait]
impl Store for MemoryStore {
	async fn count_users(&self) -> Result<i64> {
		Ok(self.inner.read().await.users.len() as i64)
	}

	async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
		let inner = self.inner.read().await;

		Ok(inner
			.users
			.values()
			.skip(offset.max(0) as usize)
			.take(limit.max(0) as usize)
			.cloned()
			.collect())
	}

	async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
		Ok(self.inner.read().await.users.get(username).cloned())
	}

	async fn user_by_id(&self, id: Ulid) -> Result<Option<User>> {
		Ok(self.inner.read().await.users.values().find(|u| u.id == id).cloned())
	}

	async fn create_user(&self, user: NewUser) -> Result<User> {
		let user = user.into_user()?;

		let mut inner = self.inner.write().await;
		if inner.users.contains_key(&user.username) {
			return Err(StoreError::DuplicateUsername(user.username));
		}

		inner.users.insert(user.username.clone(), user.clone());

		Ok(user)
	}

	async fn insert_follow(&self, follower_id: Ulid, followed_id: Ulid) -> Result<FollowInsert> {
		if follower_id == followed_id {
			return Err(StoreError::Constraint("follows_no_self_follow"));
		}

		let mut inner = self.inner.write().await;

		for id in [follower_id, followed_id] {
			if !inner.user_exists(id) {
				return Err(StoreError::UnknownUser(id));
			}
		}

		Ok(match inner.follows.insert((follower_id, followed_id)) {
			true => FollowInsert::Created,
			false => FollowInsert::AlreadyExists,
		})
	}

	async fn delete_follow(&self, follower_id: Ulid, followed_id: Ulid) -> Result<bool> {
		Ok(self.inner.write().await.follows.remove(&(follower_id, followed_id)))
	}

	#[cfg(test)]
	async fn is_following(&self, follower_id: Ulid, followed_id: Ulid) -> Result<bool> {
		Ok(self.inner.read().await.follows.contains(&(follower_id, followed_id)))
	}

	async fn count_follows(&self) -> Result<i64> {
		Ok(self.inner.read().await.follows.len() as i64)
	}

	async fn create_session(&self, user_id: Ulid, expires_at: DateTime<Utc>) -> Result<Session> {
		let mut inner = self.inner.write().await;
		if !inner.user_exists(user_id) {
			return Err(StoreError::UnknownUser(user_id));
		}

		let session = Session {
			id: Ulid::new(),
			user_id,
			expires_at,
			invalidated_at: None,
		};

		inner.sessions.insert(session.id, session.clone());

		Ok(session)
	}

	async fn session_by_id(&self, id: Ulid) -> Result<Option<Session>> {
		Ok(self.inner.read().await.sessions.get(&id).cloned())
	}

	async fn invalidate_session(&self, id: Ulid) -> Result<bool> {
		let mut inner = self.inner.write().await;

		match inner.sessions.get_mut(&id) {
			Some(session) if session.invalidated_at.is_none() => {
				session.invalidated_at = Some(Utc::now());
				Ok(true)
			}
			_ => Ok(false),
		}
	}
}
