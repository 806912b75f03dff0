use chrono::{DateTime, Utc};

use super::{FollowInsert, NewUser, Session, Ulid, User};

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
	#[error("database error: {0}")]
	Sqlx(#[from] sqlx::Error),
	#[error("failed to run migrations: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("failed to hash password: {0}")]
	PasswordHash(#[from] argon2::password_hash::Error),
	#[error("username already taken: {0}")]
	DuplicateUsername(String),
	#[error("unknown user: {0}")]
	UnknownUser(Ulid),
	#[error("constraint violated: {0}")]
	Constraint(&'static str),
}

/// Persistence for accounts, the follow relation and login sessions.
///
/// Every method is a single atomic operation against the backend. Username
/// ordering is byte-wise so both backends list users identically.
#[async_trait::async_trait]
pub trait Store: Send + Sync + 'static {
	async fn count_users(&self) -> Result<i64>;

	/// Accounts ordered by username ascending.
	async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>>;

	async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

	async fn user_by_id(&self, id: Ulid) -> Result<Option<User>>;

	async fn create_user(&self, user: NewUser) -> Result<User>;

	/// Inserts the pair unless it already exists.
	async fn insert_follow(&self, follower_id: Ulid, followed_id: Ulid) -> Result<FollowInsert>;

	/// Returns `false` when there was nothing to delete.
	async fn delete_follow(&self, follower_id: Ulid, followed_id: Ulid) -> Result<bool>;

	#[cfg(test)]
	async fn is_following(&self, follower_id: Ulid, followed_id: Ulid) -> Result<bool>;

	/// Total number of relations, logged on startup.
	async fn count_follows(&self) -> Result<i64>;

	async fn create_session(&self, user_id: Ulid, expires_at: DateTime<Utc>) -> Result<Session>;

	async fn session_by_id(&self, id: Ulid) -> Result<Option<Session>>;

	/// Marks the session as invalidated. Returns `false` if it did not exist or
	/// was already invalidated.
	async fn invalidate_session(&self, id: Ulid) -> Result<bool>;
}
