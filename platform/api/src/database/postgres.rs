use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool};
use sqlx::ConnectOptions;

use super::store::{Result, Store, StoreError};
use super::{FollowInsert, NewUser, Session, Ulid, User};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, created_at";

pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	pub async fn connect(uri: &str) -> Result<Self> {
		let pool = PgPool::connect_with(PgConnectOptions::from_str(uri)?.disable_statement_logging()).await?;

		Ok(Self { pool })
	}

	#[cfg(test)]
	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	pub async fn migrate(&self) -> Result<()> {
		sqlx::migrate!("./migrations").run(&self.pool).await?;
		Ok(())
	}
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(err) if err.is_unique_violation())
}

fn constraint(err: &sqlx::Error) -> Option<&str> {
	match err {
		sqlx::Error::Database(err) => err.constraint(),
		_ => None,
	}
}

#[async_trait::async_trait]
impl Store for PgStore {
	async fn count_users(&self) -> Result<i64> {
		Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?)
	}

	async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
		Ok(sqlx::query_as(&format!(
			"SELECT {USER_COLUMNS} FROM users ORDER BY username COLLATE \"C\" ASC OFFSET $1 LIMIT $2"
		))
		.bind(offset)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
		Ok(sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
			.bind(username)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn user_by_id(&self, id: Ulid) -> Result<Option<User>> {
		Ok(sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn create_user(&self, user: NewUser) -> Result<User> {
		let user = user.into_user()?;

		sqlx::query_as(&format!(
			"INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
		))
		.bind(user.id)
		.bind(&user.username)
		.bind(&user.email)
		.bind(&user.first_name)
		.bind(&user.last_name)
		.bind(&user.password_hash)
		.bind(user.created_at)
		.fetch_one(&self.pool)
		.await
		.map_err(|err| match is_unique_violation(&err) {
			true => StoreError::DuplicateUsername(user.username.clone()),
			false => err.into(),
		})
	}

	async fn insert_follow(&self, follower_id: Ulid, followed_id: Ulid) -> Result<FollowInsert> {
		let result = sqlx::query(
			"INSERT INTO follows (follower_id, followed_id, created_at) VALUES ($1, $2, NOW()) ON CONFLICT DO NOTHING",
		)
		.bind(follower_id)
		.bind(followed_id)
		.execute(&self.pool)
		.await
		.map_err(|err| match constraint(&err) {
			Some("follows_no_self_follow") => StoreError::Constraint("follows_no_self_follow"),
			Some("follows_follower_id_fkey") => StoreError::UnknownUser(follower_id),
			Some("follows_followed_id_fkey") => StoreError::UnknownUser(followed_id),
			_ => err.into(),
		})?;

		Ok(match result.rows_affected() {
			0 => FollowInsert::AlreadyExists,
			_ => FollowInsert::Created,
		})
	}

	async fn delete_follow(&self, follower_id: Ulid, followed_id: Ulid) -> Result<bool> {
		let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
			.bind(follower_id)
			.bind(followed_id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	#[cfg(test)]
	async fn is_following(&self, follower_id: Ulid, followed_id: Ulid) -> Result<bool> {
		Ok(
			sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)")
				.bind(follower_id)
				.bind(followed_id)
				.fetch_one(&self.pool)
				.await?,
		)
	}

	async fn count_follows(&self) -> Result<i64> {
		Ok(sqlx::query_scalar("SELECT COUNT(*) FROM follows").fetch_one(&self.pool).await?)
	}

	async fn create_session(&self, user_id: Ulid, expires_at: DateTime<Utc>) -> Result<Session> {
		sqlx::query_as(
			"INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES ($1, $2, $3, NOW()) RETURNING id, user_id, expires_at, invalidated_at",
		)
		.bind(Ulid::new())
		.bind(user_id)
		.bind(expires_at)
		.fetch_one(&self.pool)
		.await
		.map_err(|err| match constraint(&err) {
			Some("sessions_user_id_fkey") => StoreError::UnknownUser(user_id),
			_ => err.into(),
		})
	}

	async fn session_by_id(&self, id: Ulid) -> Result<Option<Session>> {
		Ok(
			sqlx::query_as("SELECT id, user_id, expires_at, invalidated_at FROM sessions WHERE id = $1")
				.bind(id)
				.fetch_optional(&self.pool)
				.await?,
		)
	}

	async fn invalidate_session(&self, id: Ulid) -> Result<bool> {
		let result = sqlx::query("UPDATE sessions SET invalidated_at = NOW() WHERE id = $1 AND invalidated_at IS NULL")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}
