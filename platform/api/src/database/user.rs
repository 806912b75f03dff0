use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};

use super::Ulid;

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct User {
	/// The unique identifier for the user.
	pub id: Ulid,
	/// The username of the user, unique.
	pub username: String,
	/// The email of the user, empty when unset.
	pub email: String,
	/// Empty when unset.
	pub first_name: String,
	/// Empty when unset.
	pub last_name: String,
	/// The hashed password of the user (argon2). Users without one cannot log in.
	pub password_hash: Option<String>,
	/// The time the user was created.
	pub created_at: DateTime<Utc>,
}

impl User {
	/// Uses argon2 to verify the password hash against the provided password.
	pub fn verify_password(&self, password: &str) -> bool {
		let Some(password_hash) = &self.password_hash else {
			return false;
		};

		let hash = match PasswordHash::new(password_hash) {
			Ok(hash) => hash,
			Err(err) => {
				tracing::error!(user_id = %self.id, "failed to parse password hash: {}", err);
				return false;
			}
		};

		Argon2::default().verify_password(password.as_bytes(), &hash).is_ok()
	}
}

/// Generates a new password hash using argon2.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
	let salt = SaltString::generate(&mut rand::rngs::OsRng);

	Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// An account to be inserted. Accounts are provisioned outside the API.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct NewUser {
	pub username: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	/// Plain text, hashed before it is stored.
	pub password: Option<String>,
}

impl NewUser {
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			..Default::default()
		}
	}

	pub fn with_password(mut self, password: impl Into<String>) -> Self {
		self.password = Some(password.into());
		self
	}

	/// Builds the row to store, hashing the password if one was given.
	pub fn into_user(self) -> Result<User, argon2::password_hash::Error> {
		let password_hash = self.password.as_deref().map(hash_password).transpose()?;

		Ok(User {
			id: Ulid::new(),
			username: self.username,
			email: self.email,
			first_name: self.first_name,
			last_name: self.last_name,
			password_hash,
			created_at: Utc::now(),
		})
	}
}
