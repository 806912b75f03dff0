use std::fmt::{Display, Formatter};

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
	Parent,
	Deadline,
	Cancel,
}

impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Parent => write!(f, "Parent"),
			Self::Deadline => write!(f, "Deadline"),
			Self::Cancel => write!(f, "Cancel"),
		}
	}
}

/// A cancellation scope shared by every task that should stop together.
///
/// Every clone keeps the scope alive; [`Handler::cancel`] signals
/// cancellation and then waits until all clones have been dropped.
#[derive(Clone)]
pub struct Context {
	token: CancellationToken,
	deadline: Option<Instant>,
	parent: Option<Box<Context>>,
	_alive: mpsc::Sender<()>,
}

pub struct Handler {
	token: CancellationToken,
	alive: mpsc::Receiver<()>,
}

impl Handler {
	/// Resolves once every context tied to this handler has been dropped.
	pub async fn done(&mut self) {
		let _ = self.alive.recv().await;
	}

	pub async fn cancel(mut self) {
		self.token.cancel();
		self.done().await;
	}
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		Self::build(CancellationToken::new(), None, None)
	}

	#[must_use]
	pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
		Self::build(CancellationToken::new(), Some(deadline), None)
	}

	#[must_use]
	pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
		Self::with_deadline(Instant::now() + timeout)
	}

	/// A child scope that is also cancelled when `parent` is, and keeps `parent` alive.
	#[must_use]
	pub fn with_parent(parent: Context, deadline: Option<Instant>) -> (Self, Handler) {
		let token = parent.token.child_token();
		Self::build(token, deadline, Some(parent))
	}

	fn build(token: CancellationToken, deadline: Option<Instant>, parent: Option<Context>) -> (Self, Handler) {
		let (sender, alive) = mpsc::channel(1);

		(
			Self {
				token: token.clone(),
				deadline,
				parent: parent.map(Box::new),
				_alive: sender,
			},
			Handler { token, alive },
		)
	}

	pub fn is_done(&self) -> bool {
		self.token.is_cancelled() || self.deadline.is_some_and(|d| d <= Instant::now())
	}

	pub async fn done(&self) -> CancelReason {
		let cancelled = async {
			self.token.cancelled().await;
			match &self.parent {
				Some(parent) if parent.token.is_cancelled() => CancelReason::Parent,
				_ => CancelReason::Cancel,
			}
		};

		match self.deadline {
			Some(deadline) => {
				tokio::select! {
					reason = cancelled => reason,
					_ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
				}
			}
			None => cancelled.await,
		}
	}
}
