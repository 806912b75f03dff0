#[derive(thiserror::Error, Debug)]
pub enum RouterError<E> {
	#[error("unhandled error: {0:?}")]
	Unhandled(E),
	#[error("route not found")]
	NotFound,
}
