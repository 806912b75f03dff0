/// What inserting a (follower, followed) pair did to the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowInsert {
	Created,
	/// The pair already existed, nothing was written.
	AlreadyExists,
}
