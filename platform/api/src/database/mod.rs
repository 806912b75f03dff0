mod follow;
mod memory;
mod postgres;
mod session;
mod store;
mod ulid;
mod user;

pub use follow::*;
pub use memory::*;
pub use postgres::*;
pub use session::*;
pub use store::*;
pub use ulid::*;
pub use user::*;
