mod futures;

pub use futures::*;
