pub mod auth;
pub mod response_headers;
