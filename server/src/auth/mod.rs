//! Request authentication.

mod middleware;

pub use middleware::{AuthUser, ANONYMOUS_USER};
