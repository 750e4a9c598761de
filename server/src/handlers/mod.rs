//! Request handlers for record store operations.

mod records;
mod shares;

pub use records::*;
pub use shares::*;
