//! User directory: the external registry of account identities.
//!
//! Account lifecycle (sign-up, authentication, sessions) is the directory
//! service's concern; this core only looks accounts up by email and links the
//! identity it gets back.

pub mod account;

pub use account::{UserAccount, UserDirectory};
