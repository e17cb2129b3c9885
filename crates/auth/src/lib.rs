//! `storeadmin-auth`: user accounts and roles.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod password;
pub mod roles;
pub mod user;

pub use password::{PasswordError, hash_password, verify_password};
pub use roles::{NewRole, Role, default_roles};
pub use user::{NewUser, User, UserError, UserFilter, UserPatch};
