//! SQLite backend for the account-creation statistics report.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteStore`] implements every
//! collaborator trait in [`acc_core::collab`] except the authorizer, which is
//! built from [`acc_core::permission::RoleAuthorizer`] over the store's role
//! directory.

mod encode;
mod identification;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use identification::CachedIdentification;
pub use store::SqliteStore;
