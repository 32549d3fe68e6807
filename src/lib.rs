// Office API - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod db;
pub mod entities;
pub mod store;
pub mod permissions;
pub mod serializers;
pub mod config;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod observability;

// Re-export commonly used types
pub use db::{open_database, setup_database, table_counts};
pub use entities::{Beneficiary, Office, Plan, Program, Record, User};
pub use store::{Store, StoreError, StoreResult};
pub use permissions::{AccessPolicy, Caller, Target, PERM_AA, PERM_APPROVE};
pub use serializers::UrlBuilder;
pub use config::ServerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
