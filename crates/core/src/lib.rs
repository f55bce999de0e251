//! Framework-free domain logic shared by the database, API and client crates.

pub mod error;
pub mod permissions;
pub mod reset_code;
pub mod types;
