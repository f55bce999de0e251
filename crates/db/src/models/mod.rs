//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) where the entity is mutable

pub mod forum;
pub mod permission;
pub mod user;
pub mod whitelist;
