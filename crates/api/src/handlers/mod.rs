pub mod auth;
pub mod forum;
pub mod password_reset;
pub mod users;
pub mod whitelist;
