pub mod auth;
pub mod crypto;
pub mod friendship;
pub mod hangout;
pub mod hive;
pub mod log;
pub mod preset;
pub mod user;
pub mod window;
