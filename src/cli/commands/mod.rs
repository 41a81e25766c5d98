pub mod auth;
pub mod client;
pub mod member;
pub mod open;
