pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod notice;
pub mod oauth;
pub mod routes;
pub mod screen;
pub mod session;

pub use error::{PortalError, PortalResult};

#[cfg(test)]
pub mod testing;
