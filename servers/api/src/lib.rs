pub mod config;
pub mod errors;
pub mod provider;
pub mod routes;
pub mod server;
